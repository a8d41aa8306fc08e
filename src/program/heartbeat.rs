//! Heartbeat rhythm
//!
//! A strong beat, a short pause, a weaker second beat and a long pause,
//! repeating every second.

use embassy_time::{Duration, Instant};
use rand::RngCore;

use super::{Program, ProgramKind, RuntimeState};

pub const HEARTBEAT_PERIOD_MS: u64 = 1_000;
pub const HEARTBEAT_INTENSITY: u16 = 3_500;
/// Second beat at 60% of the first
pub const HEARTBEAT_SECOND_INTENSITY: u16 = HEARTBEAT_INTENSITY * 6 / 10;

const BEAT1_END_MS: u64 = 100;
const PAUSE1_END_MS: u64 = BEAT1_END_MS + 80;
const BEAT2_END_MS: u64 = PAUSE1_END_MS + 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    state: RuntimeState,
}

impl Program for Heartbeat {
    const KIND: ProgramKind = ProgramKind::Heartbeat;
    const REFRESH_INTERVAL: Duration = Duration::from_millis(20);

    fn start<R: RngCore>(now: Instant, _rng: &mut R) -> Self {
        Self {
            state: RuntimeState::anchored(now),
        }
    }

    fn runtime(&self) -> &RuntimeState {
        &self.state
    }

    fn runtime_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    fn advance<R: RngCore>(&mut self, now: Instant, _duty: u16, _rng: &mut R) -> Option<u16> {
        let cycle_time = self.state.cycle_time(now, HEARTBEAT_PERIOD_MS);
        let duty = match cycle_time {
            t if t < BEAT1_END_MS => HEARTBEAT_INTENSITY,
            t if t < PAUSE1_END_MS => 0,
            t if t < BEAT2_END_MS => HEARTBEAT_SECOND_INTENSITY,
            _ => 0,
        };
        Some(duty)
    }
}
