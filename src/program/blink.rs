use embassy_time::{Duration, Instant};
use rand::RngCore;

use super::{Program, ProgramKind, RuntimeState};
use crate::duty::MAX_DUTY;

const ON_MS: u64 = 1_000;
const OFF_MS: u64 = 1_000;

/// Plain 50/50 on/off blink, one second each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleBlink {
    state: RuntimeState,
}

impl Program for SimpleBlink {
    const KIND: ProgramKind = ProgramKind::SimpleBlink;
    const REFRESH_INTERVAL: Duration = Duration::from_millis(50);

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
        let cycle_time = self.state.cycle_time(now, ON_MS + OFF_MS);
        Some(if cycle_time < ON_MS { MAX_DUTY } else { 0 })
    }
}
