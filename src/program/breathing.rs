//! Breathing fade
//!
//! Sine-eased inhale, hold at full, cosine-eased exhale, pause at zero.

use core::f32::consts::FRAC_PI_2;

use embassy_time::{Duration, Instant};
use libm::{cosf, sinf};
use rand::RngCore;

use super::{Program, ProgramKind, RuntimeState};
use crate::duty::{MAX_DUTY, progress, scale_duty};

pub const BREATHING_PERIOD_MS: u64 = 4_000;

const INHALE_MS: u64 = 1_500;
const HOLD_MS: u64 = 500;
const EXHALE_MS: u64 = 1_500;

const INHALE_END_MS: u64 = INHALE_MS;
const HOLD_END_MS: u64 = INHALE_END_MS + HOLD_MS;
const EXHALE_END_MS: u64 = HOLD_END_MS + EXHALE_MS;

const MAX_INTENSITY: u16 = MAX_DUTY;
const MIN_INTENSITY: u16 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breathing {
    state: RuntimeState,
}

impl Program for Breathing {
    const KIND: ProgramKind = ProgramKind::Breathing;
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
        let cycle_time = self.state.cycle_time(now, BREATHING_PERIOD_MS);

        let duty = if cycle_time < INHALE_END_MS {
            let eased = sinf(progress(cycle_time, INHALE_MS) * FRAC_PI_2);
            scale_duty(MAX_INTENSITY, eased)
        } else if cycle_time < HOLD_END_MS {
            MAX_INTENSITY
        } else if cycle_time < EXHALE_END_MS {
            let eased = cosf(progress(cycle_time - HOLD_END_MS, EXHALE_MS) * FRAC_PI_2);
            scale_duty(MAX_INTENSITY, eased)
        } else {
            MIN_INTENSITY
        };
        Some(duty)
    }
}
