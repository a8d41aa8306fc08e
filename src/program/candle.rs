//! Candle flame flicker
//!
//! Randomly spaced events pick a new target level (strong flicker, gentle dip
//! or small variation). Between events a subtle jitter keeps the flame alive
//! and the displayed value eases toward the target.

use embassy_time::{Duration, Instant};
use rand::{Rng, RngCore};

use super::{Program, ProgramKind, RuntimeState};
use crate::duty::{clamp_between, clamp_duty};

pub const CANDLE_MIN_INTENSITY: u16 = 1_800;
pub const CANDLE_MAX_INTENSITY: u16 = 3_800;
const BASE_INTENSITY: u16 = 2_800;
/// 90% of maximum
const STRONG_FLICKER_FLOOR: u16 = CANDLE_MAX_INTENSITY / 10 * 9;
/// 120% of minimum, exclusive
const DIP_CEILING: u16 = CANDLE_MIN_INTENSITY / 5 * 6;

const GAP_MIN_MS: u64 = 50;
const GAP_MAX_MS: u64 = 300;

/// Cumulative thresholds out of 100
const STRONG_FLICKER_PROBABILITY: u8 = 12;
const DIP_PROBABILITY: u8 = 8;

const GENTLE_VARIATION: i32 = 150;
const SUBTLE_VARIATION: i32 = 30;

const LARGE_STEP_THRESHOLD: i32 = 200;
const LARGE_STEP: i32 = 80;
const PARTIAL_STEP_THRESHOLD: i32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleFlicker {
    state: RuntimeState,
}

impl CandleFlicker {
    fn draw_target<R: RngCore>(rng: &mut R) -> u16 {
        let roll: u8 = rng.gen_range(0..100);
        if roll < STRONG_FLICKER_PROBABILITY {
            rng.gen_range(STRONG_FLICKER_FLOOR..=CANDLE_MAX_INTENSITY)
        } else if roll < STRONG_FLICKER_PROBABILITY + DIP_PROBABILITY {
            rng.gen_range(CANDLE_MIN_INTENSITY..DIP_CEILING)
        } else {
            let variation = rng.gen_range(-GENTLE_VARIATION..=GENTLE_VARIATION);
            clamp_between(
                i32::from(BASE_INTENSITY) + variation,
                CANDLE_MIN_INTENSITY,
                CANDLE_MAX_INTENSITY,
            )
        }
    }

    fn schedule_event<R: RngCore>(now: Instant, rng: &mut R) -> Instant {
        now + Duration::from_millis(rng.gen_range(GAP_MIN_MS..=GAP_MAX_MS))
    }
}

/// Ease `current` toward `target`
///
/// Large gaps move by a fixed step, medium gaps by a third of the remaining
/// distance, small gaps are applied directly.
pub fn smooth_toward(current: u16, target: u16) -> u16 {
    let current = i32::from(current);
    let diff = i32::from(target) - current;
    let next = if diff.abs() > LARGE_STEP_THRESHOLD {
        current + LARGE_STEP * diff.signum()
    } else if diff.abs() > PARTIAL_STEP_THRESHOLD {
        current + diff / 3
    } else {
        current + diff
    };
    clamp_duty(next)
}

impl Program for CandleFlicker {
    const KIND: ProgramKind = ProgramKind::CandleFlicker;
    const REFRESH_INTERVAL: Duration = Duration::from_millis(25);

    fn start<R: RngCore>(now: Instant, rng: &mut R) -> Self {
        Self {
            state: RuntimeState {
                next_event: Self::schedule_event(now, rng),
                current_intensity: BASE_INTENSITY,
                ..RuntimeState::anchored(now)
            },
        }
    }

    fn runtime(&self) -> &RuntimeState {
        &self.state
    }

    fn runtime_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    fn advance<R: RngCore>(&mut self, now: Instant, duty: u16, rng: &mut R) -> Option<u16> {
        if now >= self.state.next_event {
            self.state.current_intensity = Self::draw_target(rng);
            self.state.next_event = Self::schedule_event(now, rng);
        }

        let subtle = rng.gen_range(-SUBTLE_VARIATION..=SUBTLE_VARIATION);
        let target = clamp_between(
            i32::from(self.state.current_intensity) + subtle,
            CANDLE_MIN_INTENSITY,
            CANDLE_MAX_INTENSITY,
        );

        Some(smooth_toward(duty, target))
    }
}
