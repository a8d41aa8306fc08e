//! Television screen flicker
//!
//! At each randomly spaced event one of three outcomes is drawn: a bright
//! flash, a dim dip or a jittered normal level. A small micro-variation is
//! layered on top before the value is written.

use embassy_time::{Duration, Instant};
use rand::{Rng, RngCore};

use super::{Program, ProgramKind, RuntimeState};
use crate::duty::clamp_between;

pub const TV_FLICKER_MIN_INTENSITY: u16 = 200;
pub const TV_FLICKER_MAX_INTENSITY: u16 = 2_500;
const BASE_INTENSITY: u16 = 800;
/// 80% of maximum
const FLASH_FLOOR: u16 = TV_FLICKER_MAX_INTENSITY / 5 * 4;
/// 150% of minimum, exclusive
const DIM_CEILING: u16 = TV_FLICKER_MIN_INTENSITY / 2 * 3;

const GAP_MIN_MS: u64 = 40;
const GAP_MAX_MS: u64 = 200;

/// Cumulative thresholds out of 100
const FLASH_PROBABILITY: u8 = 15;
const DIM_PROBABILITY: u8 = 10;

const NORMAL_VARIATION: i32 = 200;
const MICRO_VARIATION: i32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvFlicker {
    state: RuntimeState,
}

impl TvFlicker {
    fn draw_target<R: RngCore>(rng: &mut R) -> u16 {
        let roll: u8 = rng.gen_range(0..100);
        if roll < FLASH_PROBABILITY {
            rng.gen_range(FLASH_FLOOR..=TV_FLICKER_MAX_INTENSITY)
        } else if roll < FLASH_PROBABILITY + DIM_PROBABILITY {
            rng.gen_range(TV_FLICKER_MIN_INTENSITY..DIM_CEILING)
        } else {
            let variation = rng.gen_range(-NORMAL_VARIATION..=NORMAL_VARIATION);
            clamp_between(
                i32::from(BASE_INTENSITY) + variation,
                TV_FLICKER_MIN_INTENSITY,
                TV_FLICKER_MAX_INTENSITY,
            )
        }
    }
}

impl Program for TvFlicker {
    const KIND: ProgramKind = ProgramKind::TvFlicker;
    const REFRESH_INTERVAL: Duration = Duration::from_millis(20);

    fn start<R: RngCore>(now: Instant, _rng: &mut R) -> Self {
        // First event fires on the first tick
        Self {
            state: RuntimeState {
                next_event: now,
                ..RuntimeState::new()
            },
        }
    }

    fn runtime(&self) -> &RuntimeState {
        &self.state
    }

    fn runtime_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    fn advance<R: RngCore>(&mut self, now: Instant, _duty: u16, rng: &mut R) -> Option<u16> {
        let state = &mut self.state;
        if state.active && now < state.next_event {
            return None;
        }

        state.active = true;
        state.current_intensity = Self::draw_target(rng);
        let gap = rng.gen_range(GAP_MIN_MS..=GAP_MAX_MS);
        state.next_event = now + Duration::from_millis(gap);

        let micro = rng.gen_range(-MICRO_VARIATION..=MICRO_VARIATION);
        Some(clamp_between(
            i32::from(state.current_intensity) + micro,
            TV_FLICKER_MIN_INTENSITY,
            TV_FLICKER_MAX_INTENSITY,
        ))
    }
}
