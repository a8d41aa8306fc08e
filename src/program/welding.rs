//! Welding arc simulation
//!
//! Idle until the next scheduled flash, then a bright randomized flash that
//! holds near its peak with jitter and fades out linearly.

use embassy_time::{Duration, Instant};
use rand::{Rng, RngCore};

use super::{Program, ProgramKind, RuntimeState};
use crate::duty::{clamp_duty, progress, scale_duty};

const FIRST_FLASH_MIN_MS: u64 = 1_000;
const FIRST_FLASH_MAX_MS: u64 = 3_000;

const GAP_MIN_MS: u64 = 10;
const GAP_MAX_MS: u64 = 300;
const FLASH_MIN_MS: u64 = 10;
const FLASH_MAX_MS: u64 = 100;

const INTENSITY_MIN: u16 = 10;
const INTENSITY_MAX: u16 = 3000;
const HOLD_JITTER: i32 = 200;

// Flash shape uses the mean duration; the drawn duration only spaces flashes.
const FLASH_SHAPE_MS: u64 = (FLASH_MIN_MS + FLASH_MAX_MS) / 2;

// Shape boundaries in tenths of a millisecond: the hold ends at 38.5 ms
const FLASH_SHAPE_TENTHS: u64 = FLASH_SHAPE_MS * 10;
const HOLD_TENTHS: u64 = FLASH_SHAPE_MS * 7;

/// Shape phase of a welding flash
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlashPhase {
    /// Near peak, with jitter
    Hold,
    /// Linear fade, carrying the fade progress (0.0-1.0)
    Fade(f32),
    /// Flash finished
    Done,
}

impl FlashPhase {
    /// Phase `elapsed_ms` after the flash started
    pub fn at(elapsed_ms: u64) -> Self {
        let elapsed = elapsed_ms.saturating_mul(10);
        if elapsed < HOLD_TENTHS {
            Self::Hold
        } else if elapsed < FLASH_SHAPE_TENTHS {
            Self::Fade(progress(elapsed - HOLD_TENTHS, FLASH_SHAPE_TENTHS - HOLD_TENTHS))
        } else {
            Self::Done
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Welding {
    state: RuntimeState,
}

impl Program for Welding {
    const KIND: ProgramKind = ProgramKind::Welding;
    const REFRESH_INTERVAL: Duration = Duration::from_millis(10);

    fn start<R: RngCore>(now: Instant, rng: &mut R) -> Self {
        let delay = rng.gen_range(FIRST_FLASH_MIN_MS..=FIRST_FLASH_MAX_MS);
        Self {
            state: RuntimeState {
                next_event: now + Duration::from_millis(delay),
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

        if !state.active && now >= state.next_event {
            state.active = true;
            state.start_time = Some(now);
            state.current_intensity = rng.gen_range(INTENSITY_MIN..=INTENSITY_MAX);

            let flash = rng.gen_range(FLASH_MIN_MS..=FLASH_MAX_MS);
            let gap = rng.gen_range(GAP_MIN_MS..=GAP_MAX_MS);
            state.next_event = now + Duration::from_millis(flash + gap);
        }

        if !state.active {
            return None;
        }

        let started = state.start_time.unwrap_or(now);
        let elapsed = now.saturating_duration_since(started).as_millis();

        match FlashPhase::at(elapsed) {
            FlashPhase::Hold => {
                let jitter = rng.gen_range(-HOLD_JITTER..=HOLD_JITTER);
                Some(clamp_duty(i32::from(state.current_intensity) + jitter))
            }
            FlashPhase::Fade(fade) => Some(scale_duty(state.current_intensity, 1.0 - fade)),
            FlashPhase::Done => {
                state.active = false;
                Some(0)
            }
        }
    }
}
