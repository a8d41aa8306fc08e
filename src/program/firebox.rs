//! Firebox glow
//!
//! A constant ember crackle around a base level, occasionally interrupted by
//! one of three timed flares: a sharp ember pop, a sustained flame surge or a
//! dancing wind gust. Large jumps are rate limited, except during ember pops.

use core::f32::consts::PI;

use embassy_time::{Duration, Instant};
use libm::sinf;
use rand::{Rng, RngCore};

use super::{Program, ProgramKind, RuntimeState};
use crate::duty::{clamp_between, clamp_duty, progress};

pub const FIREBOX_MIN_INTENSITY: u16 = 1_200;
pub const FIREBOX_MAX_INTENSITY: u16 = 4_095;
const BASE_INTENSITY: u16 = 2_200;

const WINDOW_MIN_MS: u64 = 60;
const WINDOW_MAX_MS: u64 = 400;

/// Cumulative thresholds out of 100
const EMBER_POP_PROBABILITY: u8 = 15;
const FLAME_SURGE_PROBABILITY: u8 = 8;
const WIND_GUST_PROBABILITY: u8 = 5;

const EMBER_POP_MS: u64 = 150;
const FLAME_SURGE_MS: u64 = 800;
const WIND_GUST_MS: u64 = 1_200;

const EMBER_POP_BOOST: f32 = 1_800.0;
const FLAME_SURGE_BOOST: f32 = 1_500.0;
const WIND_GUST_BOOST: f32 = 800.0;

const CRACKLE_VARIATION: i32 = 400;
const MICRO_VARIATION: i32 = 100;

const RATE_LIMIT_THRESHOLD: i32 = 300;
const RATE_LIMIT_STEP: i32 = 150;

/// Timed sub-effect layered over the base crackle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlareKind {
    EmberPop,
    FlameSurge,
    WindGust,
}

impl FlareKind {
    pub const fn duration_ms(self) -> u64 {
        match self {
            Self::EmberPop => EMBER_POP_MS,
            Self::FlameSurge => FLAME_SURGE_MS,
            Self::WindGust => WIND_GUST_MS,
        }
    }

    /// Intensity added to the base level at `progress` (0.0-1.0)
    fn boost(self, progress: f32) -> f32 {
        match self {
            Self::EmberPop => {
                // Sharp rise then decay
                let shape = if progress < 0.2 {
                    progress / 0.2
                } else {
                    1.0 - (progress - 0.2) / 0.8
                };
                EMBER_POP_BOOST * shape
            }
            Self::FlameSurge => {
                let shape = if progress < 0.3 {
                    progress / 0.3
                } else if progress < 0.7 {
                    1.0 + 0.2 * sinf(progress * PI * 8.0)
                } else {
                    (1.0 - progress) / 0.3
                };
                FLAME_SURGE_BOOST * shape
            }
            Self::WindGust => {
                let dance = sinf(progress * PI * 3.0)
                    * sinf(progress * PI * 7.0)
                    * sinf(progress * PI * 11.0);
                WIND_GUST_BOOST * dance * (1.0 - progress)
            }
        }
    }
}

/// A running flare and the instant it started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flare {
    pub kind: FlareKind,
    pub started_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireboxGlow {
    state: RuntimeState,
    flare: Option<Flare>,
}

impl FireboxGlow {
    /// Currently running flare, if any
    pub const fn flare(&self) -> Option<Flare> {
        self.flare
    }

    fn draw_flare<R: RngCore>(rng: &mut R) -> Option<FlareKind> {
        let roll: u8 = rng.gen_range(0..100);
        if roll < EMBER_POP_PROBABILITY {
            Some(FlareKind::EmberPop)
        } else if roll < EMBER_POP_PROBABILITY + FLAME_SURGE_PROBABILITY {
            Some(FlareKind::FlameSurge)
        } else if roll < EMBER_POP_PROBABILITY + FLAME_SURGE_PROBABILITY + WIND_GUST_PROBABILITY
        {
            Some(FlareKind::WindGust)
        } else {
            None
        }
    }

    fn schedule_window<R: RngCore>(now: Instant, rng: &mut R) -> Instant {
        now + Duration::from_millis(rng.gen_range(WINDOW_MIN_MS..=WINDOW_MAX_MS))
    }
}

impl Program for FireboxGlow {
    const KIND: ProgramKind = ProgramKind::FireboxGlow;
    const REFRESH_INTERVAL: Duration = Duration::from_millis(20);

    fn start<R: RngCore>(now: Instant, rng: &mut R) -> Self {
        Self {
            state: RuntimeState {
                next_event: Self::schedule_window(now, rng),
                current_intensity: BASE_INTENSITY,
                ..RuntimeState::anchored(now)
            },
            flare: None,
        }
    }

    fn runtime(&self) -> &RuntimeState {
        &self.state
    }

    fn runtime_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    #[allow(clippy::cast_possible_truncation)]
    fn advance<R: RngCore>(&mut self, now: Instant, duty: u16, rng: &mut R) -> Option<u16> {
        // The flare seen at the start of the tick decides shaping and rate limiting
        let running = self.flare;
        let mut target = i32::from(BASE_INTENSITY);

        if let Some(flare) = running {
            let elapsed = now.saturating_duration_since(flare.started_at).as_millis();
            let duration = flare.kind.duration_ms();
            if elapsed < duration {
                let boost = flare.kind.boost(progress(elapsed, duration));
                target += boost as i32;
            } else {
                self.flare = None;
            }
        }

        if running.is_none() {
            if now >= self.state.next_event {
                self.flare = Self::draw_flare(rng).map(|kind| Flare {
                    kind,
                    started_at: now,
                });
                self.state.next_event = Self::schedule_window(now, rng);
            }

            let crackle = rng.gen_range(-CRACKLE_VARIATION..=CRACKLE_VARIATION);
            target = i32::from(clamp_between(
                i32::from(BASE_INTENSITY) + crackle,
                FIREBOX_MIN_INTENSITY,
                FIREBOX_MAX_INTENSITY,
            ));
        }

        let micro = rng.gen_range(-MICRO_VARIATION..=MICRO_VARIATION);
        let mut target = i32::from(clamp_between(
            target + micro,
            FIREBOX_MIN_INTENSITY,
            FIREBOX_MAX_INTENSITY,
        ));

        let sharp = matches!(
            running,
            Some(Flare {
                kind: FlareKind::EmberPop,
                ..
            })
        );
        let diff = target - i32::from(duty);
        if diff.abs() > RATE_LIMIT_THRESHOLD && !sharp {
            target = i32::from(duty) + RATE_LIMIT_STEP * diff.signum();
        }

        self.state.current_intensity = clamp_duty(target);
        Some(self.state.current_intensity)
    }
}
