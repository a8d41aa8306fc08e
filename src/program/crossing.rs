//! French level crossing light
//!
//! 1 Hz blink (500 ms on, 500 ms off) driving a simulated filament bulb:
//! the filament warms up along `1 - e^(-4p)` and cools down along `e^(-2p)`,
//! modeling thermal inertia. Phase changes are edge-detected so the phase
//! anchor stays fixed for a whole half-cycle.

use embassy_time::{Duration, Instant};
use libm::expf;
use rand::{Rng, RngCore};

use super::{Program, ProgramKind, RuntimeState};
use crate::duty::{MAX_DUTY, clamp_between, progress, scale_duty};

const ON_MS: u64 = 500;
const OFF_MS: u64 = 500;

pub const CROSSING_MAX_INTENSITY: u16 = MAX_DUTY;
const WARMUP_MS: u64 = 100;
const COOLDOWN_MS: u64 = 150;

const WARMUP_RATE: f32 = 4.0;
const COOLDOWN_RATE: f32 = 2.0;

const STABILITY_VARIATION: i32 = 25;
const STABILITY_FLOOR: u16 = CROSSING_MAX_INTENSITY - 50;

/// Edge-detected lamp phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampPhase {
    /// Whether the lamp is in its ON half
    pub lit: bool,
    /// When the current half started
    pub since: Instant,
    /// Displayed level at the moment the lamp was switched off
    pub extinguished_from: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrenchCrossing {
    state: RuntimeState,
    lamp: LampPhase,
}

impl FrenchCrossing {
    pub const fn lamp(&self) -> LampPhase {
        self.lamp
    }
}

impl Program for FrenchCrossing {
    const KIND: ProgramKind = ProgramKind::FrenchCrossing;
    const REFRESH_INTERVAL: Duration = Duration::from_millis(10);

    fn start<R: RngCore>(now: Instant, _rng: &mut R) -> Self {
        Self {
            state: RuntimeState::anchored(now),
            lamp: LampPhase {
                lit: false,
                since: now,
                extinguished_from: 0,
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
        let cycle_time = self.state.cycle_time(now, ON_MS + OFF_MS);
        let should_be_lit = cycle_time < ON_MS;

        if should_be_lit != self.lamp.lit {
            self.lamp = LampPhase {
                lit: should_be_lit,
                since: now,
                extinguished_from: if should_be_lit { 0 } else { duty },
            };
        }

        let phase_time = now.saturating_duration_since(self.lamp.since).as_millis();

        let target = if self.lamp.lit {
            if phase_time < WARMUP_MS {
                let heat = 1.0 - expf(-WARMUP_RATE * progress(phase_time, WARMUP_MS));
                scale_duty(CROSSING_MAX_INTENSITY, heat)
            } else {
                let variation = rng.gen_range(-STABILITY_VARIATION..=STABILITY_VARIATION);
                clamp_between(
                    i32::from(CROSSING_MAX_INTENSITY) + variation,
                    STABILITY_FLOOR,
                    CROSSING_MAX_INTENSITY,
                )
            }
        } else if phase_time < COOLDOWN_MS {
            let glow = expf(-COOLDOWN_RATE * progress(phase_time, COOLDOWN_MS));
            scale_duty(self.lamp.extinguished_from, glow)
        } else {
            0
        };

        self.state.current_intensity = target;
        Some(target)
    }
}
