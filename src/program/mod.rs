//! Program system with compile-time known program variants
//!
//! Every program's runtime state is stored inline in a [`ProgramState`] enum
//! owned by its channel, so no allocation happens on assignment. Each program
//! implements the [`Program`] trait; dispatch is an exhaustive `match`.

mod blink;
mod breathing;
mod candle;
mod crossing;
mod firebox;
mod heartbeat;
mod kind;
mod tv_flicker;
mod welding;

use embassy_time::{Duration, Instant};
use rand::RngCore;

pub use blink::SimpleBlink;
pub use breathing::{BREATHING_PERIOD_MS, Breathing};
pub use candle::{CANDLE_MAX_INTENSITY, CANDLE_MIN_INTENSITY, CandleFlicker, smooth_toward};
pub use crossing::{CROSSING_MAX_INTENSITY, FrenchCrossing, LampPhase};
pub use firebox::{FIREBOX_MAX_INTENSITY, FIREBOX_MIN_INTENSITY, Flare, FlareKind, FireboxGlow};
pub use heartbeat::{
    HEARTBEAT_INTENSITY, HEARTBEAT_PERIOD_MS, HEARTBEAT_SECOND_INTENSITY, Heartbeat,
};
pub use kind::{CATALOGUE, ProgramInfo, ProgramKind};
pub use tv_flicker::{TV_FLICKER_MAX_INTENSITY, TV_FLICKER_MIN_INTENSITY, TvFlicker};
pub use welding::{FlashPhase, Welding};

/// Timing and intensity bookkeeping shared by every program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeState {
    /// Last tick on which the program was advanced
    pub last_update: Option<Instant>,
    /// Next scheduled discrete event (event-driven programs)
    pub next_event: Instant,
    /// Program-specific flag, e.g. "flash in progress"
    pub active: bool,
    /// Cycle anchor (cycle-based programs)
    pub start_time: Option<Instant>,
    /// Last chosen target intensity
    pub current_intensity: u16,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeState {
    pub const fn new() -> Self {
        Self {
            last_update: None,
            next_event: Instant::from_millis(0),
            active: false,
            start_time: None,
            current_intensity: 0,
        }
    }

    /// State for a cycle-based program anchored at `now`
    pub const fn anchored(now: Instant) -> Self {
        Self {
            start_time: Some(now),
            active: true,
            ..Self::new()
        }
    }

    /// Check whether at least `interval` has passed since the last advance
    pub fn is_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_update {
            Some(last) => now.saturating_duration_since(last) >= interval,
            None => true,
        }
    }

    /// Milliseconds elapsed within a repeating cycle of `period_ms`
    ///
    /// Anchors the cycle at `now` if it has no anchor yet.
    pub fn cycle_time(&mut self, now: Instant, period_ms: u64) -> u64 {
        let start = *self.start_time.get_or_insert(now);
        now.saturating_duration_since(start).as_millis() % period_ms.max(1)
    }
}

pub trait Program: Sized {
    /// Kind reported for this program
    const KIND: ProgramKind;

    /// Minimum time between two advances
    const REFRESH_INTERVAL: Duration;

    /// Create freshly initialized state for an assignment made at `now`
    fn start<R: RngCore>(now: Instant, rng: &mut R) -> Self;

    fn runtime(&self) -> &RuntimeState;

    fn runtime_mut(&mut self) -> &mut RuntimeState;

    /// Compute the next duty value
    ///
    /// `duty` is the channel's currently displayed value. Returning `None`
    /// leaves the channel and the hardware untouched for this tick.
    fn advance<R: RngCore>(&mut self, now: Instant, duty: u16, rng: &mut R) -> Option<u16>;
}

/// Runtime state slot - enum containing all possible programs
#[derive(Debug, Clone)]
pub enum ProgramState {
    Welding(Welding),
    Heartbeat(Heartbeat),
    Breathing(Breathing),
    SimpleBlink(SimpleBlink),
    TvFlicker(TvFlicker),
    FireboxGlow(FireboxGlow),
    CandleFlicker(CandleFlicker),
    FrenchCrossing(FrenchCrossing),
}

impl ProgramState {
    /// Create initialized state for `kind`
    ///
    /// Returns `None` for [`ProgramKind::None`].
    pub fn start<R: RngCore>(kind: ProgramKind, now: Instant, rng: &mut R) -> Option<Self> {
        Some(match kind {
            ProgramKind::None => return None,
            ProgramKind::Welding => Self::Welding(Welding::start(now, rng)),
            ProgramKind::Heartbeat => Self::Heartbeat(Heartbeat::start(now, rng)),
            ProgramKind::Breathing => Self::Breathing(Breathing::start(now, rng)),
            ProgramKind::SimpleBlink => Self::SimpleBlink(SimpleBlink::start(now, rng)),
            ProgramKind::TvFlicker => Self::TvFlicker(TvFlicker::start(now, rng)),
            ProgramKind::FireboxGlow => Self::FireboxGlow(FireboxGlow::start(now, rng)),
            ProgramKind::CandleFlicker => Self::CandleFlicker(CandleFlicker::start(now, rng)),
            ProgramKind::FrenchCrossing => {
                Self::FrenchCrossing(FrenchCrossing::start(now, rng))
            }
        })
    }

    /// Get the program kind for external observation
    pub const fn kind(&self) -> ProgramKind {
        match self {
            Self::Welding(_) => Welding::KIND,
            Self::Heartbeat(_) => Heartbeat::KIND,
            Self::Breathing(_) => Breathing::KIND,
            Self::SimpleBlink(_) => SimpleBlink::KIND,
            Self::TvFlicker(_) => TvFlicker::KIND,
            Self::FireboxGlow(_) => FireboxGlow::KIND,
            Self::CandleFlicker(_) => CandleFlicker::KIND,
            Self::FrenchCrossing(_) => FrenchCrossing::KIND,
        }
    }

    pub fn runtime(&self) -> &RuntimeState {
        match self {
            Self::Welding(program) => program.runtime(),
            Self::Heartbeat(program) => program.runtime(),
            Self::Breathing(program) => program.runtime(),
            Self::SimpleBlink(program) => program.runtime(),
            Self::TvFlicker(program) => program.runtime(),
            Self::FireboxGlow(program) => program.runtime(),
            Self::CandleFlicker(program) => program.runtime(),
            Self::FrenchCrossing(program) => program.runtime(),
        }
    }

    /// Advance the program for one scheduler tick
    ///
    /// Returns the duty value to write, or `None` if the program is throttled
    /// or has nothing to show this tick.
    pub fn tick<R: RngCore>(&mut self, now: Instant, duty: u16, rng: &mut R) -> Option<u16> {
        match self {
            Self::Welding(program) => advance_throttled(program, now, duty, rng),
            Self::Heartbeat(program) => advance_throttled(program, now, duty, rng),
            Self::Breathing(program) => advance_throttled(program, now, duty, rng),
            Self::SimpleBlink(program) => advance_throttled(program, now, duty, rng),
            Self::TvFlicker(program) => advance_throttled(program, now, duty, rng),
            Self::FireboxGlow(program) => advance_throttled(program, now, duty, rng),
            Self::CandleFlicker(program) => advance_throttled(program, now, duty, rng),
            Self::FrenchCrossing(program) => advance_throttled(program, now, duty, rng),
        }
    }
}

fn advance_throttled<P: Program, R: RngCore>(
    program: &mut P,
    now: Instant,
    duty: u16,
    rng: &mut R,
) -> Option<u16> {
    if !program.runtime().is_due(now, P::REFRESH_INTERVAL) {
        return None;
    }
    let next = program.advance(now, duty, rng);
    program.runtime_mut().last_update = Some(now);
    next
}
