//! Tick scheduling and timing utilities.
//!
//! Provides portable tick pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between ticks.

use embassy_time::{Duration, Instant};
use rand::RngCore;

use crate::PwmDriver;
use crate::command::{CommandOutcome, CommandProcessor, CommandReceiver};
use crate::engine::{ProgramEngine, UpdateSummary};

/// Default engine tick rate (100 Hz), matching the fastest program interval.
pub const DEFAULT_TICK_HZ: u32 = 100;

/// Default tick duration based on `DEFAULT_TICK_HZ`.
pub const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_TICK_HZ as u64);

/// Result of a scheduler tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule).
    pub sleep_duration: Duration,
    /// Channels refreshed by this tick.
    pub summary: UpdateSummary,
    /// Commands drained before the update.
    pub commands: CommandOutcome,
}

/// Drives a [`ProgramEngine`] at a fixed rate.
///
/// Each tick drains the command queue, advances every assigned program and
/// writes changed channels to the driver.
///
/// # Usage
///
/// ```ignore
/// static COMMANDS: CommandQueue<8> = CommandQueue::new();
///
/// let mut scheduler = TickScheduler::new(engine, COMMANDS.receiver());
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     sleep_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct TickScheduler<
    'a,
    D: PwmDriver,
    R: RngCore,
    const BANKS: usize,
    const CHANNELS: usize,
    const QUEUE: usize,
> {
    engine: ProgramEngine<D, R, BANKS, CHANNELS>,
    commands: CommandProcessor<'a, QUEUE>,
    next_tick: Instant,
    tick_duration: Duration,
}

impl<'a, D: PwmDriver, R: RngCore, const BANKS: usize, const CHANNELS: usize, const QUEUE: usize>
    TickScheduler<'a, D, R, BANKS, CHANNELS, QUEUE>
{
    /// Create a new scheduler ticking at `DEFAULT_TICK_HZ`.
    pub fn new(
        engine: ProgramEngine<D, R, BANKS, CHANNELS>,
        commands: CommandReceiver<'a, QUEUE>,
    ) -> Self {
        Self::with_tick_duration(engine, commands, DEFAULT_TICK_DURATION)
    }

    /// Create a new scheduler with a custom tick duration.
    pub fn with_tick_duration(
        engine: ProgramEngine<D, R, BANKS, CHANNELS>,
        commands: CommandReceiver<'a, QUEUE>,
        tick_duration: Duration,
    ) -> Self {
        Self {
            engine,
            commands: CommandProcessor::new(commands),
            next_tick: Instant::from_millis(0),
            tick_duration,
        }
    }

    /// Process one tick and return timing information.
    ///
    /// The caller is responsible for waiting until `next_deadline` before
    /// calling `tick` again.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        // Skip the backlog after a stall instead of bursting through it
        let max_drift_ms = self.tick_duration.as_millis() * 2;
        if now.as_millis() > self.next_tick.as_millis() + max_drift_ms {
            self.next_tick = now;
        }

        let commands = self.commands.process_pending(&mut self.engine, now);
        let summary = self.engine.update(now);

        self.next_tick += self.tick_duration;

        let sleep_duration = if self.next_tick.as_millis() > now.as_millis() {
            Duration::from_millis(self.next_tick.as_millis() - now.as_millis())
        } else {
            Duration::from_millis(0)
        };

        TickResult {
            next_deadline: self.next_tick,
            sleep_duration,
            summary,
            commands,
        }
    }

    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Get a reference to the engine.
    pub fn engine(&self) -> &ProgramEngine<D, R, BANKS, CHANNELS> {
        &self.engine
    }

    /// Get a mutable reference to the engine.
    pub fn engine_mut(&mut self) -> &mut ProgramEngine<D, R, BANKS, CHANNELS> {
        &mut self.engine
    }
}
