//! A single PWM light output and the program that drives it.

use core::fmt::Write;

use embassy_time::Instant;
use heapless::String;
use rand::RngCore;

use crate::duty::{MAX_DUTY, duty_to_percent, percent_to_duty};
use crate::program::{ProgramKind, ProgramState};

/// Maximum length of a channel name in bytes
pub const CHANNEL_NAME_LEN: usize = 32;

pub type ChannelName = String<CHANNEL_NAME_LEN>;

/// One controllable light output within a bank
///
/// The assigned program kind is derived from the owned runtime state, so a
/// channel reports [`ProgramKind::None`] exactly when it holds no state.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    name: ChannelName,
    duty: u16,
    enabled: bool,
    program: Option<ProgramState>,
}

impl Channel {
    /// Create a disabled, dark channel named `LED_<bank>_<channel>`
    pub fn new(bank: u8, channel: u8) -> Self {
        let mut name = ChannelName::new();
        let _ = write!(name, "LED_{}_{}", bank, channel);
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the channel, truncating to [`CHANNEL_NAME_LEN`] bytes
    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for ch in name.chars() {
            if self.name.push(ch).is_err() {
                break;
            }
        }
    }

    pub const fn duty(&self) -> u16 {
        self.duty
    }

    /// Set the duty value, clamping it to `0..=MAX_DUTY`
    pub fn set_duty(&mut self, duty: u16) {
        self.duty = duty.min(MAX_DUTY);
    }

    pub fn duty_percent(&self) -> f32 {
        duty_to_percent(self.duty)
    }

    pub fn set_duty_percent(&mut self, percent: f32) {
        self.set_duty(percent_to_duty(percent));
    }

    /// Duty value as seen on the output: zero while disabled
    pub const fn effective_duty(&self) -> u16 {
        if self.enabled { self.duty } else { 0 }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the enabled flag, returning the new value
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn kind(&self) -> ProgramKind {
        self.program
            .as_ref()
            .map_or(ProgramKind::None, ProgramState::kind)
    }

    pub const fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Runtime state of the assigned program
    pub const fn program(&self) -> Option<&ProgramState> {
        self.program.as_ref()
    }

    pub(crate) fn program_mut(&mut self) -> Option<&mut ProgramState> {
        self.program.as_mut()
    }

    /// Replace any running program with freshly initialized state for `kind`
    ///
    /// Prior state is always discarded; [`ProgramKind::None`] clears the slot.
    pub(crate) fn start_program<R: RngCore>(
        &mut self,
        kind: ProgramKind,
        now: Instant,
        rng: &mut R,
    ) {
        self.program = ProgramState::start(kind, now, rng);
    }

    /// Drop the running program, if any
    pub(crate) fn stop_program(&mut self) -> Option<ProgramState> {
        self.program.take()
    }

    /// Dark, disabled and without program; the name is kept
    pub fn reset(&mut self) {
        self.duty = 0;
        self.enabled = false;
        self.program = None;
    }
}
