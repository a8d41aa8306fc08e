//! Command processing module
//!
//! Carries assignment requests from the API layer to the engine thread, where
//! they are applied between ticks. The queue is interrupt-safe and folds a
//! newer request into a pending one for the same channel and setting, so a
//! burst of UI changes costs one slot.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Instant;
use heapless::Deque;
use rand::RngCore;

use crate::PwmDriver;
use crate::engine::ProgramEngine;
use crate::logging::log_warn;
use crate::program::ProgramKind;

/// Request to change a channel's program or output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramCommand {
    /// Assign (or restart) a program; `ProgramKind::None` unassigns
    Assign {
        bank: u8,
        channel: u8,
        kind: ProgramKind,
    },
    /// Remove a program
    Unassign { bank: u8, channel: u8 },
    /// Enable or disable a channel, keeping its program state
    SetEnabled { bank: u8, channel: u8, enabled: bool },
    /// Set a manual duty value on a channel without a program
    SetDuty { bank: u8, channel: u8, duty: u16 },
    /// Unassign every channel
    ClearAll,
}

/// Channel setting a command writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    Program,
    Enabled,
    Duty,
    Everything,
}

impl ProgramCommand {
    /// Target channel, `None` for commands that touch every channel
    pub const fn target(&self) -> Option<(u8, u8)> {
        match *self {
            Self::Assign { bank, channel, .. }
            | Self::Unassign { bank, channel }
            | Self::SetEnabled { bank, channel, .. }
            | Self::SetDuty { bank, channel, .. } => Some((bank, channel)),
            Self::ClearAll => None,
        }
    }

    const fn setting(&self) -> Setting {
        match self {
            Self::Assign { .. } | Self::Unassign { .. } => Setting::Program,
            Self::SetEnabled { .. } => Setting::Enabled,
            Self::SetDuty { .. } => Setting::Duty,
            Self::ClearAll => Setting::Everything,
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        match (self.target(), other.target()) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// Counts from one [`CommandProcessor::process_pending`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub applied: usize,
    pub rejected: usize,
}

impl CommandOutcome {
    pub const fn is_empty(&self) -> bool {
        self.applied == 0 && self.rejected == 0
    }
}

/// Bounded queue of pending [`ProgramCommand`]s
pub struct CommandQueue<const SIZE: usize> {
    pending: Mutex<RefCell<Deque<ProgramCommand, SIZE>>>,
}

impl<const SIZE: usize> CommandQueue<SIZE> {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    pub const fn sender(&self) -> CommandSender<'_, SIZE> {
        CommandSender { queue: self }
    }

    /// Get a receiver handle
    ///
    /// Only the engine thread should drain the queue.
    pub const fn receiver(&self) -> CommandReceiver<'_, SIZE> {
        CommandReceiver { queue: self }
    }

    /// Queue a command, handing it back if the queue is full
    ///
    /// If the most recent pending command for the same channel writes the same
    /// setting, it is replaced in place instead. A `ClearAll` only replaces a
    /// trailing `ClearAll`. Later commands for other settings keep their order.
    pub fn submit(&self, command: ProgramCommand) -> Result<(), ProgramCommand> {
        critical_section::with(|cs| {
            let mut pending = self.pending.borrow(cs).borrow_mut();
            if let Some(queued) = pending
                .iter_mut()
                .rev()
                .find(|queued| queued.overlaps(&command))
                && queued.setting() == command.setting()
            {
                *queued = command;
                return Ok(());
            }
            pending.push_back(command)
        })
    }

    /// Take the oldest pending command
    pub fn pop(&self) -> Option<ProgramCommand> {
        critical_section::with(|cs| self.pending.borrow(cs).borrow_mut().pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.pending.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for CommandQueue<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle for a [`CommandQueue`]
///
/// Every method returns the rejected command when the queue is full.
#[derive(Clone, Copy)]
pub struct CommandSender<'a, const SIZE: usize> {
    queue: &'a CommandQueue<SIZE>,
}

impl<const SIZE: usize> CommandSender<'_, SIZE> {
    pub fn submit(&self, command: ProgramCommand) -> Result<(), ProgramCommand> {
        self.queue.submit(command)
    }

    pub fn assign(&self, bank: u8, channel: u8, kind: ProgramKind) -> Result<(), ProgramCommand> {
        self.submit(ProgramCommand::Assign {
            bank,
            channel,
            kind,
        })
    }

    pub fn unassign(&self, bank: u8, channel: u8) -> Result<(), ProgramCommand> {
        self.submit(ProgramCommand::Unassign { bank, channel })
    }

    pub fn set_enabled(&self, bank: u8, channel: u8, enabled: bool) -> Result<(), ProgramCommand> {
        self.submit(ProgramCommand::SetEnabled {
            bank,
            channel,
            enabled,
        })
    }

    pub fn set_duty(&self, bank: u8, channel: u8, duty: u16) -> Result<(), ProgramCommand> {
        self.submit(ProgramCommand::SetDuty {
            bank,
            channel,
            duty,
        })
    }

    pub fn clear_all(&self) -> Result<(), ProgramCommand> {
        self.submit(ProgramCommand::ClearAll)
    }
}

/// Consumer handle for a [`CommandQueue`]
#[derive(Clone, Copy)]
pub struct CommandReceiver<'a, const SIZE: usize> {
    queue: &'a CommandQueue<SIZE>,
}

impl<const SIZE: usize> CommandReceiver<'_, SIZE> {
    pub fn pop(&self) -> Option<ProgramCommand> {
        self.queue.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Applies queued commands to an engine
pub struct CommandProcessor<'a, const SIZE: usize> {
    commands: CommandReceiver<'a, SIZE>,
}

impl<'a, const SIZE: usize> CommandProcessor<'a, SIZE> {
    pub const fn new(commands: CommandReceiver<'a, SIZE>) -> Self {
        Self { commands }
    }

    /// Apply all pending commands (non-blocking)
    ///
    /// A rejected command is logged and does not stop the rest of the queue.
    pub fn process_pending<D, R, const BANKS: usize, const CHANNELS: usize>(
        &mut self,
        engine: &mut ProgramEngine<D, R, BANKS, CHANNELS>,
        now: Instant,
    ) -> CommandOutcome
    where
        D: PwmDriver,
        R: RngCore,
    {
        let mut outcome = CommandOutcome::default();

        while let Some(command) = self.commands.pop() {
            if Self::apply(engine, command, now) {
                outcome.applied += 1;
            } else {
                log_warn!("[CommandProcessor.process_pending] rejected {:?}", command);
                outcome.rejected += 1;
            }
        }

        outcome
    }

    fn apply<D, R, const BANKS: usize, const CHANNELS: usize>(
        engine: &mut ProgramEngine<D, R, BANKS, CHANNELS>,
        command: ProgramCommand,
        now: Instant,
    ) -> bool
    where
        D: PwmDriver,
        R: RngCore,
    {
        match command {
            ProgramCommand::Assign {
                bank,
                channel,
                kind,
            } => engine.assign(bank, channel, kind, now).is_ok(),
            ProgramCommand::Unassign { bank, channel } => engine.unassign(bank, channel).is_ok(),
            ProgramCommand::SetEnabled {
                bank,
                channel,
                enabled,
            } => engine.set_enabled(bank, channel, enabled).is_ok(),
            ProgramCommand::SetDuty {
                bank,
                channel,
                duty,
            } => matches!(engine.set_manual_duty(bank, channel, duty), Ok(true)),
            ProgramCommand::ClearAll => {
                engine.clear();
                true
            }
        }
    }
}
