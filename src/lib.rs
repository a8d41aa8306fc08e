#![no_std]

mod logging;

pub mod bank;
pub mod channel;
pub mod command;
pub mod duty;
pub mod engine;
pub mod error;
pub mod output;
pub mod program;
pub mod scheduler;
pub mod store;

pub use bank::{Bank, BankRegistry};
pub use channel::{Channel, ChannelName};
pub use command::{
    CommandOutcome, CommandProcessor, CommandQueue, CommandReceiver, CommandSender,
    ProgramCommand,
};
pub use engine::{Assignment, ProgramEngine, RestoreSummary, UpdateSummary};
pub use error::{ApplyError, ProgramError, RegistryError};
pub use output::PwmOutput;
pub use program::{ProgramInfo, ProgramKind, ProgramState, RuntimeState};
pub use scheduler::{TickResult, TickScheduler};
pub use store::AssignmentStore;

pub use embassy_time::{Duration, Instant};

/// Abstract PWM driver trait
///
/// Implement this trait to support different hardware platforms.
/// The program engine is generic over this trait.
pub trait PwmDriver {
    type Error: core::fmt::Debug;

    /// Write one output to channel `channel` of the PCA9685 at `address`
    fn write(&mut self, address: u8, channel: u8, output: PwmOutput) -> Result<(), Self::Error>;
}
