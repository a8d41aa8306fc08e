use core::fmt::Debug;

use thiserror::Error;

/// Errors returned by program assignment operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// The bank or channel index does not resolve to a channel
    #[error("no channel at {bank}:{channel}")]
    InvalidLocation { bank: u8, channel: u8 },
    /// A raw program id does not name a known program
    #[error("unknown program id {0}")]
    UnknownProgram(u8),
}

/// Errors returned when registering banks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Address outside the PCA9685 range or reserved
    #[error("address {0:#04x} is not a usable PCA9685 address")]
    InvalidAddress(u8),
    /// Another bank already uses this address
    #[error("address {0:#04x} is already registered")]
    DuplicateAddress(u8),
    /// The registry holds its maximum number of banks
    #[error("bank registry is full")]
    Full,
}

/// Errors returned when pushing a channel to hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApplyError<E: Debug> {
    /// The bank or channel index does not resolve to a channel
    #[error("no channel at {bank}:{channel}")]
    InvalidLocation { bank: u8, channel: u8 },
    /// The driver rejected the write
    #[error("driver write failed: {0:?}")]
    Driver(E),
}
