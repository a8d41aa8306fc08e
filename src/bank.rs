//! Banks of channels and the registry that indexes them.

use core::fmt::{Debug, Write};

use heapless::{String, Vec};

use crate::PwmDriver;
use crate::channel::Channel;
use crate::error::{ApplyError, RegistryError};
use crate::logging::log_info;
use crate::output::PwmOutput;

/// Number of outputs on one PCA9685
pub const PCA9685_CHANNELS: usize = 16;

/// Lowest I2C address a PCA9685 can be strapped to
pub const ADDRESS_MIN: u8 = 0x40;
/// Highest I2C address a PCA9685 can be strapped to
pub const ADDRESS_MAX: u8 = 0x7F;
/// Power-on default ALLCALL address, shared by every chip
pub const ADDRESS_ALL_CALL: u8 = 0x70;

/// Maximum length of a bank name in bytes
pub const BANK_NAME_LEN: usize = 16;

/// Check whether `address` can identify a single PCA9685
pub const fn is_bank_address(address: u8) -> bool {
    address >= ADDRESS_MIN && address <= ADDRESS_MAX && address != ADDRESS_ALL_CALL
}

/// Fixed-capacity group of channels driven by one PWM chip
#[derive(Debug, Clone)]
pub struct Bank<const CHANNELS: usize> {
    address: u8,
    name: String<BANK_NAME_LEN>,
    channels: [Channel; CHANNELS],
}

impl<const CHANNELS: usize> Bank<CHANNELS> {
    /// Create a bank named `PCA9685_<address>` with default channels
    pub fn new(index: u8, address: u8) -> Self {
        const { assert!(CHANNELS <= PCA9685_CHANNELS) };
        let mut name = String::new();
        let _ = write!(name, "PCA9685_{:x}", address);
        #[allow(clippy::cast_possible_truncation)]
        let channels = core::array::from_fn(|channel| Channel::new(index, channel as u8));
        Self {
            address,
            name,
            channels,
        }
    }

    pub const fn address(&self) -> u8 {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self, index: u8) -> Option<&Channel> {
        self.channels.get(usize::from(index))
    }

    pub fn channel_mut(&mut self, index: u8) -> Option<&mut Channel> {
        self.channels.get_mut(usize::from(index))
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    pub const fn channel_count(&self) -> usize {
        CHANNELS
    }
}

/// Index of every bank, with `(bank, channel)` lookup and hardware output
pub struct BankRegistry<D: PwmDriver, const BANKS: usize, const CHANNELS: usize> {
    driver: D,
    banks: Vec<Bank<CHANNELS>, BANKS>,
}

impl<D: PwmDriver, const BANKS: usize, const CHANNELS: usize> BankRegistry<D, BANKS, CHANNELS> {
    /// Create an empty registry
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            banks: Vec::new(),
        }
    }

    /// Create a registry with one bank per address, in order
    pub fn with_addresses(driver: D, addresses: &[u8]) -> Result<Self, RegistryError> {
        let mut registry = Self::new(driver);
        for &address in addresses {
            registry.add_bank(address)?;
        }
        Ok(registry)
    }

    /// Register a bank at `address`, returning its index
    pub fn add_bank(&mut self, address: u8) -> Result<u8, RegistryError> {
        if !is_bank_address(address) {
            return Err(RegistryError::InvalidAddress(address));
        }
        if self.banks.iter().any(|bank| bank.address == address) {
            return Err(RegistryError::DuplicateAddress(address));
        }
        let index = u8::try_from(self.banks.len()).map_err(|_| RegistryError::Full)?;
        self.banks
            .push(Bank::new(index, address))
            .map_err(|_| RegistryError::Full)?;
        log_info!(
            "[BankRegistry.add_bank] bank {} at {:#04x} with {} channels",
            index,
            address,
            CHANNELS
        );
        Ok(index)
    }

    pub fn bank(&self, index: u8) -> Option<&Bank<CHANNELS>> {
        self.banks.get(usize::from(index))
    }

    pub fn bank_mut(&mut self, index: u8) -> Option<&mut Bank<CHANNELS>> {
        self.banks.get_mut(usize::from(index))
    }

    pub fn banks(&self) -> &[Bank<CHANNELS>] {
        &self.banks
    }

    pub fn banks_mut(&mut self) -> &mut [Bank<CHANNELS>] {
        &mut self.banks
    }

    pub fn channel(&self, bank: u8, channel: u8) -> Option<&Channel> {
        self.bank(bank)?.channel(channel)
    }

    pub fn channel_mut(&mut self, bank: u8, channel: u8) -> Option<&mut Channel> {
        self.bank_mut(bank)?.channel_mut(channel)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn bank_count(&self) -> u8 {
        self.banks.len() as u8
    }

    /// Total number of channels across every bank
    pub fn channel_count(&self) -> usize {
        self.banks.len() * CHANNELS
    }

    /// Number of enabled channels across every bank
    pub fn enabled_count(&self) -> usize {
        self.banks
            .iter()
            .flat_map(|bank| bank.channels().iter())
            .filter(|channel| channel.is_enabled())
            .count()
    }

    /// Push one channel's current duty value to hardware
    pub fn apply(&mut self, bank: u8, channel: u8) -> Result<(), ApplyError<D::Error>> {
        let Some(target) = self.bank(bank) else {
            return Err(ApplyError::InvalidLocation { bank, channel });
        };
        let address = target.address;
        let Some(state) = target.channel(channel) else {
            return Err(ApplyError::InvalidLocation { bank, channel });
        };
        let output = PwmOutput::for_channel(state.is_enabled(), state.duty());
        self.driver
            .write(address, channel, output)
            .map_err(ApplyError::Driver)
    }

    /// Push every channel to hardware, returning the number of failed writes
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply_all(&mut self) -> usize {
        let mut failed = 0;
        for bank in 0..self.bank_count() {
            for channel in 0..CHANNELS {
                if self.apply(bank, channel as u8).is_err() {
                    failed += 1;
                }
            }
        }
        failed
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: PwmDriver + Debug, const BANKS: usize, const CHANNELS: usize> Debug
    for BankRegistry<D, BANKS, CHANNELS>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BankRegistry")
            .field("driver", &self.driver)
            .field("banks", &self.banks)
            .finish()
    }
}
