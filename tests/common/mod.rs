#![allow(dead_code)]

use std::collections::HashMap;

use pwm_light_programs::{
    AssignmentStore, BankRegistry, ProgramEngine, ProgramKind, PwmDriver, PwmOutput,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

pub const BANKS: usize = 2;
pub const CHANNELS: usize = 16;
pub const ADDRESSES: [u8; BANKS] = [0x40, 0x41];

/// Driver that records every write and can fail one address
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub writes: Vec<(u8, u8, PwmOutput)>,
    pub fail_address: Option<u8>,
}

impl RecordingDriver {
    pub fn last(&self, address: u8, channel: u8) -> Option<PwmOutput> {
        self.writes
            .iter()
            .rev()
            .find(|(a, c, _)| *a == address && *c == channel)
            .map(|(_, _, output)| *output)
    }
}

impl PwmDriver for RecordingDriver {
    type Error = &'static str;

    fn write(&mut self, address: u8, channel: u8, output: PwmOutput) -> Result<(), Self::Error> {
        if self.fail_address == Some(address) {
            return Err("bus error");
        }
        self.writes.push((address, channel, output));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub entries: HashMap<(u8, u8), ProgramKind>,
    /// Entries whose load fails
    pub corrupt: Vec<(u8, u8)>,
    pub broken: bool,
}

impl AssignmentStore for MemoryStore {
    type Error = &'static str;

    fn load_assignment(
        &mut self,
        bank: u8,
        channel: u8,
    ) -> Result<Option<ProgramKind>, Self::Error> {
        if self.broken {
            return Err("storage unavailable");
        }
        if self.corrupt.contains(&(bank, channel)) {
            return Err("corrupt entry");
        }
        Ok(self.entries.get(&(bank, channel)).copied())
    }

    fn save_assignment(
        &mut self,
        bank: u8,
        channel: u8,
        kind: ProgramKind,
    ) -> Result<(), Self::Error> {
        if self.broken {
            return Err("storage unavailable");
        }
        self.entries.insert((bank, channel), kind);
        Ok(())
    }
}

pub type TestEngine = ProgramEngine<RecordingDriver, SmallRng, BANKS, CHANNELS>;

pub fn registry() -> BankRegistry<RecordingDriver, BANKS, CHANNELS> {
    BankRegistry::with_addresses(RecordingDriver::default(), &ADDRESSES).unwrap()
}

pub fn engine() -> TestEngine {
    ProgramEngine::new(registry(), SmallRng::seed_from_u64(7))
}

/// Duty value currently held by a channel
pub fn duty(engine: &TestEngine, bank: u8, channel: u8) -> u16 {
    engine.registry().channel(bank, channel).unwrap().duty()
}
