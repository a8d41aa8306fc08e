use embassy_time::Instant;
use rand::RngCore;

use crate::PwmDriver;
use crate::bank::BankRegistry;
use crate::channel::Channel;
use crate::error::{ApplyError, ProgramError};
use crate::logging::{log_info, log_warn};
use crate::program::{CATALOGUE, ProgramInfo, ProgramKind};
use crate::store::AssignmentStore;

/// One channel's program assignment, as listed by [`ProgramEngine::assignments`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub bank: u8,
    pub channel: u8,
    pub kind: ProgramKind,
    pub name: &'static str,
    pub enabled: bool,
}

/// Outcome of one [`ProgramEngine::update`] tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Channels whose duty value was recomputed and pushed
    pub refreshed: usize,
    /// Hardware pushes that failed
    pub failed: usize,
}

/// Outcome of [`ProgramEngine::initialize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Channels that got their stored program back
    pub restored: usize,
    /// Entries the store could not read
    pub failed: usize,
}

/// Program Engine - schedules every channel's program
///
/// Owns the bank registry and the shared random source. All operations are
/// non-blocking; call [`update`](Self::update) at a fixed cadence (100 Hz).
pub struct ProgramEngine<D: PwmDriver, R: RngCore, const BANKS: usize, const CHANNELS: usize> {
    registry: BankRegistry<D, BANKS, CHANNELS>,
    rng: R,
}

impl<D: PwmDriver, R: RngCore, const BANKS: usize, const CHANNELS: usize>
    ProgramEngine<D, R, BANKS, CHANNELS>
{
    pub const fn new(registry: BankRegistry<D, BANKS, CHANNELS>, rng: R) -> Self {
        Self { registry, rng }
    }

    /// Restore stored assignments
    ///
    /// Every channel whose stored program is not `None` gets fresh runtime
    /// state exactly as [`assign`](Self::assign) would create it. An entry the
    /// store fails to read is logged and skipped; the remaining channels are
    /// still restored.
    #[allow(clippy::cast_possible_truncation)]
    pub fn initialize<S: AssignmentStore>(&mut self, store: &mut S, now: Instant) -> RestoreSummary {
        let mut summary = RestoreSummary::default();
        for bank in 0..self.registry.bank_count() {
            for channel in 0..CHANNELS as u8 {
                let kind = match store.load_assignment(bank, channel) {
                    Ok(Some(kind)) if !kind.is_none() => kind,
                    Ok(_) => continue,
                    Err(_err) => {
                        log_warn!(
                            "[ProgramEngine.initialize] load {}:{} failed: {:?}",
                            bank,
                            channel,
                            _err
                        );
                        summary.failed += 1;
                        continue;
                    }
                };
                if let Some(target) = self.registry.channel_mut(bank, channel) {
                    target.start_program(kind, now, &mut self.rng);
                    log_info!(
                        "[ProgramEngine.initialize] restored {}:{} with {}",
                        bank,
                        channel,
                        kind.display_name()
                    );
                    summary.restored += 1;
                }
            }
        }
        summary
    }

    /// Advance every enabled channel with a program by one tick
    ///
    /// Disabled and unassigned channels are skipped and keep their state.
    /// Order is bank-major, channel-minor.
    #[allow(clippy::cast_possible_truncation)]
    pub fn update(&mut self, now: Instant) -> UpdateSummary {
        let mut summary = UpdateSummary::default();

        for bank in 0..self.registry.bank_count() {
            for channel in 0..CHANNELS as u8 {
                let Some(target) = self.registry.channel_mut(bank, channel) else {
                    continue;
                };
                if !target.is_enabled() {
                    continue;
                }
                let duty = target.duty();
                let Some(program) = target.program_mut() else {
                    continue;
                };
                let Some(next) = program.tick(now, duty, &mut self.rng) else {
                    continue;
                };
                target.set_duty(next);

                summary.refreshed += 1;
                if let Err(_err) = self.registry.apply(bank, channel) {
                    log_warn!("[ProgramEngine.update] apply {}:{} failed: {:?}", bank, channel, _err);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Assign a program to a channel
    ///
    /// Any running program is discarded and the new one starts from its
    /// initial phase, even if it is the same kind. Assigning
    /// [`ProgramKind::None`] is the same as [`unassign`](Self::unassign).
    /// Hardware is not touched until the next tick.
    pub fn assign(
        &mut self,
        bank: u8,
        channel: u8,
        kind: ProgramKind,
        now: Instant,
    ) -> Result<(), ProgramError> {
        if kind.is_none() {
            return self.unassign(bank, channel);
        }
        let target = self
            .registry
            .channel_mut(bank, channel)
            .ok_or(ProgramError::InvalidLocation { bank, channel })?;
        target.start_program(kind, now, &mut self.rng);
        log_info!(
            "[ProgramEngine.assign] {} assigned to {}:{}",
            kind.display_name(),
            bank,
            channel
        );
        Ok(())
    }

    /// Remove a channel's program and release its runtime state
    ///
    /// The duty value and hardware output are left as they are.
    pub fn unassign(&mut self, bank: u8, channel: u8) -> Result<(), ProgramError> {
        let target = self
            .registry
            .channel_mut(bank, channel)
            .ok_or(ProgramError::InvalidLocation { bank, channel })?;
        target.stop_program();
        log_info!("[ProgramEngine.unassign] program removed from {}:{}", bank, channel);
        Ok(())
    }

    /// Unassign every channel in every bank
    pub fn clear(&mut self) {
        for bank in self.registry.banks_mut() {
            for channel in bank.channels_mut() {
                channel.stop_program();
            }
        }
        log_info!("[ProgramEngine.clear] all programs removed");
    }

    /// Check whether a channel runs a program; `false` for invalid locations
    pub fn is_assigned(&self, bank: u8, channel: u8) -> bool {
        self.kind(bank, channel) != ProgramKind::None
    }

    /// Program assigned to a channel; `None` for invalid locations
    pub fn kind(&self, bank: u8, channel: u8) -> ProgramKind {
        self.registry
            .channel(bank, channel)
            .map_or(ProgramKind::None, Channel::kind)
    }

    /// Every assignable program with its name and description
    pub const fn catalogue() -> &'static [ProgramInfo] {
        &CATALOGUE
    }

    /// Every channel with a program, in bank-major order
    #[allow(clippy::cast_possible_truncation)]
    pub fn assignments(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.registry
            .banks()
            .iter()
            .enumerate()
            .flat_map(|(bank, channels)| {
                channels
                    .channels()
                    .iter()
                    .enumerate()
                    .filter(|(_, channel)| channel.has_program())
                    .map(move |(channel, state)| Assignment {
                        bank: bank as u8,
                        channel: channel as u8,
                        kind: state.kind(),
                        name: state.kind().display_name(),
                        enabled: state.is_enabled(),
                    })
            })
    }

    /// Enable or disable a channel without touching its program state
    pub fn set_enabled(&mut self, bank: u8, channel: u8, enabled: bool) -> Result<(), ProgramError> {
        let target = self
            .registry
            .channel_mut(bank, channel)
            .ok_or(ProgramError::InvalidLocation { bank, channel })?;
        target.set_enabled(enabled);
        Ok(())
    }

    /// Set a manual duty value and push it to hardware
    ///
    /// Channels driven by a program are left alone and report `Ok(false)`.
    pub fn set_manual_duty(
        &mut self,
        bank: u8,
        channel: u8,
        duty: u16,
    ) -> Result<bool, ApplyError<D::Error>> {
        let target = self
            .registry
            .channel_mut(bank, channel)
            .ok_or(ApplyError::InvalidLocation { bank, channel })?;
        if target.has_program() {
            return Ok(false);
        }
        target.set_duty(duty);
        self.registry.apply(bank, channel)?;
        Ok(true)
    }

    /// Persist one channel's assignment
    pub fn save_assignment<S: AssignmentStore>(
        &self,
        store: &mut S,
        bank: u8,
        channel: u8,
    ) -> Result<(), S::Error> {
        store.save_assignment(bank, channel, self.kind(bank, channel))
    }

    /// Persist every channel's assignment, including unassigned ones
    #[allow(clippy::cast_possible_truncation)]
    pub fn save_all<S: AssignmentStore>(&self, store: &mut S) -> Result<usize, S::Error> {
        let mut saved = 0;
        for bank in 0..self.registry.bank_count() {
            for channel in 0..CHANNELS as u8 {
                self.save_assignment(store, bank, channel)?;
                saved += 1;
            }
        }
        Ok(saved)
    }

    pub fn registry(&self) -> &BankRegistry<D, BANKS, CHANNELS> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BankRegistry<D, BANKS, CHANNELS> {
        &mut self.registry
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}
