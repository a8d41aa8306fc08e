use core::fmt::Debug;

use crate::program::ProgramKind;

/// Persistent storage of per-channel program assignments
///
/// Implemented by the firmware's key-value storage. The engine reads every
/// channel on [`initialize`](crate::ProgramEngine::initialize) and writes on
/// explicit save requests.
pub trait AssignmentStore {
    type Error: Debug;

    /// Stored program for a channel, or `None` if nothing was saved
    fn load_assignment(&mut self, bank: u8, channel: u8)
    -> Result<Option<ProgramKind>, Self::Error>;

    fn save_assignment(
        &mut self,
        bank: u8,
        channel: u8,
        kind: ProgramKind,
    ) -> Result<(), Self::Error>;
}
