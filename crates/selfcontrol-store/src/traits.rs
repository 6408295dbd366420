//! Store trait definitions

use crate::{PersistedState, StateLock, StoreResult};

/// Load/save access to the shared record.
///
/// There is no in-memory copy shared between actors: every interaction
/// point loads fresh and saves the whole record back.
pub trait StateStore: Send + Sync {
    /// Load the record. A missing record is an empty state, not an error.
    fn load(&self) -> StoreResult<PersistedState>;

    /// Overwrite the record in full
    fn save(&self, state: &PersistedState) -> StoreResult<()>;

    /// Serialize a load-mutate-save cycle against other actors.
    ///
    /// Hold the returned guard for the whole cycle. In simple coordination
    /// mode this never blocks and the guard protects nothing.
    fn lock(&self) -> StoreResult<StateGuard>;
}

/// Held for the duration of one load-mutate-save cycle
#[derive(Debug)]
pub enum StateGuard {
    /// Simple mode: no cross-actor exclusion
    Unlocked,

    /// Exclusive advisory lock, released on drop
    Locked(StateLock),
}

impl StateGuard {
    pub fn is_locked(&self) -> bool {
        matches!(self, StateGuard::Locked(_))
    }
}
