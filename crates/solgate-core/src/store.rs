//! Host state store contract.
//!
//! The gateway consumes the store through this narrow interface; the
//! implementations live in `solgate-storage`. Creation is create-only:
//! an existing entry's descriptor is never overwritten, including
//! entries persisted by a previous gateway run.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::{StateDescriptor, StateKey, StateValue};

/// Hierarchical key-value store observed by downstream consumers.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Whether an entry exists for the key.
    async fn exists(&self, key: &StateKey) -> Result<bool>;

    /// Create the entry if absent. Returns `true` when a new entry was
    /// created, `false` when a durable entry already existed (in which
    /// case the stored descriptor is preserved untouched).
    async fn create_if_absent(&self, key: &StateKey, descriptor: StateDescriptor) -> Result<bool>;

    /// Write a value for an existing key.
    ///
    /// Fails with [`crate::Error::NotRegistered`] when the key has not
    /// been created; callers drop such writes with a diagnostic rather
    /// than retrying.
    async fn write(&self, key: &StateKey, value: StateValue) -> Result<()>;

    /// Read the descriptor and last value for a key.
    async fn read(&self, key: &StateKey) -> Result<Option<(StateDescriptor, Option<StateValue>)>>;

    /// Delete an entry (used once at startup to drop superseded keys).
    /// Returns `true` when an entry was removed.
    async fn delete(&self, key: &StateKey) -> Result<bool>;

    /// List all keys under a prefix.
    async fn keys(&self, prefix: &StateKey) -> Result<Vec<StateKey>>;
}
