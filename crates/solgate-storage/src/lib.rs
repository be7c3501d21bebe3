//! State store implementations for the solgate gateway.
//!
//! Two backends implement [`solgate_core::StateStore`]:
//! - [`MemoryStateStore`]: volatile, for tests and dry runs
//! - [`RedbStateStore`]: persistent, descriptors and last values survive
//!   gateway restarts (which is what makes create-if-absent
//!   "durable-entry wins" rather than merely "first call wins")

pub mod error;
pub mod memory;
pub mod redb_store;

pub use error::{Error, Result};
pub use memory::MemoryStateStore;
pub use redb_store::RedbStateStore;
