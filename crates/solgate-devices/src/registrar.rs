//! Idempotent state registration.
//!
//! Registration is create-only and safe to call redundantly: the store
//! may already hold entries from a previous gateway run, and
//! "durable-entry wins". Store failures are logged and swallowed so the
//! walk continues to the next key.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use solgate_core::{StateDescriptor, StateKey, StateStore};

use crate::categories::Category;

/// Create-if-absent front end over the host state store.
#[derive(Clone)]
pub struct StateRegistrar {
    store: Arc<dyn StateStore>,
}

impl StateRegistrar {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Ensure an entry exists for the key. A durable entry's descriptor,
    /// including any previously-inferred unit or type, is preserved.
    /// Store failures are non-fatal.
    pub async fn register_if_absent(&self, key: &StateKey, descriptor: StateDescriptor) {
        match self.store.create_if_absent(key, descriptor).await {
            Ok(true) => debug!(key = %key, "registered state"),
            Ok(false) => {}
            Err(e) => warn!(key = %key, "state registration failed: {}", e),
        }
    }
}

/// Tracks, per category/device, whether the one-time registration pass
/// has completed. Explicit per-gateway-instance state; restarting the
/// poll loops resets nothing here unless the gateway itself is rebuilt.
#[derive(Default)]
pub struct RegistrationLedger {
    done: DashMap<(Category, Option<String>), ()>,
}

impl RegistrationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether registration has completed for this category/device.
    pub fn is_done(&self, category: Category, device_id: Option<&str>) -> bool {
        self.done
            .contains_key(&(category, device_id.map(str::to_string)))
    }

    /// Mark registration complete for this category/device.
    pub fn mark_done(&self, category: Category, device_id: Option<&str>) {
        self.done
            .insert((category, device_id.map(str::to_string)), ());
    }
}
