//! Value synchronization.
//!
//! After registration, every leaf key present in the current payload
//! gets its value written: measurement pairs unwrap to their `value`,
//! time series contribute their chronologically last entry, derived
//! fields are computed only when all inputs are present and non-null in
//! the same cycle. Null is never written; the previous value stands and
//! reads as last-known. Written values carry the authoritative flag
//! (`ack = true`) marking them as successful device reads.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use solgate_core::{Error as CoreError, StateKey, StateStore, StateValue};

use crate::categories::{lookup_path, CategoryAdapter};
use crate::classify::{classify, last_series_entry, Leaf};

/// Writes current payload values into registered state entries.
#[derive(Clone)]
pub struct ValueSynchronizer {
    store: Arc<dyn StateStore>,
}

impl ValueSynchronizer {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Synchronize one payload under `base`. Registration for the same
    /// payload must have completed first; a write for a key the store
    /// has not created is dropped with a diagnostic, not retried.
    pub async fn sync(
        &self,
        base: &StateKey,
        payload: &Map<String, Value>,
        adapter: &dyn CategoryAdapter,
    ) {
        // Curated fields first, under their (possibly collapsed) keys.
        for field in adapter.curated() {
            if let Some(value) = lookup_path(payload, field.field) {
                self.sync_leaf(&base.join(field.key), value).await;
            }
        }

        for derived in adapter.derived() {
            let left = extract_number(payload, derived.left);
            let right = extract_number(payload, derived.right);
            // Skipped entirely for the cycle unless both inputs are
            // simultaneously present and non-null.
            if let (Some(left), Some(right)) = (left, right) {
                if let Some(product) = Number::from_f64(left * right) {
                    self.write(&base.join(derived.output), Value::Number(product))
                        .await;
                }
            }
        }

        for projection in adapter.text_projections() {
            if let Some(code) = extract_integer(payload, projection.input) {
                let text = (projection.table)(code);
                self.write(&base.join(projection.output), Value::String(text.into_owned()))
                    .await;
            }
        }

        // Everything else, recursively, mirroring the fallback walk.
        let covered: HashSet<&str> = adapter.curated().iter().map(|f| f.field).collect();
        for (name, value) in payload {
            self.sync_fallback(base, name, name, value, &covered).await;
        }
    }

    async fn sync_fallback(
        &self,
        parent: &StateKey,
        name: &str,
        path: &str,
        value: &Value,
        covered: &HashSet<&str>,
    ) {
        if covered.contains(path) {
            return;
        }
        match classify(value) {
            Leaf::Null => {}
            Leaf::Container(map) => {
                let key = parent.join(name);
                for (child_name, child_value) in map {
                    let child_path = format!("{}.{}", path, child_name);
                    Box::pin(self.sync_fallback(
                        &key,
                        child_name,
                        &child_path,
                        child_value,
                        covered,
                    ))
                    .await;
                }
            }
            _ => self.sync_leaf(&parent.join(name), value).await,
        }
    }

    /// Extract and write the current value of one leaf.
    async fn sync_leaf(&self, key: &StateKey, value: &Value) {
        match classify(value) {
            Leaf::Null => {
                // Temporarily unavailable; previous value stands.
                debug!(key = %key, "null value skipped");
            }
            Leaf::Scalar { value, .. } => self.write(key, value.clone()).await,
            Leaf::Measurement { value, .. } => self.write(key, value.clone()).await,
            Leaf::Series(map) => {
                if let Some(last) = last_series_entry(map) {
                    self.write(key, last.clone()).await;
                }
            }
            Leaf::Container(_) => {
                // Containers have no value of their own.
            }
        }
    }

    async fn write(&self, key: &StateKey, value: Value) {
        match self.store.write(key, StateValue::acknowledged(value)).await {
            Ok(()) => {}
            Err(CoreError::NotRegistered(_)) => {
                warn!(key = %key, "value write dropped, key not registered");
            }
            Err(e) => warn!(key = %key, "value write failed: {}", e),
        }
    }
}

/// Numeric payload field, unwrapping measurement pairs. `None` when the
/// field is absent, null or not a number.
pub(crate) fn extract_number(payload: &Map<String, Value>, path: &str) -> Option<f64> {
    let value = lookup_path(payload, path)?;
    match classify(value) {
        Leaf::Scalar { value, .. } | Leaf::Measurement { value, .. } => value.as_f64(),
        _ => None,
    }
}

/// Integer payload field, unwrapping measurement pairs.
pub(crate) fn extract_integer(payload: &Map<String, Value>, path: &str) -> Option<i64> {
    let value = lookup_path(payload, path)?;
    match classify(value) {
        Leaf::Scalar { value, .. } | Leaf::Measurement { value, .. } => value.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use solgate_core::{StateDescriptor, StateType};
    use solgate_storage::MemoryStateStore;

    use super::*;
    use crate::categories::InverterAdapter;
    use crate::registrar::StateRegistrar;
    use crate::walker::TreeWalker;

    async fn synced_fixture(
        payload: &Value,
    ) -> (Arc<MemoryStateStore>, StateKey) {
        let store = Arc::new(MemoryStateStore::new());
        let registrar = StateRegistrar::new(store.clone());
        let base = StateKey::root("inverter").join("1");
        let map = payload.as_object().unwrap();

        TreeWalker::new(&registrar)
            .register(&base, map, &InverterAdapter)
            .await;
        ValueSynchronizer::new(store.clone())
            .sync(&base, map, &InverterAdapter)
            .await;
        (store, base)
    }

    async fn value_of(store: &MemoryStateStore, key: &StateKey) -> Option<Value> {
        store
            .read(key)
            .await
            .unwrap()
            .and_then(|(_, v)| v)
            .map(|v| v.value)
    }

    #[tokio::test]
    async fn test_measurement_unwrap_and_ack() {
        let (store, base) = synced_fixture(&json!({"PAC": {"value": 1000, "unit": "W"}})).await;
        let (_, value) = store.read(&base.join("PAC")).await.unwrap().unwrap();
        let value = value.unwrap();
        assert_eq!(value.value, json!(1000));
        assert!(value.ack);
    }

    #[tokio::test]
    async fn test_null_is_never_written() {
        let store = Arc::new(MemoryStateStore::new());
        let base = StateKey::root("inverter").join("1");
        let key = base.join("PAC");
        store
            .create_if_absent(&key, StateDescriptor::new("AC power", StateType::Number))
            .await
            .unwrap();
        store
            .write(&key, StateValue::acknowledged(json!(900)))
            .await
            .unwrap();

        let payload = json!({"PAC": null});
        ValueSynchronizer::new(store.clone())
            .sync(&base, payload.as_object().unwrap(), &InverterAdapter)
            .await;

        // Previous value still standing.
        assert_eq!(value_of(&store, &key).await, Some(json!(900)));
    }

    #[tokio::test]
    async fn test_derived_field_gating() {
        let (store, base) = synced_fixture(&json!({
            "Voltage_DC_String_1": 300,
            "Current_DC_String_1": 5
        }))
        .await;
        let derived = value_of(&store, &base.join("Power_DC_String_1")).await.unwrap();
        assert_eq!(derived.as_f64(), Some(1500.0));

        // One input missing this cycle: no derived write.
        let payload = json!({"Voltage_DC_String_1": 310});
        ValueSynchronizer::new(store.clone())
            .sync(&base, payload.as_object().unwrap(), &InverterAdapter)
            .await;
        let unchanged = value_of(&store, &base.join("Power_DC_String_1")).await.unwrap();
        assert_eq!(unchanged.as_f64(), Some(1500.0));
    }

    #[tokio::test]
    async fn test_time_series_takes_last_entry() {
        let store = Arc::new(MemoryStateStore::new());
        let registrar = StateRegistrar::new(store.clone());
        let base = StateKey::root("inverter").join("1");
        let payload = json!({"Readings": {"0": 10, "1": 12, "2": 9}});
        let map = payload.as_object().unwrap();

        TreeWalker::new(&registrar)
            .register(&base, map, &InverterAdapter)
            .await;
        ValueSynchronizer::new(store.clone())
            .sync(&base, map, &InverterAdapter)
            .await;

        assert_eq!(
            value_of(&store, &base.join("Readings")).await,
            Some(json!(9))
        );
    }

    #[tokio::test]
    async fn test_unregistered_write_is_dropped() {
        let store = Arc::new(MemoryStateStore::new());
        let base = StateKey::root("inverter").join("1");
        // Sync without registration: nothing may be created.
        let payload = json!({"PAC": 1000});
        ValueSynchronizer::new(store.clone())
            .sync(&base, payload.as_object().unwrap(), &InverterAdapter)
            .await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_status_text_projection() {
        let (store, base) = synced_fixture(&json!({
            "DeviceStatus": {"StatusCode": 7, "ErrorCode": 0}
        }))
        .await;
        assert_eq!(
            value_of(&store, &base.join("StatusText")).await,
            Some(json!("Running"))
        );
        assert_eq!(
            value_of(&store, &base.join("ErrorText")).await,
            Some(json!("No error"))
        );
    }
}
