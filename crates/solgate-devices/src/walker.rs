//! Two-phase registration walk over a payload.
//!
//! The first time a category/device is seen, the walker runs a curated
//! pass (fields the adapter knows a priori, with human-authored
//! metadata) and then a fallback pass (everything else, recursively,
//! with generic metadata). The phases are an explicit protocol: the
//! curated pass future completes before the fallback pass starts, and
//! [`TreeWalker::register`] itself completes before any value write for
//! the same payload begins. Curated metadata therefore always wins on
//! key collision, without timing assumptions.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use solgate_core::{StateDescriptor, StateKey, StateRole, StateType};

use crate::categories::{lookup_path, CategoryAdapter, CuratedField};
use crate::classify::{classify, Leaf};
use crate::registrar::StateRegistrar;
use crate::sync::extract_number;

/// Recursive payload walker driving the registrar.
pub struct TreeWalker<'a> {
    registrar: &'a StateRegistrar,
}

impl<'a> TreeWalker<'a> {
    pub fn new(registrar: &'a StateRegistrar) -> Self {
        Self { registrar }
    }

    /// Register every field of the payload under `base`.
    ///
    /// Completing this future is the registration-phase completion
    /// signal; callers start value writes only afterwards.
    pub async fn register(
        &self,
        base: &StateKey,
        payload: &Map<String, Value>,
        adapter: &dyn CategoryAdapter,
    ) {
        self.curated_pass(base, payload, adapter).await;
        self.fallback_pass(base, payload, adapter.curated()).await;
    }

    /// Phase 1: curated fields present in the payload, plus derived
    /// outputs and text projections whose inputs are present.
    async fn curated_pass(
        &self,
        base: &StateKey,
        payload: &Map<String, Value>,
        adapter: &dyn CategoryAdapter,
    ) {
        for field in adapter.curated() {
            let Some(value) = lookup_path(payload, field.field) else {
                // Firmware variants omit different subsets; not an error.
                continue;
            };
            self.register_curated(&base.join(field.key), field, value)
                .await;
        }

        for derived in adapter.derived() {
            let left = extract_number(payload, derived.left);
            let right = extract_number(payload, derived.right);
            if left.is_some() && right.is_some() {
                let descriptor = StateDescriptor::new(derived.name, StateType::Number)
                    .with_unit(derived.unit)
                    .with_description(derived.description);
                self.registrar
                    .register_if_absent(&base.join(derived.output), descriptor)
                    .await;
            }
        }

        for projection in adapter.text_projections() {
            if lookup_path(payload, projection.input).is_some() {
                let descriptor = StateDescriptor::new(projection.name, StateType::Text)
                    .with_description(projection.description)
                    .with_role(StateRole::Info);
                self.registrar
                    .register_if_absent(&base.join(projection.output), descriptor)
                    .await;
            }
        }
    }

    async fn register_curated(&self, key: &StateKey, field: &CuratedField, value: &Value) {
        let descriptor = match classify(value) {
            Leaf::Null => {
                debug!(key = %key, "null leaf suppressed");
                return;
            }
            // A measurement pair's own unit and runtime type override
            // the curated metadata.
            Leaf::Measurement {
                state_type, unit, ..
            } => {
                let mut descriptor = field.descriptor();
                descriptor.state_type = state_type;
                if let Some(unit) = unit {
                    descriptor.unit = unit.to_string();
                }
                descriptor
            }
            Leaf::Scalar { .. } | Leaf::Series(_) | Leaf::Container(_) => field.descriptor(),
        };
        self.registrar.register_if_absent(key, descriptor).await;
    }

    /// Phase 2: every field not covered by the curated pass, registered
    /// generically. The recursion is shape-driven only; depth is not
    /// special-cased.
    async fn fallback_pass(
        &self,
        base: &StateKey,
        payload: &Map<String, Value>,
        curated: &[CuratedField],
    ) {
        let covered: HashSet<&str> = curated.iter().map(|f| f.field).collect();
        for (name, value) in payload {
            self.register_fallback(base, name, name, value, &covered)
                .await;
        }
    }

    /// `path` is the compound payload path used for coverage checks;
    /// the state key grows alongside it.
    async fn register_fallback(
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
        let key = parent.join(name);
        match classify(value) {
            Leaf::Null => {
                debug!(key = %key, "null leaf suppressed");
            }
            // Unrecognized scalars degrade to the untyped fallback
            // representation.
            Leaf::Scalar { .. } => {
                self.registrar
                    .register_if_absent(&key, StateDescriptor::fallback(name, StateType::Mixed))
                    .await;
            }
            Leaf::Measurement {
                state_type, unit, ..
            } => {
                let mut descriptor = StateDescriptor::fallback(name, state_type);
                if let Some(unit) = unit {
                    descriptor.unit = unit.to_string();
                }
                self.registrar.register_if_absent(&key, descriptor).await;
            }
            Leaf::Series(_) => {
                self.registrar
                    .register_if_absent(&key, StateDescriptor::fallback(name, StateType::Mixed))
                    .await;
            }
            Leaf::Container(map) => {
                for (child_name, child_value) in map {
                    let child_path = format!("{}.{}", path, child_name);
                    Box::pin(self.register_fallback(
                        &key,
                        child_name,
                        &child_path,
                        child_value,
                        covered,
                    ))
                    .await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use solgate_core::{StateStore, StateType};
    use solgate_storage::MemoryStateStore;

    use super::*;
    use crate::categories::InverterAdapter;

    async fn registered(
        store: &MemoryStateStore,
        key: &str,
    ) -> Option<StateDescriptor> {
        store
            .read(&StateKey::root(key))
            .await
            .unwrap()
            .map(|(d, _)| d)
    }

    fn walk_fixture() -> (Arc<MemoryStateStore>, StateRegistrar) {
        let store = Arc::new(MemoryStateStore::new());
        let registrar = StateRegistrar::new(store.clone());
        (store, registrar)
    }

    #[tokio::test]
    async fn test_curated_metadata_wins() {
        let (store, registrar) = walk_fixture();
        let walker = TreeWalker::new(&registrar);
        let payload = json!({"PAC": {"value": 1000, "unit": "W"}});
        let base = StateKey::root("inverter").join("1");

        walker
            .register(&base, payload.as_object().unwrap(), &InverterAdapter)
            .await;

        let desc = registered(&store, "inverter.1.PAC").await.unwrap();
        // Curated display name, runtime type and pair unit.
        assert_eq!(desc.name, "AC power");
        assert_eq!(desc.state_type, StateType::Number);
        assert_eq!(desc.unit, "W");
    }

    #[tokio::test]
    async fn test_fallback_completeness() {
        let (store, registrar) = walk_fixture();
        let walker = TreeWalker::new(&registrar);
        // Nothing here is curated for the inverter category.
        let payload = json!({
            "UNKNOWN_FIELD": 7,
            "Nested": {"Inner": {"Deep": "x"}},
            "Gone": null
        });
        let base = StateKey::root("inverter").join("1");

        walker
            .register(&base, payload.as_object().unwrap(), &InverterAdapter)
            .await;

        // Every reachable non-null field is registered; null is not.
        let unknown = registered(&store, "inverter.1.UNKNOWN_FIELD").await.unwrap();
        assert_eq!(unknown.state_type, StateType::Mixed);
        assert_eq!(unknown.unit, "");
        assert!(registered(&store, "inverter.1.Nested.Inner.Deep")
            .await
            .is_some());
        assert!(registered(&store, "inverter.1.Gone").await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_walks_create_no_duplicates() {
        let (store, registrar) = walk_fixture();
        let walker = TreeWalker::new(&registrar);
        let payload = json!({"PAC": 800, "UNKNOWN_FIELD": 7});
        let base = StateKey::root("inverter").join("1");
        let map = payload.as_object().unwrap();

        walker.register(&base, map, &InverterAdapter).await;
        let count = store.len().await;
        walker.register(&base, map, &InverterAdapter).await;
        assert_eq!(store.len().await, count);
    }

    #[tokio::test]
    async fn test_derived_registered_only_with_both_inputs() {
        let (store, registrar) = walk_fixture();
        let walker = TreeWalker::new(&registrar);
        let base = StateKey::root("inverter").join("1");

        let partial = json!({"Voltage_DC_String_1": 300});
        walker
            .register(&base, partial.as_object().unwrap(), &InverterAdapter)
            .await;
        assert!(registered(&store, "inverter.1.Power_DC_String_1")
            .await
            .is_none());

        let full = json!({"Voltage_DC_String_1": 300, "Current_DC_String_1": 5});
        walker
            .register(&base, full.as_object().unwrap(), &InverterAdapter)
            .await;
        let desc = registered(&store, "inverter.1.Power_DC_String_1")
            .await
            .unwrap();
        assert_eq!(desc.unit, "W");
    }
}
