//! In-memory state store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use solgate_core::error::Result as CoreResult;
use solgate_core::state::{StateDescriptor, StateKey, StateValue};
use solgate_core::{Error as CoreError, StateStore};

#[derive(Debug, Clone)]
struct Entry {
    descriptor: StateDescriptor,
    value: Option<StateValue>,
}

/// Volatile [`StateStore`] backed by a `HashMap`.
///
/// Used by tests and by runs without a configured database path; nothing
/// survives the process.
#[derive(Default)]
pub struct MemoryStateStore {
    entries: Arc<RwLock<HashMap<StateKey, Entry>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, for tests.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn exists(&self, key: &StateKey) -> CoreResult<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn create_if_absent(
        &self,
        key: &StateKey,
        descriptor: StateDescriptor,
    ) -> CoreResult<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.clone(),
            Entry {
                descriptor,
                value: None,
            },
        );
        Ok(true)
    }

    async fn write(&self, key: &StateKey, value: StateValue) -> CoreResult<()> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.value = Some(value);
                Ok(())
            }
            None => Err(CoreError::NotRegistered(key.to_string())),
        }
    }

    async fn read(
        &self,
        key: &StateKey,
    ) -> CoreResult<Option<(StateDescriptor, Option<StateValue>)>> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|e| (e.descriptor.clone(), e.value.clone())))
    }

    async fn delete(&self, key: &StateKey) -> CoreResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self, prefix: &StateKey) -> CoreResult<Vec<StateKey>> {
        let entries = self.entries.read().await;
        let mut keys: Vec<StateKey> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solgate_core::state::StateType;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_only_semantics() {
        let store = MemoryStateStore::new();
        let key = StateKey::root("inverter.1.PAC");
        let first = StateDescriptor::new("AC power", StateType::Number).with_unit("W");
        let second = StateDescriptor::new("something else", StateType::Text);

        assert!(store.create_if_absent(&key, first.clone()).await.unwrap());
        // A different descriptor must not alter the stored one.
        assert!(!store.create_if_absent(&key, second).await.unwrap());

        let (stored, _) = store.read(&key).await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_write_requires_registration() {
        let store = MemoryStateStore::new();
        let key = StateKey::root("meter.0.PowerReal");
        let err = store
            .write(&key, StateValue::acknowledged(json!(42)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotRegistered(_)));
    }

    #[tokio::test]
    async fn test_keys_by_prefix() {
        let store = MemoryStateStore::new();
        for k in ["inverter.1.PAC", "inverter.1.FAC", "inverter.2.PAC", "meter.0.X"] {
            store
                .create_if_absent(
                    &StateKey::root(k),
                    StateDescriptor::new(k, StateType::Number),
                )
                .await
                .unwrap();
        }
        let keys = store.keys(&StateKey::root("inverter").join("1")).await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].as_str(), "inverter.1.FAC");
    }
}
