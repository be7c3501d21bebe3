//! Redb-backed persistent state store.
//!
//! A single unified table holds descriptors and last values under
//! namespaced keys (`descriptor:<key>` / `value:<key>`), JSON-serialized.
//! Existence checks and creation run inside one write transaction, so
//! create-if-absent is atomic even with concurrent category tasks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};

use solgate_core::error::Result as CoreResult;
use solgate_core::state::{StateDescriptor, StateKey, StateValue};
use solgate_core::{Error as CoreError, StateStore};

use crate::error::Result;

const STATE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("solgate_state");

const DESCRIPTOR_NS: &str = "descriptor";
const VALUE_NS: &str = "value";

fn make_key(ns: &str, key: &StateKey) -> String {
    let mut result = String::with_capacity(ns.len() + key.as_str().len() + 1);
    result.push_str(ns);
    result.push(':');
    result.push_str(key.as_str());
    result
}

/// Persistent [`StateStore`] backed by redb.
pub struct RedbStateStore {
    db: Arc<Database>,
    /// Actual file path for temporary databases (for cleanup).
    temp_path: Option<PathBuf>,
}

impl RedbStateStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = if path.exists() {
            Database::open(path)?
        } else {
            Database::create(path)?
        };
        let store = Self {
            db: Arc::new(db),
            temp_path: None,
        };
        store.init_table()?;
        Ok(store)
    }

    /// Create a store backed by a temporary file, removed on drop.
    ///
    /// redb has no true in-memory mode; tests use this instead.
    pub fn temporary() -> Result<Self> {
        let temp_path = std::env::temp_dir().join(format!(
            "solgate_{}_{}.redb",
            std::process::id(),
            nanos_nonce()
        ));
        let db = Database::create(&temp_path)?;
        let store = Self {
            db: Arc::new(db),
            temp_path: Some(temp_path),
        };
        store.init_table()?;
        Ok(store)
    }

    fn init_table(&self) -> Result<()> {
        let txn = self.db.begin_write()?;
        txn.open_table(STATE_TABLE)?;
        txn.commit()?;
        Ok(())
    }

    fn get_raw(&self, namespaced: &str) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(STATE_TABLE)?;
        Ok(table.get(namespaced)?.map(|v| v.value().to_vec()))
    }

    fn put_raw(&self, namespaced: &str, data: &[u8]) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STATE_TABLE)?;
            table.insert(namespaced, data)?;
        }
        txn.commit()?;
        Ok(())
    }
}

fn nanos_nonce() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

#[async_trait]
impl StateStore for RedbStateStore {
    async fn exists(&self, key: &StateKey) -> CoreResult<bool> {
        let raw = self
            .get_raw(&make_key(DESCRIPTOR_NS, key))
            .map_err(CoreError::from)?;
        Ok(raw.is_some())
    }

    async fn create_if_absent(
        &self,
        key: &StateKey,
        descriptor: StateDescriptor,
    ) -> CoreResult<bool> {
        let namespaced = make_key(DESCRIPTOR_NS, key);
        let created = (|| -> Result<bool> {
            let txn = self.db.begin_write()?;
            let created = {
                let mut table = txn.open_table(STATE_TABLE)?;
                if table.get(&*namespaced)?.is_some() {
                    false
                } else {
                    let data = serde_json::to_vec(&descriptor)?;
                    table.insert(&*namespaced, &*data)?;
                    true
                }
            };
            txn.commit()?;
            Ok(created)
        })()
        .map_err(CoreError::from)?;
        Ok(created)
    }

    async fn write(&self, key: &StateKey, value: StateValue) -> CoreResult<()> {
        if !self.exists(key).await? {
            return Err(CoreError::NotRegistered(key.to_string()));
        }
        let data = serde_json::to_vec(&value)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.put_raw(&make_key(VALUE_NS, key), &data)
            .map_err(CoreError::from)
    }

    async fn read(
        &self,
        key: &StateKey,
    ) -> CoreResult<Option<(StateDescriptor, Option<StateValue>)>> {
        let descriptor = match self
            .get_raw(&make_key(DESCRIPTOR_NS, key))
            .map_err(CoreError::from)?
        {
            Some(raw) => serde_json::from_slice::<StateDescriptor>(&raw)
                .map_err(|e| CoreError::Serialization(e.to_string()))?,
            None => return Ok(None),
        };
        let value = match self
            .get_raw(&make_key(VALUE_NS, key))
            .map_err(CoreError::from)?
        {
            Some(raw) => Some(
                serde_json::from_slice::<StateValue>(&raw)
                    .map_err(|e| CoreError::Serialization(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Some((descriptor, value)))
    }

    async fn delete(&self, key: &StateKey) -> CoreResult<bool> {
        let removed = (|| -> Result<bool> {
            let txn = self.db.begin_write()?;
            let removed = {
                let mut table = txn.open_table(STATE_TABLE)?;
                let had_descriptor = table.remove(&*make_key(DESCRIPTOR_NS, key))?.is_some();
                table.remove(&*make_key(VALUE_NS, key))?;
                had_descriptor
            };
            txn.commit()?;
            Ok(removed)
        })()
        .map_err(CoreError::from)?;
        Ok(removed)
    }

    async fn keys(&self, prefix: &StateKey) -> CoreResult<Vec<StateKey>> {
        let keys = (|| -> Result<Vec<StateKey>> {
            let txn = self.db.begin_read()?;
            let table = txn.open_table(STATE_TABLE)?;
            let ns_prefix = format!("{}:", DESCRIPTOR_NS);
            let mut keys = Vec::new();
            for item in table.iter()? {
                let (k, _) = item?;
                if let Some(rest) = k.value().strip_prefix(&ns_prefix) {
                    let key = StateKey::root(rest);
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
            keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            Ok(keys)
        })()
        .map_err(CoreError::from)?;
        Ok(keys)
    }
}

/// Cleanup temporary database file when the store is dropped.
impl Drop for RedbStateStore {
    fn drop(&mut self) {
        if let Some(temp_path) = &self.temp_path {
            if let Err(e) = std::fs::remove_file(temp_path) {
                tracing::debug!(
                    "Failed to remove temporary database file {}: {}",
                    temp_path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solgate_core::state::StateType;

    #[tokio::test]
    async fn test_persisted_descriptor_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.redb");
        let key = StateKey::root("inverter.1.PAC");
        let original = StateDescriptor::new("AC power", StateType::Number).with_unit("W");

        {
            let store = RedbStateStore::open(&path).unwrap();
            assert!(store.create_if_absent(&key, original.clone()).await.unwrap());
            store
                .write(&key, StateValue::acknowledged(json!(1000)))
                .await
                .unwrap();
        }

        // A fresh store over the same file must treat the entry as durable.
        let store = RedbStateStore::open(&path).unwrap();
        let conflicting = StateDescriptor::new("renamed", StateType::Text);
        assert!(!store.create_if_absent(&key, conflicting).await.unwrap());

        let (descriptor, value) = store.read(&key).await.unwrap().unwrap();
        assert_eq!(descriptor, original);
        assert_eq!(value.unwrap().value, json!(1000));
    }

    #[tokio::test]
    async fn test_write_unregistered_key_fails() {
        let store = RedbStateStore::temporary().unwrap();
        let err = store
            .write(
                &StateKey::root("meter.0.X"),
                StateValue::acknowledged(json!(1)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotRegistered(_)));
    }

    #[tokio::test]
    async fn test_delete_and_keys() {
        let store = RedbStateStore::temporary().unwrap();
        for k in ["site.connected", "site.P_Grid", "inverter.1.PAC"] {
            store
                .create_if_absent(
                    &StateKey::root(k),
                    StateDescriptor::new(k, StateType::Mixed),
                )
                .await
                .unwrap();
        }
        assert!(store.delete(&StateKey::root("site.P_Grid")).await.unwrap());
        assert!(!store.delete(&StateKey::root("site.P_Grid")).await.unwrap());

        let keys = store.keys(&StateKey::root("site")).await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].as_str(), "site.connected");
    }
}
