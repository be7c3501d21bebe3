//! Poll scheduler and gateway lifecycle.
//!
//! One polling loop per category; categories run independently so a slow
//! archive request never delays live telemetry. Each cycle fetches every
//! device of the category, runs registration once per category/device
//! (the ledger remembers), then synchronizes values. Any per-cycle error
//! skips that category for the cycle and flips the connectivity
//! indicator; nothing is fatal.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use solgate_core::{
    GatewayConfig, StateDescriptor, StateKey, StateRole, StateStore, StateType, StateValue,
};

use crate::categories::{all_adapters, CategoryAdapter, SiteAdapter};
use crate::client::TelemetryClient;
use crate::error::{GatewayError, GatewayResult};
use crate::registrar::{RegistrationLedger, StateRegistrar};
use crate::sync::ValueSynchronizer;
use crate::walker::TreeWalker;

/// Flat keys from earlier releases, superseded by the `powerflow.*`
/// namespace. Removed once at startup.
const LEGACY_KEYS: &[&str] = &["site.P_Grid", "site.P_Load", "site.P_Akku", "site.P_PV"];

/// The polling gateway: owns the client, the store front ends and the
/// per-category poll loops.
pub struct Gateway {
    config: GatewayConfig,
    client: TelemetryClient,
    store: Arc<dyn StateStore>,
    registrar: StateRegistrar,
    synchronizer: ValueSynchronizer,
    ledger: RegistrationLedger,
    adapters: Vec<Arc<dyn CategoryAdapter>>,
    running: Arc<RwLock<bool>>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, store: Arc<dyn StateStore>) -> GatewayResult<Self> {
        config
            .validate()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        let client = TelemetryClient::new(&config)?;
        Ok(Self {
            config,
            client,
            store: store.clone(),
            registrar: StateRegistrar::new(store.clone()),
            synchronizer: ValueSynchronizer::new(store),
            ledger: RegistrationLedger::new(),
            adapters: all_adapters(),
            running: Arc::new(RwLock::new(false)),
        })
    }

    /// Whether the poll loops are active.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Start one poll loop per category. Returns immediately; the loops
    /// run until [`Gateway::stop`].
    pub async fn start(self: &Arc<Self>) -> GatewayResult<()> {
        {
            let mut running = self.running.write().await;
            if *running {
                return Ok(());
            }
            *running = true;
        }
        self.startup().await;

        for adapter in self.adapters.clone() {
            let gateway = Arc::clone(self);
            let interval = adapter.interval(&gateway.config);
            info!(
                category = %adapter.category(),
                interval_secs = interval,
                "starting poll loop"
            );
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_secs(interval));
                loop {
                    ticker.tick().await;
                    if !*gateway.running.read().await {
                        break;
                    }
                    gateway.poll_category(adapter.as_ref()).await;
                }
                debug!(category = %adapter.category(), "poll loop stopped");
            });
        }
        Ok(())
    }

    /// Stop all poll loops after their current cycle.
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        if *running {
            info!("stopping poll loops");
            *running = false;
        }
    }

    /// One-time startup pass: the connectivity indicator exists before
    /// the first fetch can fail, and superseded keys are removed.
    async fn startup(&self) {
        let descriptor = StateDescriptor::new("Connected", StateType::Boolean)
            .with_description("Whether the device currently answers telemetry requests")
            .with_role(StateRole::Indicator);
        self.registrar
            .register_if_absent(&connected_key(), descriptor)
            .await;

        for legacy in LEGACY_KEYS {
            match self.store.delete(&StateKey::root(legacy)).await {
                Ok(true) => info!(key = legacy, "removed superseded key"),
                Ok(false) => {}
                Err(e) => warn!(key = legacy, "legacy cleanup failed: {}", e),
            }
        }
    }

    /// Poll every device of one category.
    async fn poll_category(&self, adapter: &dyn CategoryAdapter) {
        for device_id in adapter.device_ids(&self.config) {
            let device_id = device_id.as_deref();
            match self.poll_once(adapter, device_id).await {
                Ok(()) => self.set_connected(true).await,
                Err(e) => {
                    warn!(
                        category = %adapter.category(),
                        device = device_id.unwrap_or("-"),
                        "poll cycle skipped: {}",
                        e
                    );
                    self.set_connected(false).await;
                }
            }
        }
    }

    /// Fetch, register on first observation, then synchronize.
    async fn poll_once(
        &self,
        adapter: &dyn CategoryAdapter,
        device_id: Option<&str>,
    ) -> GatewayResult<()> {
        let url = adapter.endpoint(&self.config, device_id);
        let data = self.client.fetch(&url).await?;
        let body = data
            .as_object()
            .ok_or_else(|| GatewayError::Payload("Body.Data is not an object".to_string()))?;
        let Some(payload) = adapter.payload_root(body, device_id) else {
            debug!(
                category = %adapter.category(),
                device = device_id.unwrap_or("-"),
                "no data for device this cycle"
            );
            return Ok(());
        };

        let base = adapter.base_key(device_id);
        let category = adapter.category();
        if !self.ledger.is_done(category, device_id) {
            TreeWalker::new(&self.registrar)
                .register(&base, payload, adapter)
                .await;
            self.ledger.mark_done(category, device_id);
            info!(
                category = %category,
                device = device_id.unwrap_or("-"),
                "registration pass complete"
            );
        }
        self.synchronizer.sync(&base, payload, adapter).await;
        Ok(())
    }

    async fn set_connected(&self, connected: bool) {
        if let Err(e) = self
            .store
            .write(&connected_key(), StateValue::acknowledged(json!(connected)))
            .await
        {
            warn!("connectivity indicator write failed: {}", e);
        }
    }

    /// Single check request against the device, for diagnostics. Returns
    /// the logger info payload on success.
    pub async fn probe(&self) -> GatewayResult<Value> {
        let url = SiteAdapter.endpoint(&self.config, None);
        self.client.fetch(&url).await
    }
}

fn connected_key() -> StateKey {
    StateKey::root("site").join("connected")
}

#[cfg(test)]
mod tests {
    use solgate_storage::MemoryStateStore;

    use super::*;

    fn gateway() -> Arc<Gateway> {
        let store = Arc::new(MemoryStateStore::new());
        let config = GatewayConfig::new("pv.local");
        Arc::new(Gateway::new(config, store).unwrap())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = Arc::new(MemoryStateStore::new());
        let result = Gateway::new(GatewayConfig::new(""), store);
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_startup_registers_indicator_and_cleans_legacy() {
        let store = Arc::new(MemoryStateStore::new());
        // A stale key from an earlier release.
        store
            .create_if_absent(
                &StateKey::root("site.P_Grid"),
                StateDescriptor::new("Grid power", StateType::Number),
            )
            .await
            .unwrap();

        let config = GatewayConfig::new("pv.local");
        let gateway = Gateway::new(config, store.clone()).unwrap();
        gateway.startup().await;

        let (desc, _) = store.read(&connected_key()).await.unwrap().unwrap();
        assert_eq!(desc.role, StateRole::Indicator);
        assert_eq!(desc.state_type, StateType::Boolean);
        assert!(store
            .read(&StateKey::root("site.P_Grid"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_start_stop() {
        let gateway = gateway();
        assert!(!gateway.is_running().await);
        gateway.start().await.unwrap();
        assert!(gateway.is_running().await);
        // Second start is a no-op.
        gateway.start().await.unwrap();
        gateway.stop().await;
        assert!(!gateway.is_running().await);
    }
}
