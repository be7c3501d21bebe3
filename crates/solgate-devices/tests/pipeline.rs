//! End-to-end pipeline tests: payload in, state entries out, no HTTP.

use std::sync::Arc;

use serde_json::json;

use solgate_core::{StateKey, StateRole, StateStore, StateType};
use solgate_devices::categories::{InverterAdapter, PowerFlowAdapter};
use solgate_devices::{CategoryAdapter, StateRegistrar, TreeWalker, ValueSynchronizer};
use solgate_storage::MemoryStateStore;

async fn run_cycle(
    store: &Arc<MemoryStateStore>,
    adapter: &dyn CategoryAdapter,
    device_id: Option<&str>,
    payload: &serde_json::Value,
) -> StateKey {
    let registrar = StateRegistrar::new(store.clone() as Arc<dyn StateStore>);
    let base = adapter.base_key(device_id);
    let map = payload.as_object().unwrap();
    TreeWalker::new(&registrar)
        .register(&base, map, adapter)
        .await;
    ValueSynchronizer::new(store.clone() as Arc<dyn StateStore>)
        .sync(&base, map, adapter)
        .await;
    base
}

#[tokio::test]
async fn curated_and_unknown_fields_coexist() {
    let store = Arc::new(MemoryStateStore::new());
    let payload = json!({
        "PAC": {"value": 1000, "unit": "W"},
        "UNKNOWN_FIELD": 7
    });

    let base = run_cycle(&store, &InverterAdapter, Some("1"), &payload).await;
    assert_eq!(base.as_str(), "inverter.1");

    // Curated field: human metadata, pair type and unit, current value.
    let (desc, value) = store.read(&base.join("PAC")).await.unwrap().unwrap();
    assert_eq!(desc.name, "AC power");
    assert_eq!(desc.state_type, StateType::Number);
    assert_eq!(desc.unit, "W");
    let value = value.unwrap();
    assert_eq!(value.value, json!(1000));
    assert!(value.ack);

    // Unknown field: generic fallback entry, still synchronized.
    let (desc, value) = store
        .read(&base.join("UNKNOWN_FIELD"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(desc.state_type, StateType::Mixed);
    assert_eq!(desc.unit, "");
    assert_eq!(value.unwrap().value, json!(7));
}

#[tokio::test]
async fn second_cycle_updates_values_without_new_entries() {
    let store = Arc::new(MemoryStateStore::new());

    let first = json!({"PAC": {"value": 1000, "unit": "W"}, "DAY_ENERGY": 5200});
    let base = run_cycle(&store, &InverterAdapter, Some("1"), &first).await;
    let count = store.len().await;

    let second = json!({"PAC": {"value": 850, "unit": "W"}, "DAY_ENERGY": 5400});
    run_cycle(&store, &InverterAdapter, Some("1"), &second).await;

    assert_eq!(store.len().await, count);
    let (_, value) = store.read(&base.join("PAC")).await.unwrap().unwrap();
    assert_eq!(value.unwrap().value, json!(850));
}

#[tokio::test]
async fn absent_field_keeps_last_known_value() {
    let store = Arc::new(MemoryStateStore::new());

    let full = json!({"PAC": 1000, "FAC": 50.02});
    let base = run_cycle(&store, &InverterAdapter, Some("1"), &full).await;

    // Firmware stopped reporting FAC; its entry keeps the old reading.
    let partial = json!({"PAC": 990});
    run_cycle(&store, &InverterAdapter, Some("1"), &partial).await;

    let (_, value) = store.read(&base.join("FAC")).await.unwrap().unwrap();
    assert_eq!(value.unwrap().value, json!(50.02));
}

#[tokio::test]
async fn powerflow_payload_lands_under_collapsed_keys() {
    let store = Arc::new(MemoryStateStore::new());
    let payload = json!({
        "Site": {
            "P_Grid": -230.5,
            "P_Load": -1020.0,
            "P_PV": 1250.5,
            "P_Akku": null,
            "Mode": "meter",
            "rel_Autonomy": 100.0
        }
    });

    let base = run_cycle(&store, &PowerFlowAdapter, None, &payload).await;

    let (desc, value) = store.read(&base.join("P_Grid")).await.unwrap().unwrap();
    assert_eq!(desc.unit, "W");
    assert_eq!(value.unwrap().value, json!(-230.5));

    let (desc, value) = store.read(&base.join("Mode")).await.unwrap().unwrap();
    assert_eq!(desc.state_type, StateType::Text);
    assert_eq!(desc.role, StateRole::Info);
    assert_eq!(value.unwrap().value, json!("meter"));

    // Null battery power is suppressed entirely.
    assert!(store.read(&base.join("P_Akku")).await.unwrap().is_none());
    // Curated keys collapse the wrapper; no Site.* entries exist.
    assert!(store
        .keys(&StateKey::root("powerflow.Site"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn device_status_tree_registers_codes_and_text() {
    let store = Arc::new(MemoryStateStore::new());
    let payload = json!({
        "DeviceStatus": {
            "StatusCode": 7,
            "ErrorCode": 0,
            "LEDState": 0,
            "MgmtTimerRemainingTime": -1
        }
    });

    let base = run_cycle(&store, &InverterAdapter, Some("1"), &payload).await;

    // Curated compound paths keep their compound keys.
    let (desc, value) = store
        .read(&base.join("DeviceStatus.StatusCode"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(desc.role, StateRole::Meta);
    assert_eq!(value.unwrap().value, json!(7));

    // Projected text entries alongside.
    let (_, value) = store.read(&base.join("StatusText")).await.unwrap().unwrap();
    assert_eq!(value.unwrap().value, json!("Running"));

    // Uncurated siblings fall back under the container key.
    let (desc, value) = store
        .read(&base.join("DeviceStatus.LEDState"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(desc.state_type, StateType::Mixed);
    assert_eq!(value.unwrap().value, json!(0));
}
