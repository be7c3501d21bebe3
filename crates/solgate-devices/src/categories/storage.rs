//! Battery storage realtime telemetry.
//!
//! The device groups everything under a `Controller` wrapper that means
//! nothing to consumers; curated keys collapse it away.

use solgate_core::{GatewayConfig, StateRole};

use super::{Category, CategoryAdapter, CuratedField};

const CURATED: &[CuratedField] = &[
    CuratedField::value(
        "Controller.StateOfCharge_Relative",
        "State of charge",
        "%",
        "Relative state of charge",
    )
    .with_key("StateOfCharge_Relative"),
    CuratedField::value(
        "Controller.Voltage_DC",
        "DC voltage",
        "V",
        "Battery DC voltage",
    )
    .with_key("Voltage_DC"),
    CuratedField::value(
        "Controller.Current_DC",
        "DC current",
        "A",
        "Battery DC current, negative while discharging",
    )
    .with_key("Current_DC"),
    CuratedField::value(
        "Controller.Temperature_Cell",
        "Cell temperature",
        "°C",
        "Battery cell temperature",
    )
    .with_key("Temperature_Cell"),
    CuratedField::value(
        "Controller.Capacity_Maximum",
        "Maximum capacity",
        "Wh",
        "Nominal battery capacity",
    )
    .with_key("Capacity_Maximum"),
    CuratedField::value(
        "Controller.Enable",
        "Enabled",
        "",
        "Whether the battery is enabled",
    )
    .with_key("Enable")
    .with_role(StateRole::Meta),
    CuratedField::meta("Controller.Details.Manufacturer", "Manufacturer", "Battery manufacturer")
        .with_key("Manufacturer"),
    CuratedField::meta("Controller.Details.Model", "Model", "Battery model name")
        .with_key("Model"),
    CuratedField::meta("Controller.Details.Serial", "Serial number", "Battery serial number")
        .with_key("Serial"),
];

/// Storage realtime data adapter.
pub struct StorageAdapter;

impl CategoryAdapter for StorageAdapter {
    fn category(&self) -> Category {
        Category::Storage
    }

    fn endpoint(&self, config: &GatewayConfig, device_id: Option<&str>) -> String {
        format!(
            "{}/solar_api/v1/GetStorageRealtimeData.cgi?Scope=Device&DeviceId={}",
            config.base_url(),
            device_id.unwrap_or("0")
        )
    }

    fn device_ids(&self, config: &GatewayConfig) -> Vec<Option<String>> {
        config.storages().into_iter().map(Some).collect()
    }

    fn curated(&self) -> &'static [CuratedField] {
        CURATED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_collapsed_in_keys() {
        let soc = CURATED
            .iter()
            .find(|f| f.field == "Controller.StateOfCharge_Relative")
            .unwrap();
        assert_eq!(soc.key, "StateOfCharge_Relative");

        let base = StorageAdapter.base_key(Some("0"));
        assert_eq!(
            base.join(soc.key).as_str(),
            "storage.0.StateOfCharge_Relative"
        );
    }
}
