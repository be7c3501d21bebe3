//! Historical channel data.
//!
//! The archive endpoint returns per-channel time series keyed by
//! seconds-since-midnight offsets; only the most recent sample matters
//! for state, so each `Values` series maps to a single key. Polled on
//! its own, slower interval.

use chrono::Local;
use serde_json::{Map, Value};

use solgate_core::GatewayConfig;

use super::{Category, CategoryAdapter, CuratedField};

const CHANNELS: &str = "Channel=Current_DC_String_1&Channel=Current_DC_String_2\
&Channel=Voltage_DC_String_1&Channel=Voltage_DC_String_2\
&Channel=Temperature_Powerstage";

const CURATED: &[CuratedField] = &[
    CuratedField::value(
        "Current_DC_String_1.Values",
        "DC current string 1",
        "A",
        "Most recent archived DC current of string 1",
    )
    .with_key("Current_DC_String_1"),
    CuratedField::value(
        "Current_DC_String_2.Values",
        "DC current string 2",
        "A",
        "Most recent archived DC current of string 2",
    )
    .with_key("Current_DC_String_2"),
    CuratedField::value(
        "Voltage_DC_String_1.Values",
        "DC voltage string 1",
        "V",
        "Most recent archived DC voltage of string 1",
    )
    .with_key("Voltage_DC_String_1"),
    CuratedField::value(
        "Voltage_DC_String_2.Values",
        "DC voltage string 2",
        "V",
        "Most recent archived DC voltage of string 2",
    )
    .with_key("Voltage_DC_String_2"),
    CuratedField::value(
        "Temperature_Powerstage.Values",
        "Power stage temperature",
        "°C",
        "Most recent archived power stage temperature",
    )
    .with_key("Temperature_Powerstage"),
];

/// Archive data adapter, one request per inverter.
pub struct ArchiveAdapter;

impl CategoryAdapter for ArchiveAdapter {
    fn category(&self) -> Category {
        Category::Archive
    }

    fn endpoint(&self, config: &GatewayConfig, device_id: Option<&str>) -> String {
        let today = Local::now().format("%d.%m.%Y");
        format!(
            "{}/solar_api/v1/GetArchiveData.cgi?Scope=Device&SeriesType=Detail\
&DeviceClass=Inverter&DeviceId={}&StartDate={}&EndDate={}&{}",
            config.base_url(),
            device_id.unwrap_or("1"),
            today,
            today,
            CHANNELS
        )
    }

    fn device_ids(&self, config: &GatewayConfig) -> Vec<Option<String>> {
        config.inverters().into_iter().map(Some).collect()
    }

    fn interval(&self, config: &GatewayConfig) -> u64 {
        config.archive_interval
    }

    fn curated(&self) -> &'static [CuratedField] {
        CURATED
    }

    /// The body groups channels under `inverter/<id>` and a nested
    /// `Data` wrapper; both are unwrapped before the walk.
    fn payload_root<'a>(
        &self,
        body: &'a Map<String, Value>,
        device_id: Option<&str>,
    ) -> Option<&'a Map<String, Value>> {
        let group = format!("inverter/{}", device_id.unwrap_or("1"));
        body.get(&group)?.as_object()?.get("Data")?.as_object()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_archive_interval_is_slower() {
        let config = GatewayConfig::new("pv.local");
        assert_eq!(ArchiveAdapter.interval(&config), config.archive_interval);
        assert!(ArchiveAdapter.interval(&config) > config.poll_interval);
    }

    #[test]
    fn test_payload_root_unwraps_device_group() {
        let body = json!({
            "inverter/1": {
                "Data": {
                    "Voltage_DC_String_1": {
                        "Unit": "V",
                        "Values": {"0": 398.1, "300": 401.5}
                    }
                }
            }
        });
        let body = body.as_object().unwrap();
        let root = ArchiveAdapter.payload_root(body, Some("1")).unwrap();
        assert!(root.contains_key("Voltage_DC_String_1"));
        assert!(ArchiveAdapter.payload_root(body, Some("2")).is_none());
    }

    #[test]
    fn test_series_key_collapses_values_wrapper() {
        let field = CURATED
            .iter()
            .find(|f| f.field == "Voltage_DC_String_1.Values")
            .unwrap();
        let base = ArchiveAdapter.base_key(Some("1"));
        assert_eq!(
            base.join(field.key).as_str(),
            "archive.1.Voltage_DC_String_1"
        );
    }
}
