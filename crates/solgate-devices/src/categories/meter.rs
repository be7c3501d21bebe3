//! Smart meter realtime telemetry.

use solgate_core::GatewayConfig;

use super::{Category, CategoryAdapter, CuratedField};

const CURATED: &[CuratedField] = &[
    CuratedField::value("PowerReal_P_Sum", "Real power", "W", "Real power, sum of all phases"),
    CuratedField::value(
        "PowerReactive_Q_Sum",
        "Reactive power",
        "var",
        "Reactive power, sum of all phases",
    ),
    CuratedField::value(
        "PowerApparent_S_Sum",
        "Apparent power",
        "VA",
        "Apparent power, sum of all phases",
    ),
    CuratedField::value("Current_AC_Sum", "AC current", "A", "AC current, sum of all phases"),
    CuratedField::value("Voltage_AC_Phase_1", "Voltage phase 1", "V", "AC voltage on phase 1"),
    CuratedField::value("Voltage_AC_Phase_2", "Voltage phase 2", "V", "AC voltage on phase 2"),
    CuratedField::value("Voltage_AC_Phase_3", "Voltage phase 3", "V", "AC voltage on phase 3"),
    CuratedField::value(
        "Frequency_Phase_Average",
        "Frequency",
        "Hz",
        "Grid frequency, phase average",
    ),
    CuratedField::value(
        "PowerFactor_Sum",
        "Power factor",
        "",
        "Power factor, sum of all phases",
    ),
    CuratedField::value(
        "EnergyReal_WAC_Sum_Consumed",
        "Energy consumed",
        "Wh",
        "Cumulative energy consumed",
    ),
    CuratedField::value(
        "EnergyReal_WAC_Sum_Produced",
        "Energy produced",
        "Wh",
        "Cumulative energy produced",
    ),
    CuratedField::meta("Details.Manufacturer", "Manufacturer", "Meter manufacturer"),
    CuratedField::meta("Details.Model", "Model", "Meter model name"),
    CuratedField::meta("Details.Serial", "Serial number", "Meter serial number"),
];

/// Meter realtime data adapter.
pub struct MeterAdapter;

impl CategoryAdapter for MeterAdapter {
    fn category(&self) -> Category {
        Category::Meter
    }

    fn endpoint(&self, config: &GatewayConfig, device_id: Option<&str>) -> String {
        format!(
            "{}/solar_api/v1/GetMeterRealtimeData.cgi?Scope=Device&DeviceId={}",
            config.base_url(),
            device_id.unwrap_or("0")
        )
    }

    fn device_ids(&self, config: &GatewayConfig) -> Vec<Option<String>> {
        config.meters().into_iter().map(Some).collect()
    }

    fn curated(&self) -> &'static [CuratedField] {
        CURATED
    }
}
