//! Inverter realtime telemetry.

use solgate_core::{GatewayConfig, StateRole};

use crate::codes;

use super::{Category, CategoryAdapter, CuratedField, DerivedField, TextProjection};

const CURATED: &[CuratedField] = &[
    CuratedField::value("PAC", "AC power", "W", "AC power output"),
    CuratedField::value("IAC", "AC current", "A", "AC current"),
    CuratedField::value("UAC", "AC voltage", "V", "AC voltage"),
    CuratedField::value("FAC", "AC frequency", "Hz", "AC grid frequency"),
    CuratedField::value(
        "Voltage_DC_String_1",
        "DC voltage string 1",
        "V",
        "DC voltage of string 1",
    ),
    CuratedField::value(
        "Current_DC_String_1",
        "DC current string 1",
        "A",
        "DC current of string 1",
    ),
    CuratedField::value(
        "Voltage_DC_String_2",
        "DC voltage string 2",
        "V",
        "DC voltage of string 2",
    ),
    CuratedField::value(
        "Current_DC_String_2",
        "DC current string 2",
        "A",
        "DC current of string 2",
    ),
    CuratedField::value("DAY_ENERGY", "Energy today", "Wh", "Energy produced today"),
    CuratedField::value(
        "YEAR_ENERGY",
        "Energy this year",
        "Wh",
        "Energy produced this year",
    ),
    CuratedField::value(
        "TOTAL_ENERGY",
        "Energy total",
        "Wh",
        "Energy produced over the device lifetime",
    ),
    CuratedField::value(
        "DeviceStatus.StatusCode",
        "Status code",
        "",
        "Numeric operating state",
    )
    .with_role(StateRole::Meta),
    CuratedField::value(
        "DeviceStatus.ErrorCode",
        "Error code",
        "",
        "Numeric fault code, 0 when healthy",
    )
    .with_role(StateRole::Meta),
    CuratedField::meta("Details.Manufacturer", "Manufacturer", "Device manufacturer"),
    CuratedField::meta("Details.Model", "Model", "Device model name"),
    CuratedField::meta("Details.Serial", "Serial number", "Device serial number"),
];

const DERIVED: &[DerivedField] = &[
    DerivedField {
        output: "Power_DC_String_1",
        left: "Voltage_DC_String_1",
        right: "Current_DC_String_1",
        name: "DC power string 1",
        unit: "W",
        description: "DC power of string 1, voltage times current",
    },
    DerivedField {
        output: "Power_DC_String_2",
        left: "Voltage_DC_String_2",
        right: "Current_DC_String_2",
        name: "DC power string 2",
        unit: "W",
        description: "DC power of string 2, voltage times current",
    },
];

const PROJECTIONS: &[TextProjection] = &[
    TextProjection {
        input: "DeviceStatus.StatusCode",
        output: "StatusText",
        name: "Status",
        description: "Operating state as text",
        table: codes::status_text,
    },
    TextProjection {
        input: "DeviceStatus.ErrorCode",
        output: "ErrorText",
        name: "Error",
        description: "Fault code as text",
        table: codes::error_text,
    },
];

/// Inverter realtime data adapter.
pub struct InverterAdapter;

impl CategoryAdapter for InverterAdapter {
    fn category(&self) -> Category {
        Category::Inverter
    }

    fn endpoint(&self, config: &GatewayConfig, device_id: Option<&str>) -> String {
        format!(
            "{}/solar_api/v1/GetInverterRealtimeData.cgi?Scope=Device&DeviceId={}&DataCollection=CommonInverterData",
            config.base_url(),
            device_id.unwrap_or("1")
        )
    }

    fn device_ids(&self, config: &GatewayConfig) -> Vec<Option<String>> {
        config.inverters().into_iter().map(Some).collect()
    }

    fn curated(&self) -> &'static [CuratedField] {
        CURATED
    }

    fn derived(&self) -> &'static [DerivedField] {
        DERIVED
    }

    fn text_projections(&self) -> &'static [TextProjection] {
        PROJECTIONS
    }
}
