//! Site-wide power flow telemetry.
//!
//! One request per site, no device id. The payload nests everything
//! under a `Site` wrapper which the curated keys collapse away.

use solgate_core::{GatewayConfig, StateRole, StateType};

use super::{Category, CategoryAdapter, CuratedField};

const CURATED: &[CuratedField] = &[
    CuratedField::value(
        "Site.P_Grid",
        "Grid power",
        "W",
        "Power at the grid connection point, positive while importing",
    )
    .with_key("P_Grid"),
    CuratedField::value(
        "Site.P_Load",
        "Load power",
        "W",
        "Power consumed by the site, negative by convention",
    )
    .with_key("P_Load"),
    CuratedField::value(
        "Site.P_Akku",
        "Battery power",
        "W",
        "Battery power, positive while discharging",
    )
    .with_key("P_Akku"),
    CuratedField::value("Site.P_PV", "PV power", "W", "Photovoltaic production")
        .with_key("P_PV"),
    CuratedField::value(
        "Site.rel_Autonomy",
        "Autonomy",
        "%",
        "Share of load covered without the grid",
    )
    .with_key("rel_Autonomy"),
    CuratedField::value(
        "Site.rel_SelfConsumption",
        "Self consumption",
        "%",
        "Share of production consumed on site",
    )
    .with_key("rel_SelfConsumption"),
    CuratedField::value("Site.E_Day", "Energy today", "Wh", "Site energy produced today")
        .with_key("E_Day"),
    CuratedField::value("Site.E_Year", "Energy this year", "Wh", "Site energy produced this year")
        .with_key("E_Year"),
    CuratedField::value(
        "Site.E_Total",
        "Energy total",
        "Wh",
        "Site energy produced overall",
    )
    .with_key("E_Total"),
    CuratedField::value(
        "Site.Mode",
        "Operating mode",
        "",
        "Power flow operating mode, e.g. produce-only or meter",
    )
    .with_key("Mode")
    .with_type(StateType::Text)
    .with_role(StateRole::Info),
];

/// Power flow realtime data adapter.
pub struct PowerFlowAdapter;

impl CategoryAdapter for PowerFlowAdapter {
    fn category(&self) -> Category {
        Category::PowerFlow
    }

    fn endpoint(&self, config: &GatewayConfig, _device_id: Option<&str>) -> String {
        format!(
            "{}/solar_api/v1/GetPowerFlowRealtimeData.fcgi",
            config.base_url()
        )
    }

    fn device_ids(&self, _config: &GatewayConfig) -> Vec<Option<String>> {
        vec![None]
    }

    fn curated(&self) -> &'static [CuratedField] {
        CURATED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_wrapper_collapsed() {
        let grid = CURATED.iter().find(|f| f.field == "Site.P_Grid").unwrap();
        let base = PowerFlowAdapter.base_key(None);
        assert_eq!(base.join(grid.key).as_str(), "powerflow.P_Grid");
    }

    #[test]
    fn test_mode_is_informational_text() {
        let mode = CURATED.iter().find(|f| f.field == "Site.Mode").unwrap();
        assert_eq!(mode.state_type, StateType::Text);
        assert_eq!(mode.role, StateRole::Info);
    }
}
