//! Data logger / system information.
//!
//! Slow-changing device metadata, polled at the normal interval but
//! effectively static. Keys collapse the `LoggerInfo` wrapper.

use solgate_core::GatewayConfig;

use super::{Category, CategoryAdapter, CuratedField};

const CURATED: &[CuratedField] = &[
    CuratedField::meta("LoggerInfo.ProductID", "Product", "Data logger product identifier")
        .with_key("ProductID"),
    CuratedField::meta("LoggerInfo.PlatformID", "Platform", "Data logger hardware platform")
        .with_key("PlatformID"),
    CuratedField::meta("LoggerInfo.HWVersion", "Hardware version", "Data logger hardware revision")
        .with_key("HWVersion"),
    CuratedField::meta("LoggerInfo.SWVersion", "Software version", "Data logger firmware version")
        .with_key("SWVersion"),
    CuratedField::meta("LoggerInfo.TimezoneName", "Timezone", "Configured timezone name")
        .with_key("TimezoneName"),
    CuratedField::meta(
        "LoggerInfo.TimezoneLocation",
        "Timezone location",
        "Configured timezone location",
    )
    .with_key("TimezoneLocation"),
    CuratedField::meta("LoggerInfo.UniqueID", "Unique id", "Data logger unique identifier")
        .with_key("UniqueID"),
    CuratedField::value(
        "LoggerInfo.UTCOffset",
        "UTC offset",
        "s",
        "Offset from UTC in seconds",
    )
    .with_key("UTCOffset"),
    CuratedField::value(
        "LoggerInfo.CashFactor",
        "Feed-in tariff",
        "",
        "Configured feed-in tariff per kWh",
    )
    .with_key("CashFactor"),
    CuratedField::meta(
        "LoggerInfo.CashCurrency",
        "Currency",
        "Currency of the configured tariff",
    )
    .with_key("CashCurrency"),
    CuratedField::value(
        "LoggerInfo.CO2Factor",
        "CO2 factor",
        "kg/kWh",
        "Configured CO2 emission factor",
    )
    .with_key("CO2Factor"),
    CuratedField::meta(
        "LoggerInfo.DefaultLanguage",
        "Default language",
        "Web interface default language",
    )
    .with_key("DefaultLanguage"),
];

/// Logger / system information adapter.
pub struct SiteAdapter;

impl CategoryAdapter for SiteAdapter {
    fn category(&self) -> Category {
        Category::Site
    }

    fn endpoint(&self, config: &GatewayConfig, _device_id: Option<&str>) -> String {
        format!("{}/solar_api/v1/GetLoggerInfo.cgi", config.base_url())
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
    use solgate_core::StateType;

    use super::*;

    #[test]
    fn test_logger_wrapper_collapsed() {
        let sw = CURATED
            .iter()
            .find(|f| f.field == "LoggerInfo.SWVersion")
            .unwrap();
        assert_eq!(sw.state_type, StateType::Text);
        let base = SiteAdapter.base_key(None);
        assert_eq!(base.join(sw.key).as_str(), "site.SWVersion");
    }
}
