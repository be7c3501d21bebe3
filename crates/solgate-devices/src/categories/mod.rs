//! Device category adapters.
//!
//! One adapter per telemetry category. Adapters are thin and mostly
//! declarative: an endpoint, a curated field table with human-authored
//! metadata, and optional derived values / code-to-text projections.
//! The generic walker and synchronizer do the actual work.

use std::borrow::Cow;

use serde_json::{Map, Value};

use solgate_core::state::SEPARATOR;
use solgate_core::{GatewayConfig, StateDescriptor, StateKey, StateRole, StateType};

mod archive;
mod inverter;
mod meter;
mod powerflow;
mod site;
mod storage;

pub use archive::ArchiveAdapter;
pub use inverter::InverterAdapter;
pub use meter::MeterAdapter;
pub use powerflow::PowerFlowAdapter;
pub use site::SiteAdapter;
pub use storage::StorageAdapter;

/// Telemetry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Inverter,
    Meter,
    Storage,
    PowerFlow,
    Site,
    Archive,
}

impl Category {
    /// Key namespace prefix for this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Inverter => "inverter",
            Self::Meter => "meter",
            Self::Storage => "storage",
            Self::PowerFlow => "powerflow",
            Self::Site => "site",
            Self::Archive => "archive",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A field known a priori for a category, with human-authored metadata.
///
/// `field` is the payload path (possibly compound, `Details.Serial`);
/// `key` is the state key segment it maps to. When the API groups leaves
/// under a meaningless wrapper, `key` collapses the wrapper away and the
/// two differ; otherwise `key` equals `field`.
#[derive(Debug, Clone, Copy)]
pub struct CuratedField {
    pub field: &'static str,
    pub key: &'static str,
    pub name: &'static str,
    pub state_type: StateType,
    pub unit: &'static str,
    pub description: &'static str,
    pub role: StateRole,
}

impl CuratedField {
    pub const fn value(
        field: &'static str,
        name: &'static str,
        unit: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            field,
            key: field,
            name,
            state_type: StateType::Number,
            unit,
            description,
            role: StateRole::Value,
        }
    }

    pub const fn meta(field: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            field,
            key: field,
            name,
            state_type: StateType::Text,
            unit: "",
            description,
            role: StateRole::Meta,
        }
    }

    pub const fn with_key(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    pub const fn with_type(mut self, state_type: StateType) -> Self {
        self.state_type = state_type;
        self
    }

    pub const fn with_role(mut self, role: StateRole) -> Self {
        self.role = role;
        self
    }

    /// Descriptor carrying the curated metadata.
    pub fn descriptor(&self) -> StateDescriptor {
        StateDescriptor::new(self.name, self.state_type)
            .with_unit(self.unit)
            .with_description(self.description)
            .with_role(self.role)
    }
}

/// A value computed from two payload fields when both are present and
/// non-null in the same cycle (e.g. DC power from voltage and current).
/// The result is the product of the inputs.
#[derive(Debug, Clone, Copy)]
pub struct DerivedField {
    pub output: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
}

/// Projection of a numeric code field onto a human-readable text entry,
/// backed by a static lookup table.
#[derive(Debug, Clone, Copy)]
pub struct TextProjection {
    pub input: &'static str,
    pub output: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub table: fn(i64) -> Cow<'static, str>,
}

/// One telemetry category's curated knowledge.
pub trait CategoryAdapter: Send + Sync {
    /// The category this adapter covers.
    fn category(&self) -> Category;

    /// Request URL for one poll of the given device.
    fn endpoint(&self, config: &GatewayConfig, device_id: Option<&str>) -> String;

    /// Devices to poll each cycle; `None` means one site-wide request.
    fn device_ids(&self, config: &GatewayConfig) -> Vec<Option<String>>;

    /// Curated field table.
    fn curated(&self) -> &'static [CuratedField];

    /// Derived values, if any.
    fn derived(&self) -> &'static [DerivedField] {
        &[]
    }

    /// Code-to-text projections, if any.
    fn text_projections(&self) -> &'static [TextProjection] {
        &[]
    }

    /// Poll interval in seconds.
    fn interval(&self, config: &GatewayConfig) -> u64 {
        config.poll_interval
    }

    /// Subtree of the response body to walk for one device. `None` when
    /// the body carries nothing for this device in this cycle. Most
    /// categories walk the body directly; archive unwraps its per-device
    /// grouping first.
    fn payload_root<'a>(
        &self,
        body: &'a Map<String, Value>,
        _device_id: Option<&str>,
    ) -> Option<&'a Map<String, Value>> {
        Some(body)
    }

    /// Root key for one device's entries.
    fn base_key(&self, device_id: Option<&str>) -> StateKey {
        let base = StateKey::root(self.category().prefix());
        match device_id {
            Some(id) => base.join(id),
            None => base,
        }
    }
}

/// All category adapters, in poll order.
pub fn all_adapters() -> Vec<std::sync::Arc<dyn CategoryAdapter>> {
    vec![
        std::sync::Arc::new(InverterAdapter),
        std::sync::Arc::new(MeterAdapter),
        std::sync::Arc::new(StorageAdapter),
        std::sync::Arc::new(PowerFlowAdapter),
        std::sync::Arc::new(SiteAdapter),
        std::sync::Arc::new(ArchiveAdapter),
    ]
}

/// Resolve a possibly-compound field path (`Details.Serial`) against a
/// payload object. Missing segments resolve to `None`; that is not an
/// error, firmware variants omit different subsets of fields.
pub fn lookup_path<'a>(payload: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split(SEPARATOR);
    let first = segments.next()?;
    let mut current = payload.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
