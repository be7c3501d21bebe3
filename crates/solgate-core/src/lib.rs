//! Core data model for the solgate telemetry gateway.
//!
//! This crate defines the hierarchical state namespace that device
//! telemetry is projected into, the narrow storage interface that hosts
//! implement, and the gateway configuration surface.
//!
//! ## Architecture
//!
//! - **StateKey**: dotted hierarchical key (`inverter.1.PAC`)
//! - **StateDescriptor**: create-only metadata attached to a key
//! - **StateStore**: the host store contract (exists / create-if-absent /
//!   write / delete)
//! - **GatewayConfig**: device address, device-id lists, poll intervals

pub mod config;
pub mod error;
pub mod state;
pub mod store;

pub use config::GatewayConfig;
pub use error::Error;
pub use state::{StateDescriptor, StateKey, StateRole, StateType, StateValue};
pub use store::StateStore;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
