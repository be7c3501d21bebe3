//! Telemetry polling and schema inference for the solgate gateway.
//!
//! The gateway polls a solar device's HTTP API, classifies every JSON
//! leaf it has never seen before, registers a matching state entry
//! exactly once and keeps the entry's value current on every later
//! cycle.
//!
//! ## Pipeline
//!
//! - **classify**: one JSON value in, one leaf shape out (scalar,
//!   measurement pair, time series, container, suppressed null)
//! - **categories**: per-category adapters with curated field tables,
//!   derived values and code-to-text projections
//! - **walker** + **registrar**: two-phase create-only registration
//! - **sync**: authoritative value writes after registration
//! - **client** + **poller**: envelope-aware HTTP fetches on per-category
//!   schedules

pub mod categories;
pub mod classify;
pub mod client;
pub mod codes;
pub mod error;
pub mod poller;
pub mod registrar;
pub mod sync;
pub mod walker;

pub use categories::{all_adapters, Category, CategoryAdapter};
pub use client::TelemetryClient;
pub use error::{GatewayError, GatewayResult};
pub use poller::Gateway;
pub use registrar::{RegistrationLedger, StateRegistrar};
pub use sync::ValueSynchronizer;
pub use walker::TreeWalker;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
