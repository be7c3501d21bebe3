//! HTTP telemetry client.
//!
//! Fetches one endpoint and peels the vendor response envelope: every
//! response wraps its payload in `{ Head: { Status: { Code, Reason } },
//! Body: { Data } }`. A non-zero status code is a device-side failure
//! and surfaces as [`GatewayError::Api`] with the vendor reason.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use solgate_core::GatewayConfig;

use crate::error::{GatewayError, GatewayResult};

/// Thin wrapper over [`reqwest::Client`] with envelope handling.
#[derive(Clone)]
pub struct TelemetryClient {
    client: Client,
}

impl TelemetryClient {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch one endpoint and return the unwrapped `Body.Data` payload.
    pub async fn fetch(&self, url: &str) -> GatewayResult<Value> {
        debug!(url, "fetching telemetry");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transport(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }
        let envelope: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Payload(e.to_string()))?;
        unwrap_envelope(envelope)
    }
}

/// Validate the response envelope and extract `Body.Data`.
fn unwrap_envelope(envelope: Value) -> GatewayResult<Value> {
    let status = envelope
        .pointer("/Head/Status")
        .ok_or_else(|| GatewayError::Payload("response has no Head.Status".to_string()))?;
    let code = status
        .get("Code")
        .and_then(Value::as_i64)
        .ok_or_else(|| GatewayError::Payload("Head.Status.Code is not a number".to_string()))?;
    if code != 0 {
        let reason = status
            .get("Reason")
            .and_then(Value::as_str)
            .unwrap_or("no reason given");
        return Err(GatewayError::Api(format!("code {}: {}", code, reason)));
    }
    envelope
        .pointer("/Body/Data")
        .cloned()
        .ok_or_else(|| GatewayError::Payload("response has no Body.Data".to_string()))
}
