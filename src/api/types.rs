//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::io::{DeviceRecord, ServiceRecord};

/// Fleet snapshot at the most recently completed tick.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// Most recently completed tick.
    pub tick: usize,
    /// Every device's telemetry record at `tick`.
    pub devices: Vec<DeviceRecord>,
    /// Every service's telemetry record at `tick`.
    pub services: Vec<ServiceRecord>,
}

/// Optional tick-range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start tick (inclusive).
    pub from: Option<usize>,
    /// End tick (inclusive).
    pub to: Option<usize>,
}

/// Full telemetry in the requested range.
#[derive(Debug, Serialize)]
pub struct TelemetryResponse {
    pub devices: Vec<DeviceRecord>,
    pub services: Vec<ServiceRecord>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
