//! API response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal success body: `{"ok": true}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: String,

    /// Service name
    pub service: String,

    /// Service version
    pub version: String,

    /// Name of the active verification store backend
    pub store: String,

    /// Timestamp of health check
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Create a healthy response
    pub fn healthy(
        service: impl Into<String>,
        version: impl Into<String>,
        store: impl Into<String>,
    ) -> Self {
        Self {
            status: String::from("healthy"),
            service: service.into(),
            version: version.into(),
            store: store.into(),
            timestamp: Utc::now(),
        }
    }
}
