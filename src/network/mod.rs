use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod tcp;
pub mod udp;

pub use tcp::*;
pub use udp::*;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a single TCP or UDP probe.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub success: bool,
    pub detail: String,
    pub latency_ms: Option<f64>,
}

impl ProbeResult {
    pub fn success(detail: String, latency_ms: Option<f64>) -> Self {
        Self {
            success: true,
            detail,
            latency_ms,
        }
    }

    pub fn failure(detail: String) -> Self {
        Self {
            success: false,
            detail,
            latency_ms: None,
        }
    }
}
