//! Aggregation of per-check results into one diagnostic summary.
//!
//! A summary is created once per run, filled by the `record_*` calls in probe
//! order and finalized by [`DiagnosticSummary::evaluate_overall_status`].
//!
//! ```rust
//! use netdiag::summary::{DiagnosticSummary, OverallStatus};
//!
//! let mut summary = DiagnosticSummary::new("example.com", Some("93.184.216.34".to_string()));
//! summary.record_dns(true, "Resolved to 93.184.216.34");
//! summary.record_tcp(80, true, "Connection successful (12.5 ms)");
//! summary.record_tcp(443, false, "TCP connection timed out");
//! summary.record_udp(53, true, "No response received (UDP is connectionless)");
//!
//! assert_eq!(
//!     summary.evaluate_overall_status().unwrap(),
//!     OverallStatus::PartiallyReachable
//! );
//! ```

use crate::network::ProbeResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod port_map;
pub mod report;

pub use port_map::*;
pub use report::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("overall status evaluated before the DNS result was recorded")]
    DnsNotRecorded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverallStatus {
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "UNREACHABLE")]
    Unreachable,
    #[serde(rename = "PARTIALLY REACHABLE")]
    PartiallyReachable,
    #[serde(rename = "REACHABLE")]
    Reachable,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Unknown => "UNKNOWN",
            OverallStatus::Unreachable => "UNREACHABLE",
            OverallStatus::PartiallyReachable => "PARTIALLY REACHABLE",
            OverallStatus::Reachable => "REACHABLE",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub success: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyRecord {
    pub success: bool,
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub target: String,
    pub ip_address: Option<String>,
    pub dns: Option<CheckOutcome>,
    pub tcp: PortMap<CheckOutcome>,
    pub udp: PortMap<CheckOutcome>,
    pub latency: PortMap<LatencyRecord>,
    pub overall_status: OverallStatus,
}

impl DiagnosticSummary {
    pub fn new(target: impl Into<String>, ip_address: Option<String>) -> Self {
        Self {
            target: target.into(),
            ip_address,
            dns: None,
            tcp: PortMap::new(),
            udp: PortMap::new(),
            latency: PortMap::new(),
            overall_status: OverallStatus::Unknown,
        }
    }

    pub fn record_dns(&mut self, success: bool, detail: impl Into<String>) {
        self.dns = Some(CheckOutcome {
            success,
            detail: detail.into(),
        });
    }

    pub fn record_tcp(&mut self, port: u32, success: bool, detail: impl Into<String>) {
        self.tcp.insert(
            port,
            CheckOutcome {
                success,
                detail: detail.into(),
            },
        );
    }

    pub fn record_udp(&mut self, port: u32, success: bool, detail: impl Into<String>) {
        self.udp.insert(
            port,
            CheckOutcome {
                success,
                detail: detail.into(),
            },
        );
    }

    pub fn record_latency(&mut self, port: u32, success: bool, latency_ms: Option<f64>) {
        self.latency.insert(
            port,
            LatencyRecord {
                success,
                latency_ms,
            },
        );
    }

    /// Records a TCP probe and the latency entry derived from it.
    pub fn record_tcp_probe(&mut self, port: u32, result: &ProbeResult) {
        self.record_tcp(port, result.success, result.detail.clone());
        match (result.success, result.latency_ms) {
            (true, Some(latency_ms)) => self.record_latency(port, true, Some(latency_ms)),
            _ => self.record_latency(port, false, None),
        }
    }

    pub fn record_udp_probe(&mut self, port: u32, result: &ProbeResult) {
        self.record_udp(port, result.success, result.detail.clone());
    }

    /// Derives and stores the overall status. DNS must have been recorded.
    pub fn evaluate_overall_status(&mut self) -> Result<OverallStatus, SummaryError> {
        let dns = self.dns.as_ref().ok_or(SummaryError::DnsNotRecorded)?;
        let status = overall_status(dns.success, self.tcp.values().map(|tcp| tcp.success));
        self.overall_status = status;
        Ok(status)
    }
}

/// DNS failure means unreachable; otherwise any failed TCP port makes the
/// target partially reachable. UDP outcomes are not an input.
pub fn overall_status(dns_ok: bool, tcp_results: impl IntoIterator<Item = bool>) -> OverallStatus {
    if !dns_ok {
        OverallStatus::Unreachable
    } else if tcp_results.into_iter().any(|ok| !ok) {
        OverallStatus::PartiallyReachable
    } else {
        OverallStatus::Reachable
    }
}
