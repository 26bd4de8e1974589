//! The sequential probe pipeline: DNS, then TCP ports, then UDP ports, then
//! status evaluation.
//!
//! ```rust,no_run
//! use netdiag::diagnostic::{Diagnostic, DiagnosticConfig};
//! use netdiag::utils::LogFacade;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DiagnosticConfig::new("example.com").with_tcp_ports(vec![80, 443]);
//!     let summary = Diagnostic::new(config).with_log(&LogFacade).run().await.unwrap();
//!     println!("{}", summary.overall_status);
//! }
//! ```

use crate::dns::{HostResolver, Resolver};
use crate::network::{TcpProbe, UdpProbe, DEFAULT_PROBE_TIMEOUT};
use crate::summary::{DiagnosticSummary, SummaryError};
use crate::utils::{format_duration, LogSink, NOOP};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TCP_PORTS: [u32; 2] = [80, 443];
pub const DEFAULT_UDP_PORTS: [u32; 1] = [53];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticError {
    #[error("target cannot be empty")]
    EmptyTarget,
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticConfig {
    pub target: String,
    pub tcp_ports: Vec<u32>,
    pub udp_ports: Vec<u32>,
    pub timeout: Duration,
}

impl DiagnosticConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            tcp_ports: DEFAULT_TCP_PORTS.to_vec(),
            udp_ports: DEFAULT_UDP_PORTS.to_vec(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_tcp_ports(mut self, ports: Vec<u32>) -> Self {
        self.tcp_ports = ports;
        self
    }

    pub fn with_udp_ports(mut self, ports: Vec<u32>) -> Self {
        self.udp_ports = ports;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct Diagnostic<'a, R = Resolver> {
    config: DiagnosticConfig,
    resolver: R,
    log: &'a dyn LogSink,
}

impl<'a> Diagnostic<'a, Resolver> {
    /// Uses the system resolver with the configured timeout.
    pub fn new(config: DiagnosticConfig) -> Self {
        let resolver = Resolver::with_timeout(config.timeout);
        Self {
            config,
            resolver,
            log: &NOOP,
        }
    }
}

impl<'a, R: HostResolver> Diagnostic<'a, R> {
    pub fn with_resolver<S: HostResolver>(self, resolver: S) -> Diagnostic<'a, S> {
        Diagnostic {
            config: self.config,
            resolver,
            log: self.log,
        }
    }

    pub fn with_log(mut self, log: &'a dyn LogSink) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    /// Runs every configured check in order and returns the evaluated summary.
    ///
    /// A failed DNS resolution skips the TCP and UDP probes: the summary
    /// carries only the DNS outcome and an `UNREACHABLE` status.
    pub async fn run(self) -> Result<DiagnosticSummary, DiagnosticError> {
        let hostname = self.config.target.trim().to_string();
        if hostname.is_empty() {
            return Err(DiagnosticError::EmptyTarget);
        }

        self.log_header(&hostname);

        let resolution = self.resolver.resolve(&hostname, self.log).await;

        if !resolution.success {
            let mut summary = DiagnosticSummary::new(hostname, None);
            summary.record_dns(false, resolution.value);
            summary.evaluate_overall_status()?;
            return Ok(summary);
        }

        let ip = resolution.value;
        let mut summary = DiagnosticSummary::new(hostname, Some(ip.clone()));
        summary.record_dns(true, format!("Resolved to {ip}"));

        for &port in &self.config.tcp_ports {
            let result = TcpProbe::new(ip.as_str(), port)
                .with_timeout(self.config.timeout)
                .with_log(self.log)
                .run()
                .await;
            summary.record_tcp_probe(port, &result);
        }

        for &port in &self.config.udp_ports {
            let result = UdpProbe::new(ip.as_str(), port)
                .with_timeout(self.config.timeout)
                .with_log(self.log)
                .run()
                .await;
            summary.record_udp_probe(port, &result);
        }

        summary.evaluate_overall_status()?;
        Ok(summary)
    }

    fn log_header(&self, hostname: &str) {
        let rule = "=".repeat(60);
        self.log.emit(&rule);
        self.log.emit(" Network Diagnostic ");
        self.log.emit(&rule);
        self.log.emit(&format!("Target: {hostname}"));
        self.log.emit(&format!("TCP ports: {:?}", self.config.tcp_ports));
        self.log.emit(&format!("UDP ports: {:?} (best-effort)", self.config.udp_ports));
        self.log.emit(&format!("Timeout: {}", format_duration(self.config.timeout)));
        self.log.emit(&rule);
    }
}
