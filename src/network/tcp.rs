use super::{ProbeResult, DEFAULT_PROBE_TIMEOUT};
use crate::utils::{measure_time, round_ms, validate_port, LogSink, ValidationError, NOOP};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum TcpProbeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("TCP connection timed out")]
    TimedOut,
    #[error("Connection refused (RST)")]
    Refused,
    #[error("OS error: {0}")]
    Os(io::Error),
}

impl From<io::Error> for TcpProbeError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::ConnectionRefused => TcpProbeError::Refused,
            io::ErrorKind::TimedOut => TcpProbeError::TimedOut,
            _ => TcpProbeError::Os(error),
        }
    }
}

/// A TCP connect probe against one IPv4 address and port.
pub struct TcpProbe<'a> {
    pub ip: String,
    pub port: u32,
    pub timeout: Duration,
    log: &'a dyn LogSink,
}

impl<'a> TcpProbe<'a> {
    pub fn new(ip: impl Into<String>, port: u32) -> Self {
        Self {
            ip: ip.into(),
            port,
            timeout: DEFAULT_PROBE_TIMEOUT,
            log: &NOOP,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_log(mut self, log: &'a dyn LogSink) -> Self {
        self.log = log;
        self
    }

    pub async fn run(&self) -> ProbeResult {
        match self.connect().await {
            Ok(latency_ms) => ProbeResult::success(
                format!("Connection successful ({latency_ms} ms)"),
                Some(latency_ms),
            ),
            Err(error) => {
                log::debug!("TCP probe {}:{} failed: {:?}", self.ip, self.port, error);
                ProbeResult::failure(error.to_string())
            }
        }
    }

    /// Connects once and returns the connect latency in milliseconds.
    /// The stream is closed before returning.
    async fn connect(&self) -> Result<f64, TcpProbeError> {
        let port = validate_port(self.port)?;
        let ip: Ipv4Addr = self
            .ip
            .parse()
            .map_err(|_| ValidationError::InvalidIpv4(self.ip.clone()))?;
        let addr = SocketAddr::V4(SocketAddrV4::new(ip, port));

        self.log.emit(&format!(
            "[TCP] Testing TCP connectivity to {addr} (timeout={:?})",
            self.timeout
        ));

        let (elapsed, outcome) =
            measure_time(|| timeout(self.timeout, TcpStream::connect(addr))).await;
        let stream = outcome.map_err(|_| TcpProbeError::TimedOut)??;
        drop(stream);

        Ok(round_ms(elapsed))
    }
}

pub async fn probe_tcp(ip: &str, port: u32, timeout: Duration) -> ProbeResult {
    TcpProbe::new(ip, port).with_timeout(timeout).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tokio::net::TcpListener;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[tokio::test]
    async fn test_connect_to_listener_succeeds() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = probe_tcp("127.0.0.1", port as u32, Duration::from_secs(2)).await;

        assert!(result.success, "{}", result.detail);
        let latency = result.latency_ms.unwrap();
        assert!(latency >= 0.0);
        assert_eq!((latency * 100.0).round() / 100.0, latency);
        assert!(result.detail.starts_with("Connection successful ("));
        assert!(result.detail.ends_with(" ms)"));
    }

    #[tokio::test]
    async fn test_closed_port_is_refused() {
        let port = closed_port().await;

        let result = probe_tcp("127.0.0.1", port as u32, Duration::from_secs(2)).await;

        assert!(!result.success);
        assert_eq!(result.detail, "Connection refused (RST)");
        assert!(result.latency_ms.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_ports_never_connect() {
        let lines = RefCell::new(Vec::new());
        let sink = |line: &str| lines.borrow_mut().push(line.to_string());

        for port in [0, 65536, 99999, u32::MAX] {
            let result = TcpProbe::new("127.0.0.1", port).with_log(&sink).run().await;
            assert!(!result.success);
            assert_eq!(result.detail, "Port must be between 1 and 65535");
            assert!(result.latency_ms.is_none());
        }

        assert!(lines.borrow().is_empty(), "no connection attempt expected");
    }

    #[tokio::test]
    async fn test_invalid_ip_rejected() {
        let result = probe_tcp("not-an-ip", 80, Duration::from_secs(1)).await;

        assert!(!result.success);
        assert_eq!(result.detail, "Invalid IPv4 address: not-an-ip");
    }

    #[tokio::test]
    async fn test_progress_line_emitted() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let lines = RefCell::new(Vec::new());
        let sink = |line: &str| lines.borrow_mut().push(line.to_string());

        let _ = TcpProbe::new("127.0.0.1", port as u32)
            .with_timeout(Duration::from_secs(2))
            .with_log(&sink)
            .run()
            .await;

        let lines = lines.borrow();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(&format!("[TCP] Testing TCP connectivity to 127.0.0.1:{port}")));
    }

    #[tokio::test]
    async fn test_connect_deadline_elapsed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port() as u32;

        // the connect future cannot observe write readiness before the zero deadline fires
        let result = TcpProbe::new("127.0.0.1", port)
            .with_timeout(Duration::ZERO)
            .run()
            .await;

        assert!(!result.success);
        assert_eq!(result.detail, "TCP connection timed out");
        assert!(result.latency_ms.is_none());
    }

    #[test]
    fn test_io_error_classification() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(matches!(TcpProbeError::from(refused), TcpProbeError::Refused));

        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert!(matches!(TcpProbeError::from(timed_out), TcpProbeError::TimedOut));

        let other = io::Error::new(io::ErrorKind::Other, "network is unreachable");
        let error = TcpProbeError::from(other);
        assert_eq!(error.to_string(), "OS error: network is unreachable");
    }

    #[tokio::test]
    async fn test_timeout_handling_opt_in() {
        if std::env::var("REAL_NET_TEST").is_err() {
            eprintln!("Skipping TCP timeout test. Set REAL_NET_TEST=1 to enable.");
            return;
        }

        // TEST-NET-1, nothing answers there
        let result = probe_tcp("192.0.2.1", 80, Duration::from_millis(200)).await;
        assert!(!result.success);
        assert_eq!(result.detail, "TCP connection timed out");
    }
}
