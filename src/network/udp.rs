use super::{ProbeResult, DEFAULT_PROBE_TIMEOUT};
use crate::utils::{round_ms, validate_port, LogSink, ValidationError, NOOP};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

/// Payload sent by every UDP probe.
pub const UDP_PROBE_PAYLOAD: &[u8] = b"UDP_DIAGNOSTIC_PROBE";

const RECV_BUFFER_SIZE: usize = 1024;

#[derive(Error, Debug)]
pub enum UdpProbeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Address resolution error: {0}")]
    AddressResolution(String),
    #[error("OS error during UDP probe: {0}")]
    Os(#[from] io::Error),
}

/// What came back after the probe datagram was sent.
#[derive(Debug, Clone, PartialEq)]
pub enum UdpObservation {
    Reply { from: SocketAddr, latency_ms: f64 },
    Silence,
}

/// A best-effort UDP probe: one datagram out, at most one reply awaited.
pub struct UdpProbe<'a> {
    pub host: String,
    pub port: u32,
    pub timeout: Duration,
    log: &'a dyn LogSink,
}

impl<'a> UdpProbe<'a> {
    pub fn new(host: impl Into<String>, port: u32) -> Self {
        Self {
            host: host.into(),
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

    /// Silence within the timeout counts as success: a connectionless
    /// protocol gives no failure signal when nobody answers.
    pub async fn run(&self) -> ProbeResult {
        match self.exchange().await {
            Ok(UdpObservation::Reply { from, latency_ms }) => {
                self.log.emit(&format!(
                    "[UDP] Response received from {from} ({latency_ms} ms)"
                ));
                ProbeResult::success(
                    format!("Response received in {latency_ms} ms"),
                    Some(latency_ms),
                )
            }
            Ok(UdpObservation::Silence) => ProbeResult::success(
                "No response received (UDP is connectionless)".to_string(),
                None,
            ),
            Err(error) => {
                log::debug!("UDP probe {}:{} failed: {:?}", self.host, self.port, error);
                ProbeResult::failure(error.to_string())
            }
        }
    }

    async fn exchange(&self) -> Result<UdpObservation, UdpProbeError> {
        let port = validate_port(self.port)?;

        self.log.emit(&format!(
            "[UDP] Sending UDP probe to {}:{} (timeout={:?})",
            self.host, port, self.timeout
        ));

        let target = self.destination(port).await?;
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;

        let start = Instant::now();
        socket.send_to(UDP_PROBE_PAYLOAD, target).await?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        match timeout(self.timeout, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, from))) => {
                log::debug!("UDP probe to {target}: {len} bytes back from {from}");
                Ok(UdpObservation::Reply {
                    from,
                    latency_ms: round_ms(start.elapsed()),
                })
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => Ok(UdpObservation::Silence),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(UdpObservation::Silence),
        }
    }

    /// First IPv4 address for the probe target, literal or resolved.
    async fn destination(&self, port: u16) -> Result<SocketAddr, UdpProbeError> {
        if let Ok(ip) = self.host.parse::<Ipv4Addr>() {
            return Ok(SocketAddr::V4(SocketAddrV4::new(ip, port)));
        }

        let addrs = lookup_host((self.host.as_str(), port))
            .await
            .map_err(|e| UdpProbeError::AddressResolution(e.to_string()))?;

        addrs
            .into_iter()
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| {
                UdpProbeError::AddressResolution(format!("no IPv4 address for {}", self.host))
            })
    }
}

pub async fn probe_udp(host: &str, port: u32, timeout: Duration) -> ProbeResult {
    UdpProbe::new(host, port).with_timeout(timeout).run().await
}
