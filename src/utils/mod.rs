use std::time::{Duration, Instant};
use thiserror::Error;

pub mod log_sink;

pub use log_sink::*;

pub const MIN_PORT: u32 = 1;
pub const MAX_PORT: u32 = 65535;

/// Input rejected before any socket is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Port must be between 1 and 65535")]
    PortOutOfRange(u32),
    #[error("Invalid IPv4 address: {0}")]
    InvalidIpv4(String),
    #[error("Hostname must be a non-empty string")]
    EmptyHostname,
    #[error("Hostname contains invalid characters")]
    MalformedHostname,
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// Checks that `port` fits the TCP/UDP port range and narrows it to `u16`.
pub fn validate_port(port: u32) -> Result<u16> {
    if (MIN_PORT..=MAX_PORT).contains(&port) {
        Ok(port as u16)
    } else {
        Err(ValidationError::PortOutOfRange(port))
    }
}

/// Converts a duration to milliseconds rounded to two decimal places.
pub fn round_ms(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.2}s", duration.as_secs_f32())
    }
}

pub async fn measure_time<F, Fut, T>(f: F) -> (Duration, T)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = f().await;
    let duration = start.elapsed();
    (duration, result)
}
