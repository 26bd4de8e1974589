//! Hostname to IPv4 resolution.
//!
//! Every failure is folded into a [`Resolution`] with a human readable
//! message; nothing is propagated to the caller.
//!
//! ```rust,no_run
//! use netdiag::dns::{HostResolver, Resolver};
//! use netdiag::utils::LogFacade;
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = Resolver::new();
//!     let resolution = resolver.resolve("example.com", &LogFacade).await;
//!     println!("success={} value={}", resolution.success, resolution.value);
//! }
//! ```

use crate::utils::{LogSink, ValidationError};
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::Query;
use hickory_resolver::proto::rr::Name;
use hickory_resolver::{system_conf, TokioAsyncResolver};
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a resolution attempt: the IPv4 address on success, a
/// diagnostic message otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub success: bool,
    pub value: String,
}

impl Resolution {
    pub fn resolved(ip: Ipv4Addr) -> Self {
        Self {
            success: true,
            value: ip.to_string(),
        }
    }

    pub fn failed(failure: &ResolveFailure) -> Self {
        Self {
            success: false,
            value: failure.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("IPv6 addresses are not supported")]
    Ipv6Unsupported,
    #[error("Invalid hostname encoding")]
    Encoding,
    #[error("DNS resolution failed: {0}")]
    Lookup(String),
    #[error("DNS resolution failed: no IPv4 address found for {0}")]
    NoIpv4(String),
    #[error("DNS request timed out")]
    Timeout,
    #[error("Unexpected OS error: {0}")]
    Os(String),
}

impl From<ResolveError> for ResolveFailure {
    fn from(error: ResolveError) -> Self {
        match error.kind() {
            ResolveErrorKind::Timeout => ResolveFailure::Timeout,
            ResolveErrorKind::Io(io_error) => ResolveFailure::Os(io_error.to_string()),
            ResolveErrorKind::NoRecordsFound { query, .. } => no_record_found(query),
            _ => ResolveFailure::Lookup(error.to_string()),
        }
    }
}

fn no_record_found(query: &Query) -> ResolveFailure {
    let name = query.name().to_utf8();
    ResolveFailure::Lookup(format!(
        "no {} record found for {}",
        query.query_type(),
        name.trim_end_matches('.')
    ))
}

/// Anything able to turn a hostname into an IPv4 address.
pub trait HostResolver {
    fn resolve(&self, hostname: &str, log: &dyn LogSink) -> impl Future<Output = Resolution>;
}

impl<T: HostResolver> HostResolver for &T {
    fn resolve(&self, hostname: &str, log: &dyn LogSink) -> impl Future<Output = Resolution> {
        (**self).resolve(hostname, log)
    }
}

/// System-configured hickory resolver restricted to IPv4.
pub struct Resolver {
    inner: TokioAsyncResolver,
    timeout: Duration,
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_DNS_TIMEOUT)
    }

    pub fn with_timeout(lookup_timeout: Duration) -> Self {
        let (config, mut opts) = match system_conf::read_system_conf() {
            Ok((config, opts)) => (config, opts),
            Err(e) => {
                log::warn!("Could not read system DNS config, using default: {e}");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };

        opts.timeout = lookup_timeout;
        opts.use_hosts_file = true;
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;

        log::debug!(
            "DNS resolver: {} name servers, timeout={:?}, attempts={}",
            config.name_servers().len(),
            opts.timeout,
            opts.attempts
        );

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
            timeout: lookup_timeout,
        }
    }

    async fn lookup_ipv4(&self, hostname: &str) -> Result<Ipv4Addr, ResolveFailure> {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return Err(ValidationError::EmptyHostname.into());
        }
        if hostname.chars().any(char::is_control) {
            return Err(ValidationError::MalformedHostname.into());
        }

        match hostname.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => return Ok(ip),
            Ok(IpAddr::V6(_)) => return Err(ResolveFailure::Ipv6Unsupported),
            Err(_) => {}
        }

        let name = Name::from_utf8(hostname).map_err(|e| {
            log::debug!("Hostname {hostname:?} is not a valid DNS name: {e}");
            ResolveFailure::Encoding
        })?;

        // lookup_ip consults the hosts file before querying name servers
        let lookup = timeout(self.timeout, self.inner.lookup_ip(name))
            .await
            .map_err(|_| ResolveFailure::Timeout)??;

        lookup
            .iter()
            .find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .ok_or_else(|| ResolveFailure::NoIpv4(hostname.to_string()))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HostResolver for Resolver {
    async fn resolve(&self, hostname: &str, log: &dyn LogSink) -> Resolution {
        log.emit(&format!("[DNS] Resolving hostname: {hostname}"));

        match self.lookup_ipv4(hostname).await {
            Ok(ip) => {
                log.emit(&format!("[DNS] Resolution successful: {ip}"));
                Resolution::resolved(ip)
            }
            Err(failure) => {
                log.emit(&format!("[DNS] Resolution failed: {failure}"));
                Resolution::failed(&failure)
            }
        }
    }
}
