use crate::diagnostic::{DiagnosticConfig, DEFAULT_TCP_PORTS, DEFAULT_UDP_PORTS};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "netdiag")]
#[command(about = "Network reachability diagnostic: DNS + TCP/UDP + latency + summary")]
#[command(version)]
pub struct Cli {
    /// Target hostname or IPv4 address (e.g. example.com or 8.8.8.8)
    pub target: String,

    /// TCP ports to test
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_TCP_PORTS)]
    pub tcp: Vec<u32>,

    /// UDP ports to test (best-effort)
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_UDP_PORTS)]
    pub udp: Vec<u32>,

    /// Socket timeout in seconds
    #[arg(short, long, default_value = "3.0", value_parser = parse_timeout)]
    pub timeout: f64,

    /// Print the summary as indented JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON summary to this file
    #[arg(long, value_name = "PATH")]
    pub json_out: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    pub fn to_config(&self) -> DiagnosticConfig {
        DiagnosticConfig::new(self.target.clone())
            .with_tcp_ports(self.tcp.clone())
            .with_udp_ports(self.udp.clone())
            .with_timeout(self.timeout())
    }
}

fn parse_timeout(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if seconds.is_finite() && seconds > 0.0 && seconds <= u32::MAX as f64 {
        Ok(seconds)
    } else {
        Err("timeout must be a positive number of seconds".to_string())
    }
}
