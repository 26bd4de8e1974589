//! Text and JSON rendering of a finished [`DiagnosticSummary`].

use super::{DiagnosticSummary, OverallStatus};
use colored::*;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

const RULE_WIDTH: usize = 60;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Writes the multi-section human readable report.
pub fn render_text<W: Write>(summary: &DiagnosticSummary, out: &mut W) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "{}", "Diagnostic Summary".bold())?;
    writeln!(out, "{rule}")?;

    writeln!(out, "Target: {}", summary.target)?;
    writeln!(
        out,
        "IP Address: {}",
        summary.ip_address.as_deref().unwrap_or("N/A")
    )?;
    writeln!(out)?;

    match &summary.dns {
        Some(dns) => writeln!(
            out,
            "DNS Resolution: {} ({})",
            pass_fail(dns.success),
            dns.detail
        )?,
        None => writeln!(out, "DNS Resolution: {}", "NOT RUN".yellow())?,
    }
    writeln!(out)?;

    writeln!(out, "TCP Connectivity:")?;
    for (port, result) in summary.tcp.iter() {
        writeln!(
            out,
            "  - Port {port}: {} ({})",
            pass_fail(result.success),
            result.detail
        )?;
    }

    writeln!(out)?;
    writeln!(out, "UDP Connectivity:")?;
    for (port, result) in summary.udp.iter() {
        let status = if result.success {
            "PASS".green().bold()
        } else {
            "WARN".yellow().bold()
        };
        writeln!(out, "  - Port {port}: {status} ({})", result.detail)?;
    }

    writeln!(out)?;
    writeln!(out, "Latency Measurements:")?;
    for (port, result) in summary.latency.iter() {
        match (result.success, result.latency_ms) {
            (true, Some(latency_ms)) => {
                writeln!(out, "  - Port {port}: {}", format!("{latency_ms} ms").cyan())?
            }
            _ => writeln!(out, "  - Port {port}: {}", "FAILED".red())?,
        }
    }

    writeln!(out)?;
    let status = summary.overall_status.as_str();
    let status = match summary.overall_status {
        OverallStatus::Reachable => status.green().bold(),
        OverallStatus::PartiallyReachable => status.yellow().bold(),
        OverallStatus::Unreachable => status.red().bold(),
        OverallStatus::Unknown => status.normal(),
    };
    writeln!(out, "Overall Status: {status}")?;
    writeln!(out, "{rule}")?;

    Ok(())
}

fn pass_fail(success: bool) -> ColoredString {
    if success {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    }
}

pub fn render_text_string(summary: &DiagnosticSummary) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = render_text(summary, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Indented JSON with the field names of [`DiagnosticSummary`].
pub fn to_json(summary: &DiagnosticSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

pub fn from_json(json: &str) -> serde_json::Result<DiagnosticSummary> {
    serde_json::from_str(json)
}

pub fn write_json_file(summary: &DiagnosticSummary, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let json = to_json(summary)?;
    std::fs::write(path.as_ref(), json)?;
    log::debug!("Wrote JSON summary to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ProbeResult;

    fn sample_summary() -> DiagnosticSummary {
        let mut summary = DiagnosticSummary::new("example.com", Some("10.0.0.1".to_string()));
        summary.record_dns(true, "Resolved to 10.0.0.1");
        summary.record_tcp_probe(
            80,
            &ProbeResult::success("Connection successful (12.34 ms)".to_string(), Some(12.34)),
        );
        summary.record_tcp_probe(
            9999,
            &ProbeResult::failure("Connection refused (RST)".to_string()),
        );
        summary.record_udp(53, true, "No response received (UDP is connectionless)");
        summary.record_udp(161, false, "OS error during UDP probe: boom");
        summary.evaluate_overall_status().unwrap();
        summary
    }

    #[test]
    fn test_text_report_sections() {
        colored::control::set_override(false);
        let text = render_text_string(&sample_summary());

        let expected = [
            "Diagnostic Summary",
            "Target: example.com",
            "IP Address: 10.0.0.1",
            "DNS Resolution: PASS (Resolved to 10.0.0.1)",
            "TCP Connectivity:",
            "  - Port 80: PASS (Connection successful (12.34 ms))",
            "  - Port 9999: FAIL (Connection refused (RST))",
            "UDP Connectivity:",
            "  - Port 53: PASS (No response received (UDP is connectionless))",
            "  - Port 161: WARN (OS error during UDP probe: boom)",
            "Latency Measurements:",
            "  - Port 80: 12.34 ms",
            "  - Port 9999: FAILED",
            "Overall Status: PARTIALLY REACHABLE",
        ];
        for line in expected {
            assert!(text.lines().any(|l| l == line), "missing line {line:?} in\n{text}");
        }
        assert!(text.find("TCP Connectivity:") < text.find("UDP Connectivity:"));
    }

    #[test]
    fn test_text_report_for_unresolved_target() {
        colored::control::set_override(false);
        let mut summary = DiagnosticSummary::new("nowhere.invalid", None);
        summary.record_dns(false, "DNS resolution failed: no record found");
        summary.evaluate_overall_status().unwrap();

        let text = render_text_string(&summary);
        assert!(text.contains("IP Address: N/A"));
        assert!(text.contains("DNS Resolution: FAIL (DNS resolution failed: no record found)"));
        assert!(text.contains("Overall Status: UNREACHABLE"));
    }

    #[test]
    fn test_json_shape() {
        let json = to_json(&sample_summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["target"], "example.com");
        assert_eq!(value["ip_address"], "10.0.0.1");
        assert_eq!(value["dns"]["success"], true);
        assert_eq!(value["tcp"]["9999"]["detail"], "Connection refused (RST)");
        assert!(value["tcp"]["80"].get("latency_ms").is_none());
        assert_eq!(value["udp"]["53"]["success"], true);
        assert_eq!(value["latency"]["80"]["latency_ms"], 12.34);
        assert!(value["latency"]["9999"]["latency_ms"].is_null());
        assert_eq!(value["overall_status"], "PARTIALLY REACHABLE");
        assert!(json.contains('\n'), "expected indented output");
    }

    #[test]
    fn test_json_round_trip() {
        let summary = sample_summary();
        let parsed = from_json(&to_json(&summary).unwrap()).unwrap();

        assert_eq!(parsed, summary);
        assert_eq!(parsed.latency.get(80).unwrap().latency_ms, Some(12.34));
        assert_eq!(parsed.tcp.ports().collect::<Vec<_>>(), vec![80, 9999]);
        assert_eq!(parsed.overall_status, OverallStatus::PartiallyReachable);
    }

    #[test]
    fn test_null_dns_serializes_as_null() {
        let summary = DiagnosticSummary::new("example.com", None);
        let value: serde_json::Value = serde_json::from_str(&to_json(&summary).unwrap()).unwrap();

        assert!(value["dns"].is_null());
        assert!(value["ip_address"].is_null());
        assert_eq!(value["overall_status"], "UNKNOWN");
    }
}
