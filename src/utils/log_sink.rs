//! Progress narration for probes.
//!
//! Probes and the resolver describe what they are doing as single-line
//! messages (`[TCP] Testing TCP connectivity to ...`). Where those lines end up
//! is decided by whoever builds the pipeline: the binary forwards them to the
//! `log` facade, library callers get silence by default, and tests can capture
//! them with a closure.
//!
//! ```rust
//! use netdiag::utils::LogSink;
//! use std::cell::RefCell;
//!
//! let lines = RefCell::new(Vec::new());
//! let sink = |line: &str| lines.borrow_mut().push(line.to_string());
//! sink.emit("[DNS] Resolving hostname: example.com");
//! assert_eq!(lines.borrow().len(), 1);
//! ```

/// Receiver of single-line progress messages.
pub trait LogSink {
    fn emit(&self, line: &str);
}

/// Discards every line. Used when no sink is injected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn emit(&self, _line: &str) {}
}

/// Forwards lines to `log::info!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl LogSink for LogFacade {
    fn emit(&self, line: &str) {
        log::info!("{line}");
    }
}

impl<F> LogSink for F
where
    F: Fn(&str),
{
    fn emit(&self, line: &str) {
        self(line)
    }
}

/// Shared no-op sink, the default for every probe.
pub static NOOP: NoopSink = NoopSink;
