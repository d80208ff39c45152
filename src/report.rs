//! Check reporting collaborator
//!
//! Checks report findings through a `Reporter` rather than a process-wide
//! logger, so each checker stays testable in isolation. The production
//! implementation routes to `tracing`; `CapturedReport` records entries in
//! memory for assertions.

use std::sync::{Arc, Mutex};

/// Severity of a reported entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Sink for user-facing check output.
pub trait Reporter {
    fn report(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) {
        self.report(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.report(Severity::Error, message);
    }
}

/// Reporter that routes entries to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }
}

/// Reporter that records entries in memory.
///
/// Clone handles share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CapturedReport {
    entries: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl CapturedReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, in order.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Messages recorded at the given severity.
    pub fn messages_at(&self, severity: Severity) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// True if any entry at `severity` contains `needle`.
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.messages_at(severity).iter().any(|m| m.contains(needle))
    }

    /// True if no warnings or errors were recorded.
    pub fn is_clean(&self) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .all(|(s, _)| *s == Severity::Info)
    }
}

impl Reporter for CapturedReport {
    fn report(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}
