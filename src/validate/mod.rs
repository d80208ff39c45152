//! Local configuration file validators
//!
//! Each validator enumerates target files, parses them, and reports per-file
//! outcomes through the `Reporter`. A run fails iff any file fails; no
//! file's failure prevents the remaining files from being checked.

pub mod json;
pub mod replacements;
pub mod schema;
pub mod yaml;

/// Aggregate outcome of one validator run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ValidationSummary {
    pub fn is_pass(&self) -> bool {
        self.failed == 0
    }
}
