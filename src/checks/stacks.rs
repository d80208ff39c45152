//! Stack-failure scanner
//!
//! Lists CloudFormation stacks in a fixed set of failed statuses, keeps the
//! ones matching the accelerator name prefix, and enriches each match with
//! its most recent failure events.

use crate::aws::api::{StackApi, StackEvent};
use crate::aws::error::ApiError;
use crate::report::Reporter;
use chrono::{DateTime, Utc};

/// Stack statuses that count as failed.
///
/// ROLLBACK_COMPLETE and UPDATE_ROLLBACK_COMPLETE indicate a failure during
/// creation or update even though the rollback itself succeeded.
pub const FAILED_STACK_STATUSES: &[&str] = &[
    "CREATE_FAILED",
    "ROLLBACK_FAILED",
    "DELETE_FAILED",
    "UPDATE_ROLLBACK_FAILED",
    "IMPORT_ROLLBACK_FAILED",
    "ROLLBACK_COMPLETE",
    "UPDATE_ROLLBACK_COMPLETE",
];

/// At most this many failure records are reported per stack.
pub const MAX_REPORTED_FAILURES: usize = 5;

/// A per-resource failure extracted from the stack event history.
#[derive(Debug, Clone)]
pub struct StackFailureRecord {
    pub logical_id: String,
    pub resource_type: String,
    pub status: String,
    pub reason: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Extract failure records from a stack's event history.
///
/// Keeps events that carry both a resource status and a status reason, where
/// the status ends in FAILED or mentions ROLLBACK. Records are sorted most
/// recent first.
pub fn failure_records(events: &[StackEvent]) -> Vec<StackFailureRecord> {
    let mut records: Vec<StackFailureRecord> = events
        .iter()
        .filter_map(|event| {
            let status = event.resource_status.as_deref()?;
            let reason = event.resource_status_reason.as_deref()?;
            if !status.ends_with("FAILED") && !status.contains("ROLLBACK") {
                return None;
            }
            Some(StackFailureRecord {
                logical_id: event.logical_id.clone().unwrap_or_default(),
                resource_type: event.resource_type.clone().unwrap_or_default(),
                status: status.to_string(),
                reason: reason.to_string(),
                timestamp: event.timestamp,
            })
        })
        .collect();

    // Most recent first; events without a timestamp sort last
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

/// Check for failed CloudFormation stacks matching `prefix` in `region`.
///
/// Returns `true` if no failed stacks with the prefix are found. Access
/// denied on the listing call skips the check (pass); any other listing
/// error fails it. A failure to fetch event history for one stack is
/// reported but does not abort the scan of the others.
pub async fn scan(
    api: &impl StackApi,
    reporter: &dyn Reporter,
    region: &str,
    prefix: &str,
) -> bool {
    reporter.info(&format!(
        "Checking for failed CloudFormation stacks matching prefix '{prefix}' in region '{region}'..."
    ));

    let summaries = match api.list_stacks_by_status(FAILED_STACK_STATUSES).await {
        Ok(summaries) => summaries,
        Err(err @ ApiError::AccessDenied { .. }) => {
            reporter.warn(&format!(
                "Access denied when listing CloudFormation stacks in {region}. \
                 Skipping check. Error: {err}"
            ));
            return true;
        }
        Err(err) => {
            reporter.error(&format!(
                "Error checking CloudFormation stacks in {region}: {err}"
            ));
            return false;
        }
    };

    let mut failed_stacks = Vec::new();
    for summary in summaries {
        if !summary.name.starts_with(prefix) {
            continue;
        }

        reporter.error(&format!(
            "Found failed CloudFormation stack: {} (Status: {}, Region: {region})",
            summary.name, summary.status
        ));

        match api.describe_stack_events(&summary.name).await {
            Ok(events) => {
                let records = failure_records(&events);
                if !records.is_empty() {
                    reporter.error(&format!("Failure details for stack {}:", summary.name));
                    for (i, record) in records.iter().take(MAX_REPORTED_FAILURES).enumerate() {
                        reporter.error(&format!(
                            "  {}. Resource: {} ({})",
                            i + 1,
                            record.logical_id,
                            record.resource_type
                        ));
                        reporter.error(&format!("     Status: {}", record.status));
                        reporter.error(&format!("     Reason: {}", record.reason));
                    }
                }
            }
            Err(err) => {
                reporter.warn(&format!(
                    "Could not retrieve failure details for stack {}: {err}",
                    summary.name
                ));
            }
        }

        failed_stacks.push(summary.name);
    }

    if failed_stacks.is_empty() {
        reporter.info(&format!(
            "No failed CloudFormation stacks found with prefix '{prefix}' in region {region}."
        ));
        true
    } else {
        reporter.error(&format!(
            "{} failed CloudFormation stack(s) found with prefix '{prefix}' in region {region}.",
            failed_stacks.len()
        ));
        false
    }
}
