//! Control Tower landing-zone status checker
//!
//! Verifies that the landing zone, if one exists, is ACTIVE. Drift and
//! version skew are reported as warnings only; this check gates deploys on
//! lifecycle status, not on configuration drift.
//!
//! Note: this verifies the landing zone's own status, not the compliance of
//! every account and OU against all controls. A full compliance check
//! requires querying AWS Config or Security Hub in the audit account.

use crate::aws::api::{LandingZone, LandingZoneApi};
use crate::aws::error::ApiError;
use crate::report::Reporter;

/// Expected lifecycle status for a healthy landing zone.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Expected drift status for a landing zone in sync with its baseline.
pub const IN_SYNC_DRIFT_STATUS: &str = "IN_SYNC";

/// Check the Control Tower landing zone in `home_region`.
///
/// Returns `true` if Control Tower is not enabled, or the landing zone is
/// ACTIVE. Access denied, resource not found, and "not enrolled in this
/// region" validation errors all skip the check (pass); any other API error
/// fails it.
pub async fn check(
    api: &impl LandingZoneApi,
    reporter: &dyn Reporter,
    home_region: &str,
) -> bool {
    reporter.info(&format!(
        "Checking Control Tower Landing Zone status in region '{home_region}'..."
    ));

    let result = check_inner(api, reporter).await;

    let passed = match result {
        Ok(passed) => passed,
        Err(err @ (ApiError::AccessDenied { .. } | ApiError::NotFound { .. })) => {
            reporter.warn(&format!(
                "Could not check Control Tower Landing Zone status in {home_region} \
                 (might not be enabled or permissions missing). Skipping check. Error: {err}"
            ));
            return true;
        }
        Err(ApiError::NotEnrolled { .. }) => {
            reporter.info(&format!(
                "Control Tower service is not available/subscribed in region {home_region}. \
                 Skipping check."
            ));
            return true;
        }
        Err(err) => {
            reporter.error(&format!(
                "Error checking Control Tower Landing Zone status in {home_region}: {err}"
            ));
            return false;
        }
    };

    if passed {
        reporter.info("Control Tower Landing Zone check passed (Status ACTIVE).");
    } else {
        reporter.error("Control Tower Landing Zone check failed.");
    }
    passed
}

/// The happy-path flow; API errors propagate to `check` for classification.
async fn check_inner(api: &impl LandingZoneApi, reporter: &dyn Reporter) -> Result<bool, ApiError> {
    let landing_zones = api.list_landing_zones().await?;

    if landing_zones.is_empty() {
        reporter.info("Control Tower does not appear to be enabled in this account/region.");
        return Ok(true);
    }

    if landing_zones.len() > 1 {
        // More than one landing zone is unexpected; check the first listed
        reporter.warn(&format!(
            "Found multiple ({}) Landing Zones. Checking the first one listed: {}",
            landing_zones.len(),
            landing_zones[0].arn.as_deref().unwrap_or("<no arn>")
        ));
    }

    let Some(arn) = landing_zones[0].arn.as_deref() else {
        reporter.error("Could not retrieve ARN for the Landing Zone.");
        return Ok(false);
    };

    reporter.info(&format!("Found Control Tower Landing Zone: {arn}"));
    let detail = api.get_landing_zone(arn).await?;

    report_detail(reporter, &detail);

    let mut passed = true;
    if detail.status.as_deref() != Some(ACTIVE_STATUS) {
        reporter.error(&format!(
            "Control Tower Landing Zone status is '{}', expected 'ACTIVE'.",
            detail.status.as_deref().unwrap_or("<unknown>")
        ));
        passed = false;
    } else {
        reporter.info("Landing Zone status is ACTIVE.");
    }

    if detail.drift_status.as_deref() != Some(IN_SYNC_DRIFT_STATUS) {
        reporter.warn(&format!(
            "Control Tower Landing Zone drift status is '{}', expected 'IN_SYNC'. \
             Consider running 'Repair Landing Zone'.",
            detail.drift_status.as_deref().unwrap_or("<unknown>")
        ));
    } else {
        reporter.info("Landing Zone drift status is IN_SYNC.");
    }

    if let Some(latest) = detail.latest_available_version.as_deref() {
        if detail.version.as_deref() != Some(latest) {
            reporter.warn(&format!(
                "Control Tower Landing Zone version ({}) is not the latest available ({latest}). \
                 Consider updating.",
                detail.version.as_deref().unwrap_or("<unknown>")
            ));
        }
    }

    Ok(passed)
}

fn report_detail(reporter: &dyn Reporter, detail: &LandingZone) {
    reporter.info(&format!(
        "Landing Zone Status: {}",
        detail.status.as_deref().unwrap_or("<unknown>")
    ));
    reporter.info(&format!(
        "Landing Zone Drift Status: {}",
        detail.drift_status.as_deref().unwrap_or("<unknown>")
    ));
    reporter.info(&format!(
        "Landing Zone Deployed Version: {}",
        detail.version.as_deref().unwrap_or("<unknown>")
    ));
    reporter.info(&format!(
        "Landing Zone Latest Available Version: {}",
        detail.latest_available_version.as_deref().unwrap_or("<unknown>")
    ));
}
