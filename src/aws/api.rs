//! Narrow provider interface for the preflight checks
//!
//! The checks consume exactly four read-only operations: list stacks by
//! status, describe stack events, list landing zones, and get a landing
//! zone. Expressing them as traits keeps the checkers testable against the
//! fakes in `crate::testing` without a network-capable mock.

use crate::aws::context::AwsContext;
use crate::aws::error::{classify_sdk_error, ApiError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A stack name plus its current status, as returned by the listing call.
#[derive(Debug, Clone)]
pub struct StackSummary {
    pub name: String,
    pub status: String,
}

/// A single stack event from the event history.
#[derive(Debug, Clone, Default)]
pub struct StackEvent {
    pub logical_id: Option<String>,
    pub resource_type: Option<String>,
    pub resource_status: Option<String>,
    pub resource_status_reason: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A landing zone as listed, identified by its ARN when present.
#[derive(Debug, Clone)]
pub struct LandingZoneSummary {
    pub arn: Option<String>,
}

/// Full landing zone detail record.
#[derive(Debug, Clone)]
pub struct LandingZone {
    pub arn: String,
    pub status: Option<String>,
    pub drift_status: Option<String>,
    pub version: Option<String>,
    pub latest_available_version: Option<String>,
}

/// Read-only CloudFormation operations used by the stack-failure scanner.
#[async_trait]
pub trait StackApi {
    /// List all stacks whose current status is in `statuses`.
    async fn list_stacks_by_status(&self, statuses: &[&str])
        -> Result<Vec<StackSummary>, ApiError>;

    /// Fetch the full event history for one stack.
    async fn describe_stack_events(&self, stack_name: &str)
        -> Result<Vec<StackEvent>, ApiError>;
}

/// Read-only Control Tower operations used by the landing-zone checker.
#[async_trait]
pub trait LandingZoneApi {
    /// List the landing zones visible in this account/region.
    async fn list_landing_zones(&self) -> Result<Vec<LandingZoneSummary>, ApiError>;

    /// Fetch the detail record for one landing zone.
    async fn get_landing_zone(&self, identifier: &str) -> Result<LandingZone, ApiError>;
}

/// SDK-backed CloudFormation client.
pub struct CloudFormationClient {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudformation_client(),
        }
    }
}

#[async_trait]
impl StackApi for CloudFormationClient {
    async fn list_stacks_by_status(
        &self,
        statuses: &[&str],
    ) -> Result<Vec<StackSummary>, ApiError> {
        let filter: Vec<aws_sdk_cloudformation::types::StackStatus> = statuses
            .iter()
            .map(|s| aws_sdk_cloudformation::types::StackStatus::from(*s))
            .collect();

        let mut summaries = Vec::new();
        let mut pages = self
            .client
            .list_stacks()
            .set_stack_status_filter(Some(filter))
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| classify_sdk_error(&e))?;
            summaries.extend(page.stack_summaries().iter().map(summary_from));
        }

        Ok(summaries)
    }

    async fn describe_stack_events(
        &self,
        stack_name: &str,
    ) -> Result<Vec<StackEvent>, ApiError> {
        let mut events = Vec::new();
        let mut pages = self
            .client
            .describe_stack_events()
            .stack_name(stack_name)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| classify_sdk_error(&e))?;
            events.extend(page.stack_events().iter().map(event_from));
        }

        Ok(events)
    }
}

/// Map an SDK stack summary into the domain type. Every member is optional
/// at the wire level; absent ones map to empty strings, which never match a
/// non-empty prefix or status.
fn summary_from(summary: &aws_sdk_cloudformation::types::StackSummary) -> StackSummary {
    StackSummary {
        name: summary.stack_name().unwrap_or_default().to_string(),
        status: summary
            .stack_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
    }
}

/// Map an SDK stack event into the domain type, converting the smithy
/// timestamp to chrono.
fn event_from(event: &aws_sdk_cloudformation::types::StackEvent) -> StackEvent {
    StackEvent {
        logical_id: event.logical_resource_id().map(str::to_string),
        resource_type: event.resource_type().map(str::to_string),
        resource_status: event.resource_status().map(|s| s.as_str().to_string()),
        resource_status_reason: event.resource_status_reason().map(str::to_string),
        timestamp: event
            .timestamp()
            .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
    }
}

/// SDK-backed Control Tower client.
pub struct ControlTowerClient {
    client: aws_sdk_controltower::Client,
}

impl ControlTowerClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.controltower_client(),
        }
    }
}

#[async_trait]
impl LandingZoneApi for ControlTowerClient {
    async fn list_landing_zones(&self) -> Result<Vec<LandingZoneSummary>, ApiError> {
        let mut zones = Vec::new();
        let mut pages = self.client.list_landing_zones().into_paginator().send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| classify_sdk_error(&e))?;
            for zone in page.landing_zones() {
                zones.push(LandingZoneSummary {
                    arn: zone.arn().map(str::to_string),
                });
            }
        }

        Ok(zones)
    }

    async fn get_landing_zone(&self, identifier: &str) -> Result<LandingZone, ApiError> {
        let response = self
            .client
            .get_landing_zone()
            .landing_zone_identifier(identifier)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let detail = response.landing_zone().ok_or_else(|| ApiError::Other {
            code: None,
            message: format!("GetLandingZone returned no detail for {identifier}"),
        })?;

        Ok(LandingZone {
            arn: detail.arn().unwrap_or(identifier).to_string(),
            status: detail.status().map(|s| s.as_str().to_string()),
            drift_status: detail
                .drift_status()
                .and_then(|d| d.status())
                .map(|s| s.as_str().to_string()),
            version: Some(detail.version().to_string()),
            latest_available_version: detail.latest_available_version().map(str::to_string),
        })
    }
}
