//! Shared fakes and fixtures for unit tests
//!
//! In-memory implementations of the provider traits so checks can be tested
//! without a network-capable mock.

use crate::aws::api::{
    LandingZone, LandingZoneApi, LandingZoneSummary, StackApi, StackEvent, StackSummary,
};
use crate::aws::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Build a stack summary.
pub fn stack(name: &str, status: &str) -> StackSummary {
    StackSummary {
        name: name.to_string(),
        status: status.to_string(),
    }
}

/// Build a stack event with a reason and a timestamp offset in seconds.
pub fn event(
    logical_id: &str,
    resource_type: &str,
    status: &str,
    reason: &str,
    timestamp_secs: i64,
) -> StackEvent {
    StackEvent {
        logical_id: Some(logical_id.to_string()),
        resource_type: Some(resource_type.to_string()),
        resource_status: Some(status.to_string()),
        resource_status_reason: Some(reason.to_string()),
        timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + timestamp_secs, 0),
    }
}

/// Build a landing zone detail record.
pub fn landing_zone(
    arn: &str,
    status: &str,
    drift_status: &str,
    version: &str,
    latest_available_version: Option<&str>,
) -> LandingZone {
    LandingZone {
        arn: arn.to_string(),
        status: Some(status.to_string()),
        drift_status: Some(drift_status.to_string()),
        version: Some(version.to_string()),
        latest_available_version: latest_available_version.map(str::to_string),
    }
}

/// In-memory `StackApi` that applies the status filter provider-side, like
/// the real listing call.
#[derive(Default)]
pub struct FakeStackApi {
    stacks: Vec<StackSummary>,
    events: HashMap<String, Result<Vec<StackEvent>, ApiError>>,
    list_error: Option<ApiError>,
    filters: Mutex<Vec<Vec<String>>>,
}

impl FakeStackApi {
    pub fn with_stack(mut self, stack: StackSummary) -> Self {
        self.stacks.push(stack);
        self
    }

    pub fn with_events(mut self, stack_name: &str, events: Vec<StackEvent>) -> Self {
        self.events.insert(stack_name.to_string(), Ok(events));
        self
    }

    pub fn with_events_error(mut self, stack_name: &str, error: ApiError) -> Self {
        self.events.insert(stack_name.to_string(), Err(error));
        self
    }

    pub fn with_list_error(mut self, error: ApiError) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Status filters passed to `list_stacks_by_status`, in call order.
    pub fn recorded_filters(&self) -> Vec<Vec<String>> {
        self.filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl StackApi for FakeStackApi {
    async fn list_stacks_by_status(
        &self,
        statuses: &[&str],
    ) -> Result<Vec<StackSummary>, ApiError> {
        self.filters
            .lock()
            .unwrap()
            .push(statuses.iter().map(|s| s.to_string()).collect());

        if let Some(error) = &self.list_error {
            return Err(error.clone());
        }

        Ok(self
            .stacks
            .iter()
            .filter(|s| statuses.contains(&s.status.as_str()))
            .cloned()
            .collect())
    }

    async fn describe_stack_events(
        &self,
        stack_name: &str,
    ) -> Result<Vec<StackEvent>, ApiError> {
        match self.events.get(stack_name) {
            Some(Ok(events)) => Ok(events.clone()),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }
}

/// In-memory `LandingZoneApi`.
#[derive(Default)]
pub struct FakeLandingZoneApi {
    zones: Vec<LandingZoneSummary>,
    detail: Option<LandingZone>,
    list_error: Option<ApiError>,
    get_error: Option<ApiError>,
    requested: Mutex<Vec<String>>,
}

impl FakeLandingZoneApi {
    pub fn with_zone(mut self, arn: &str) -> Self {
        self.zones.push(LandingZoneSummary {
            arn: Some(arn.to_string()),
        });
        self
    }

    pub fn with_zone_without_arn(mut self) -> Self {
        self.zones.push(LandingZoneSummary { arn: None });
        self
    }

    pub fn with_detail(mut self, detail: LandingZone) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_list_error(mut self, error: ApiError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn with_get_error(mut self, error: ApiError) -> Self {
        self.get_error = Some(error);
        self
    }

    /// Identifiers passed to `get_landing_zone`, in call order.
    pub fn requested_identifiers(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl LandingZoneApi for FakeLandingZoneApi {
    async fn list_landing_zones(&self) -> Result<Vec<LandingZoneSummary>, ApiError> {
        match &self.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.zones.clone()),
        }
    }

    async fn get_landing_zone(&self, identifier: &str) -> Result<LandingZone, ApiError> {
        self.requested.lock().unwrap().push(identifier.to_string());

        if let Some(error) = &self.get_error {
            return Err(error.clone());
        }

        self.detail.clone().ok_or_else(|| ApiError::NotFound {
            message: format!("no landing zone for {identifier}"),
        })
    }
}
