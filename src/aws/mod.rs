//! AWS integration layer
//!
//! `context` loads SDK configuration once per region, `api` exposes the
//! narrow read-only operations the checks consume, and `error` classifies
//! SDK failures into the categories the check policies care about.

pub mod api;
pub mod context;
pub mod error;

pub use api::{CloudFormationClient, ControlTowerClient, LandingZoneApi, StackApi};
pub use context::AwsContext;
pub use error::ApiError;
