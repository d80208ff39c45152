//! Preflight configuration resolved once at process start
//!
//! Business logic never reads the process environment directly; the resolved
//! `PreflightConfig` is passed by value into each check.

use thiserror::Error;

/// Default stack name prefix used by the Landing Zone Accelerator.
pub const DEFAULT_STACK_PREFIX: &str = "AWSAccelerator";

/// Default environment name appended to the stack prefix.
pub const DEFAULT_ENVIRONMENT: &str = "lz";

/// Configuration resolution errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither AWS_REGION nor AWS_DEFAULT_REGION is set
    #[error("AWS_REGION environment variable not set. Please set the AWS region.")]
    MissingRegion,
}

/// Resolved configuration for a preflight run
#[derive(Debug, Clone)]
pub struct PreflightConfig {
    /// Deployment environment name (e.g., "lz")
    pub environment: String,
    /// Region for the CloudFormation stack check
    pub check_region: String,
    /// Control Tower home region (may differ from the check region)
    pub ct_home_region: String,
    /// Stack name prefix to match, case-sensitive
    pub stack_prefix: String,
}

impl PreflightConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from a key lookup.
    ///
    /// Resolution rules:
    /// - `ENVIRONMENT` defaults to "lz"
    /// - `AWS_REGION` falls back to `AWS_DEFAULT_REGION`; both missing is an error
    /// - `CT_HOME_REGION` defaults to the check region
    /// - `STACK_PREFIX` defaults to `AWSAccelerator-{environment}`
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let check_region = lookup("AWS_REGION")
            .or_else(|| lookup("AWS_DEFAULT_REGION"))
            .ok_or(ConfigError::MissingRegion)?;

        let ct_home_region = lookup("CT_HOME_REGION").unwrap_or_else(|| check_region.clone());

        let stack_prefix = lookup("STACK_PREFIX")
            .unwrap_or_else(|| format!("{DEFAULT_STACK_PREFIX}-{environment}"));

        Ok(Self {
            environment,
            check_region,
            ct_home_region,
            stack_prefix,
        })
    }
}
