//! lz-preflight - preflight and configuration validation for an AWS Landing Zone
//!
//! This crate provides read-only preflight checks against CloudFormation and
//! Control Tower, plus local validators for the Landing Zone Accelerator
//! configuration files.

pub mod aws;
pub mod checks;
pub mod config;
pub mod report;
pub mod validate;

#[cfg(test)]
pub mod testing;
