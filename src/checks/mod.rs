//! Preflight checks against the AWS control plane
//!
//! Each check is a pure function of its API client, reporter, and
//! configuration, returning `true` on pass. Error leniency (skip on
//! access-denied, fail otherwise) is decided per check.

pub mod landing_zone;
pub mod stacks;
