//! Core operations behind the `awskit` CLI.
//!
//! This crate owns the domain logic: template scanning, parameter-store
//! reconciliation and copying, and Step Functions execution redrive. Remote
//! APIs sit behind trait seams so every flow can run against in-memory
//! fakes; the AWS-backed implementations live next to each seam.

pub mod error;
pub mod ssm;
pub mod stepfunctions;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::Error;
