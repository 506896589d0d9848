//! Domain primitives for the task definition custom resource.
//!
//! This crate owns the CloudFormation event/report contract, the string-to-type
//! coercion schema, and the typed task definition descriptor. It intentionally
//! excludes AWS SDK, HTTP, and Lambda runtime concerns.

pub mod coercion;
pub mod contract;
pub mod descriptor;
pub mod error;
