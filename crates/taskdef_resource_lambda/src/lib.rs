//! AWS-oriented adapters and handlers for the task definition custom resource.
//!
//! This crate owns runtime integration details (the Lambda handler, the ECS
//! registry adapter, and the CloudFormation response sender). Domain rules
//! live in `taskdef_resource_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
