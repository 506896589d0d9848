use serde_json::{Map, Value};
use taskdef_resource_core::coercion::coerce_properties;
use taskdef_resource_core::contract::{
    CustomResourceEvent, RequestType, StatusReport, NO_PHYSICAL_RESOURCE_ID,
    SERVICE_TOKEN_PROPERTY,
};
use taskdef_resource_core::descriptor::TaskDefinitionDescriptor;
use taskdef_resource_core::error::{HandlerError, Result};
use tracing::{error, info};

use crate::adapters::callback::ResponseSender;
use crate::adapters::registry::TaskDefinitionRegistry;

pub const REGISTERED_MESSAGE: &str = "Successfully registered task definition";
pub const DEREGISTERED_MESSAGE: &str = "Successfully deregistered task definition";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub physical_resource_id: String,
    pub message: &'static str,
}

/// Runs one lifecycle event to completion and reports the outcome to
/// CloudFormation. The response is attempted exactly once, whatever happened
/// before it; delivery failures are only logged.
pub fn handle_custom_resource_event(
    event: &CustomResourceEvent,
    registry: &dyn TaskDefinitionRegistry,
    sender: &dyn ResponseSender,
) -> StatusReport {
    info!(
        request_type = %event.request_type,
        request_id = %event.request_id,
        logical_resource_id = %event.logical_resource_id,
        "custom resource event received"
    );

    let report = match dispatch_event(event, registry) {
        Ok(outcome) => {
            StatusReport::success(event, outcome.physical_resource_id, outcome.message)
        }
        Err(handler_error) => {
            error!(
                request_type = %event.request_type,
                request_id = %event.request_id,
                error = %handler_error,
                "custom resource request failed"
            );
            StatusReport::failure(event, &handler_error.to_string())
        }
    };

    send_report(event, &report, sender);
    report
}

pub fn dispatch_event(
    event: &CustomResourceEvent,
    registry: &dyn TaskDefinitionRegistry,
) -> Result<DispatchOutcome> {
    match &event.request_type {
        RequestType::Create | RequestType::Update => {
            let physical_resource_id =
                register_task_definition(&event.resource_properties, registry)?;
            Ok(DispatchOutcome {
                physical_resource_id,
                message: REGISTERED_MESSAGE,
            })
        }
        RequestType::Delete => {
            let physical_resource_id = event.physical_resource_id.as_deref().ok_or_else(|| {
                HandlerError::MalformedEvent("Delete requests must carry PhysicalResourceId".into())
            })?;
            Ok(DispatchOutcome {
                physical_resource_id: deregister_task_definition(physical_resource_id, registry)?,
                message: DEREGISTERED_MESSAGE,
            })
        }
        RequestType::Other(other) => Err(HandlerError::UnknownRequestType(other.clone())),
    }
}

pub fn register_task_definition(
    resource_properties: &Map<String, Value>,
    registry: &dyn TaskDefinitionRegistry,
) -> Result<String> {
    let mut properties = resource_properties.clone();
    properties.remove(SERVICE_TOKEN_PROPERTY);
    coerce_properties(&mut properties)?;
    let descriptor = TaskDefinitionDescriptor::from_properties(properties)?;

    info!(
        family = %descriptor.family,
        containers = descriptor.container_definitions.len(),
        "calling RegisterTaskDefinition"
    );
    let task_definition_arn = registry
        .register_task_definition(&descriptor)
        .map_err(HandlerError::Registry)?
        .ok_or(HandlerError::MissingArn)?;
    info!(task_definition_arn = %task_definition_arn, "task definition registered");
    Ok(task_definition_arn)
}

/// `"none"` means no revision was ever registered, so there is nothing to remove.
pub fn deregister_task_definition(
    physical_resource_id: &str,
    registry: &dyn TaskDefinitionRegistry,
) -> Result<String> {
    if physical_resource_id == NO_PHYSICAL_RESOURCE_ID {
        info!("no task definition recorded; skipping DeregisterTaskDefinition");
        return Ok(physical_resource_id.to_string());
    }

    info!(task_definition_arn = %physical_resource_id, "calling DeregisterTaskDefinition");
    registry
        .deregister_task_definition(physical_resource_id)
        .map_err(HandlerError::Registry)?;
    Ok(physical_resource_id.to_string())
}

fn send_report(event: &CustomResourceEvent, report: &StatusReport, sender: &dyn ResponseSender) {
    let body = match serde_json::to_string(report) {
        Ok(value) => value,
        Err(serialize_error) => {
            error!(error = %serialize_error, "failed to serialize custom resource response");
            return;
        }
    };

    info!(body = %body, "sending custom resource response");
    if let Err(send_error) = sender.send_response(&event.response_url, &body) {
        error!(error = %send_error, "custom resource response was not delivered");
    }
}
