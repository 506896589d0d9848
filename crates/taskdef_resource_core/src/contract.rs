use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Physical id reported when no task definition revision is known.
pub const NO_PHYSICAL_RESOURCE_ID: &str = "none";
pub const DEFAULT_FAILURE_REASON: &str = "No reason provided";
/// Bookkeeping property CloudFormation adds to every custom resource.
pub const SERVICE_TOKEN_PROPERTY: &str = "ServiceToken";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Other(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        match value {
            RequestType::Create => "Create".to_string(),
            RequestType::Update => "Update".to_string(),
            RequestType::Delete => "Delete".to_string(),
            RequestType::Other(other) => other,
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("Create"),
            Self::Update => f.write_str("Update"),
            Self::Delete => f.write_str("Delete"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Lifecycle event delivered by CloudFormation to the custom resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Body PUT to the event's pre-signed response URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusReport {
    pub status: ResponseStatus,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusReport {
    pub fn success(
        event: &CustomResourceEvent,
        physical_resource_id: impl Into<String>,
        message: &str,
    ) -> Self {
        Self::from_event(
            event,
            ResponseStatus::Success,
            physical_resource_id.into(),
            (!message.is_empty()).then(|| message.to_string()),
        )
    }

    /// Failures never carry a physical id other than [`NO_PHYSICAL_RESOURCE_ID`].
    pub fn failure(event: &CustomResourceEvent, message: &str) -> Self {
        let reason = if message.is_empty() {
            DEFAULT_FAILURE_REASON.to_string()
        } else {
            message.to_string()
        };
        Self::from_event(
            event,
            ResponseStatus::Failed,
            NO_PHYSICAL_RESOURCE_ID.to_string(),
            Some(reason),
        )
    }

    fn from_event(
        event: &CustomResourceEvent,
        status: ResponseStatus,
        physical_resource_id: String,
        reason: Option<String>,
    ) -> Self {
        Self {
            status,
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            reason,
        }
    }
}
