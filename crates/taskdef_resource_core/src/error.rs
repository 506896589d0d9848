use thiserror::Error;

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Every way a single custom resource invocation can fail before the
/// status report is sent. All variants end up as the `Reason` of a
/// `FAILED` report.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Unknown request type: {0}")]
    UnknownRequestType(String),

    #[error("malformed custom resource event: {0}")]
    MalformedEvent(String),

    #[error("invalid integer value {value:?} for {path}")]
    InvalidInteger { path: &'static str, value: String },

    #[error("invalid task definition properties: {0}")]
    InvalidProperties(#[from] serde_json::Error),

    #[error("task definition was registered but the response carried no ARN")]
    MissingArn,

    /// Errors raised by the task definition API, passed through verbatim.
    #[error("{0}")]
    Registry(String),
}
