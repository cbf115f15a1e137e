//! Deployment engine errors.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

/// Deployment engine errors.
///
/// `NotFound` and `Conflict` carry the provider's signal for the two
/// cases idempotency logic branches on; everything else is fatal to the
/// operation that raised it.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Required environment variables are absent or empty.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    /// The requested service kind has no registered template/strategy.
    #[error("Unknown service kind '{kind}' (known kinds: {known})")]
    UnknownServiceKind { kind: String, known: String },

    /// The template payload could not be read.
    #[error("Failed to read template payload at {path}: {source}")]
    TemplatePayload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Code archive could not be produced.
    #[error("Archive error: {0}")]
    Archive(String),

    /// A provider resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A provider resource already exists.
    #[error("Resource conflict: {0}")]
    Conflict(String),

    /// A function never reached the active state within the deadline.
    #[error("Timed out after {waited:?} waiting for function '{name}' to become active")]
    ActivationTimeout { name: String, waited: Duration },

    /// Payload serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Service record store failure.
    #[error("Service record error: {0}")]
    Store(String),

    /// Any other provider failure.
    #[error("Provider error: {0}")]
    Provider(String),

    /// AWS client configuration failure.
    #[error(transparent)]
    Aws(#[from] stratus_aws::AwsError),

    /// IO failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for DeployError {
    fn from(err: zip::result::ZipError) -> Self {
        DeployError::Archive(err.to_string())
    }
}

impl DeployError {
    /// Whether this error is the not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeployError::NotFound(_))
    }

    /// Whether this error is the already-exists signal.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DeployError::Conflict(_))
    }
}
