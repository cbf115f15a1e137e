//! AWS client errors.

use thiserror::Error;

/// Result type for AWS client operations.
pub type Result<T> = std::result::Result<T, AwsError>;

/// AWS client errors.
#[derive(Debug, Error)]
pub enum AwsError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or unusable credentials.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Region not specified.
    #[error("AWS region not specified (set AMZ_REGION or configure a region)")]
    RegionNotSpecified,
}
