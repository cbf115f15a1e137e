//! Error types for the Stratus CLI.

use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// IO error (record files, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record or payload parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Environment configuration error
    #[error(transparent)]
    Config(#[from] stratus_config::ConfigError),

    /// AWS client error
    #[error(transparent)]
    Aws(#[from] stratus_aws::AwsError),

    /// Deployment engine error
    #[error(transparent)]
    Deploy(#[from] stratus_deploy::DeployError),
}
