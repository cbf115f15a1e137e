//! # Stratus AWS
//!
//! AWS client container for the Stratus deployment engine.
//!
//! Holds the shared SDK configuration (region, credentials, optional
//! endpoint override) and hands out lazily initialized clients for the
//! services the lifecycle engine touches: Lambda, IAM, API Gateway, and
//! S3.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stratus_aws::{AwsConfig, AwsServices};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AwsConfig::builder()
//!         .region("us-east-1")
//!         .explicit_credentials("AKIA...", "...")
//!         .build();
//!
//!     let services = AwsServices::new(config).await?;
//!     let functions = services.lambda().list_functions().send().await?;
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod services;

pub use config::{AwsConfig, AwsConfigBuilder, CredentialsSource};
pub use error::{AwsError, Result};
pub use services::AwsServices;

// Re-export AWS types for convenience
pub use aws_config;
pub use aws_credential_types;

// Re-export service clients
pub use aws_sdk_apigateway;
pub use aws_sdk_iam;
pub use aws_sdk_lambda;
pub use aws_sdk_s3;
