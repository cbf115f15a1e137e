//! # Stratus
//!
//! Serverless deployment toolkit for AWS.
//!
//! Stratus packages handler code into a deployable archive, provisions the
//! IAM execution role, the Lambda function, and the API Gateway REST API
//! that exposes the function over HTTPS, polls until the function is
//! active, and tears the whole unit down cleanly.
//!
//! This crate is a facade over the workspace members:
//!
//! - [`aws`] - AWS client container (credentials, region, service clients)
//! - [`config`] - environment configuration and required-key validation
//! - [`deploy`] - the deployment lifecycle engine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stratus::aws::{AwsConfig, AwsServices};
//! use stratus::deploy::{Orchestrator, ServiceKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let services = AwsServices::new(AwsConfig::from_env().build()).await?;
//!     let orchestrator = stratus::deploy::aws_orchestrator(&services)?;
//!
//!     let record = orchestrator.up(ServiceKind::AwsUpload, "my-upload").await?;
//!     println!("deployed at {:?}", record.url);
//!
//!     orchestrator.down(&record).await?;
//!     Ok(())
//! }
//! ```

pub use stratus_aws as aws;
pub use stratus_config as config;
pub use stratus_deploy as deploy;
