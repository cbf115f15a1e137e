//! # Stratus Deploy
//!
//! The serverless deployment lifecycle engine.
//!
//! Deploying a service runs: pack the handler code into an archive,
//! ensure the execution role exists, create or update the function and
//! poll until it is active, then create (or reuse) the REST API exposing
//! it over HTTPS. Teardown reverses the sequence, and every step is
//! idempotent so partial state can be retried or cleaned up safely.
//!
//! Components talk to the cloud through the [`provider`] traits; the
//! SDK-backed implementations live in [`aws`], and tests substitute
//! in-memory fakes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stratus_aws::{AwsConfig, AwsServices};
//! use stratus_deploy::{ServiceKind, aws_orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let services = AwsServices::new(AwsConfig::from_env().build()).await?;
//!     let orchestrator = aws_orchestrator(&services)?;
//!
//!     let record = orchestrator.up(ServiceKind::AwsUpload, "my-upload").await?;
//!     println!("deployed at {:?}", record.url);
//!
//!     orchestrator.down(&record).await?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod aws;
pub mod bucket;
pub mod error;
pub mod function;
pub mod gateway;
pub mod orchestrator;
pub mod provider;
pub mod role;
pub mod store;
pub mod template;
pub mod types;

pub use archive::Archiver;
pub use bucket::BucketProvisioner;
pub use error::{DeployError, Result};
pub use function::{FunctionProvisioner, PollSettings};
pub use gateway::{Endpoint, GatewayProvisioner};
pub use orchestrator::{
    AwsUploadStrategy, DeployStrategy, InstantDatabaseStrategy, Orchestrator,
};
pub use role::{EnsuredRole, RoleManager};
pub use store::{ConfigStore, MemoryStore};
pub use template::{ServiceTemplate, TemplateRegistry, TemplateSource};
pub use types::{
    FuncConfig, FunctionDescriptor, FunctionSpec, FunctionState, ServiceKind, ServiceRecord,
};

use std::collections::HashMap;
use std::sync::Arc;

use stratus_aws::AwsServices;
use stratus_config::keys;

use crate::aws::{AwsBucketApi, AwsFunctionApi, AwsGatewayApi, AwsRoleApi};
use crate::provider::{BucketApi, FunctionApi, GatewayApi, RoleApi};

/// Build a fully wired, SDK-backed orchestrator with the built-in
/// templates and an in-memory record store.
pub fn aws_orchestrator(services: &AwsServices) -> Result<Orchestrator> {
    let functions: Arc<dyn FunctionApi> = Arc::new(AwsFunctionApi::new(services));
    let role_api: Arc<dyn RoleApi> = Arc::new(AwsRoleApi::new(services));
    let gateway_api: Arc<dyn GatewayApi> = Arc::new(AwsGatewayApi::new(services)?);
    let bucket_api: Arc<dyn BucketApi> = Arc::new(AwsBucketApi::new(services)?);
    let region = services.require_region()?.to_string();

    let roles = Arc::new(RoleManager::new(role_api));
    let provisioner = Arc::new(FunctionProvisioner::new(functions.clone(), roles.clone()));
    let gateway = Arc::new(GatewayProvisioner::new(gateway_api, functions, region));
    let buckets = Arc::new(BucketProvisioner::new(bucket_api));

    let environment = handler_environment();

    Ok(Orchestrator::new(
        Arc::new(TemplateRegistry::builtin()),
        Arc::new(MemoryStore::new()),
    )
    .register(Arc::new(AwsUploadStrategy::new(
        provisioner.clone(),
        gateway.clone(),
        roles.clone(),
        environment.clone(),
    )))
    .register(Arc::new(InstantDatabaseStrategy::new(
        provisioner,
        gateway,
        roles,
        buckets,
        environment,
    ))))
}

/// Environment handed to deployed handlers: the provider credentials
/// they need to call back into AWS, mirrored from the process
/// environment.
fn handler_environment() -> HashMap<String, String> {
    [keys::AMZ_REGION, keys::AMZ_ID, keys::AMZ_SEC]
        .into_iter()
        .map(|key| (key.to_string(), std::env::var(key).unwrap_or_default()))
        .collect()
}
