//! Deployment orchestration.
//!
//! The orchestrator sequences the lifecycle for one service: resolve the
//! template, validate the environment before any cloud mutation, run the
//! kind's deployment strategy, persist the resulting record. Adding a
//! new deployable kind means registering a new strategy, not extending a
//! switch.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use stratus_config::EnvLoader;

use crate::bucket::BucketProvisioner;
use crate::error::{DeployError, Result};
use crate::function::FunctionProvisioner;
use crate::gateway::GatewayProvisioner;
use crate::role::RoleManager;
use crate::store::ConfigStore;
use crate::template::TemplateSource;
use crate::types::{FuncConfig, FunctionSpec, ServiceKind, ServiceRecord};

/// One deployment variant: how to bring a service up and tear it down.
///
/// `down` is best effort: every step is independently idempotent, so
/// failures are logged and the remaining steps still run.
#[async_trait]
pub trait DeployStrategy: Send + Sync {
    /// The kind this strategy deploys.
    fn kind(&self) -> ServiceKind;

    /// Provision all resources for `internal_name` and return the merged
    /// deployment result.
    async fn up(&self, internal_name: &str, payload: &str) -> Result<FuncConfig>;

    /// Tear down the resources described by the record.
    async fn down(&self, record: &ServiceRecord) -> Result<()>;
}

/// Function + gateway deployment (file upload service).
pub struct AwsUploadStrategy {
    functions: Arc<FunctionProvisioner>,
    gateway: Arc<GatewayProvisioner>,
    roles: Arc<RoleManager>,
    environment: HashMap<String, String>,
}

impl AwsUploadStrategy {
    /// Create the strategy. `environment` is handed to the deployed
    /// function (typically the provider credentials the handler needs).
    pub fn new(
        functions: Arc<FunctionProvisioner>,
        gateway: Arc<GatewayProvisioner>,
        roles: Arc<RoleManager>,
        environment: HashMap<String, String>,
    ) -> Self {
        Self {
            functions,
            gateway,
            roles,
            environment,
        }
    }
}

#[async_trait]
impl DeployStrategy for AwsUploadStrategy {
    fn kind(&self) -> ServiceKind {
        ServiceKind::AwsUpload
    }

    async fn up(&self, internal_name: &str, payload: &str) -> Result<FuncConfig> {
        let spec =
            FunctionSpec::new(internal_name, payload).environment(self.environment.clone());
        let function = self.functions.create_or_update(&spec).await?;
        let endpoint = self.gateway.ensure(internal_name, &function.arn).await?;

        Ok(FuncConfig {
            function,
            url: Some(endpoint.url),
            internal_name: internal_name.to_string(),
            api_id: Some(endpoint.api_id),
            bucket_name: None,
        })
    }

    async fn down(&self, record: &ServiceRecord) -> Result<()> {
        if let Err(err) = self.gateway.delete(record).await {
            warn!(service = %record.internal_name, error = %err, "failed to delete REST API");
        }
        if let Err(err) = self.functions.delete(&record.internal_name).await {
            warn!(service = %record.internal_name, error = %err, "failed to delete function");
        }
        if let Err(err) = self.roles.delete().await {
            warn!(service = %record.internal_name, error = %err, "failed to delete execution role");
        }
        Ok(())
    }
}

/// Bucket + function + gateway deployment (instant database service).
pub struct InstantDatabaseStrategy {
    functions: Arc<FunctionProvisioner>,
    gateway: Arc<GatewayProvisioner>,
    roles: Arc<RoleManager>,
    buckets: Arc<BucketProvisioner>,
    environment: HashMap<String, String>,
}

impl InstantDatabaseStrategy {
    /// Create the strategy.
    pub fn new(
        functions: Arc<FunctionProvisioner>,
        gateway: Arc<GatewayProvisioner>,
        roles: Arc<RoleManager>,
        buckets: Arc<BucketProvisioner>,
        environment: HashMap<String, String>,
    ) -> Self {
        Self {
            functions,
            gateway,
            roles,
            buckets,
            environment,
        }
    }
}

#[async_trait]
impl DeployStrategy for InstantDatabaseStrategy {
    fn kind(&self) -> ServiceKind {
        ServiceKind::InstantDatabase
    }

    async fn up(&self, internal_name: &str, payload: &str) -> Result<FuncConfig> {
        let bucket_name = format!("instant-db-{}", Uuid::new_v4());
        self.buckets.create(&bucket_name).await?;
        info!(bucket = %bucket_name, "companion bucket ready");

        let mut environment = self.environment.clone();
        environment.insert("BUCKET_NAME".to_string(), bucket_name.clone());

        let spec = FunctionSpec::new(internal_name, payload).environment(environment);
        let function = self.functions.create_or_update(&spec).await?;
        let endpoint = self.gateway.ensure(internal_name, &function.arn).await?;

        Ok(FuncConfig {
            function,
            url: Some(endpoint.url),
            internal_name: internal_name.to_string(),
            api_id: Some(endpoint.api_id),
            bucket_name: Some(bucket_name),
        })
    }

    async fn down(&self, record: &ServiceRecord) -> Result<()> {
        if let Err(err) = self.gateway.delete(record).await {
            warn!(service = %record.internal_name, error = %err, "failed to delete REST API");
        }
        if let Err(err) = self.functions.delete(&record.internal_name).await {
            warn!(service = %record.internal_name, error = %err, "failed to delete function");
        }
        if let Err(err) = self.roles.delete().await {
            warn!(service = %record.internal_name, error = %err, "failed to delete execution role");
        }
        if let Some(bucket_name) = record.bucket_name() {
            if let Err(err) = self.buckets.delete(bucket_name).await {
                warn!(bucket = %bucket_name, error = %err, "failed to delete companion bucket");
            }
        }
        Ok(())
    }
}

/// Top-level `up`/`down` entry point.
pub struct Orchestrator {
    templates: Arc<dyn TemplateSource>,
    store: Arc<dyn ConfigStore>,
    env: EnvLoader,
    strategies: HashMap<ServiceKind, Arc<dyn DeployStrategy>>,
}

impl Orchestrator {
    /// Create an orchestrator with no strategies registered.
    pub fn new(templates: Arc<dyn TemplateSource>, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            templates,
            store,
            env: EnvLoader::default(),
            strategies: HashMap::new(),
        }
    }

    /// Register a deployment strategy under its kind.
    pub fn register(mut self, strategy: Arc<dyn DeployStrategy>) -> Self {
        self.strategies.insert(strategy.kind(), strategy);
        self
    }

    /// The record store this orchestrator persists to.
    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    fn known_kinds(&self) -> String {
        let mut kinds: Vec<&str> = self.strategies.keys().map(ServiceKind::as_str).collect();
        kinds.sort_unstable();
        kinds.join(", ")
    }

    fn strategy(&self, kind: ServiceKind) -> Result<&Arc<dyn DeployStrategy>> {
        self.strategies
            .get(&kind)
            .ok_or_else(|| DeployError::UnknownServiceKind {
                kind: kind.to_string(),
                known: self.known_kinds(),
            })
    }

    /// Deploy a service and persist its record.
    ///
    /// Environment validation happens before any cloud mutation. There is
    /// no automatic rollback: when a later step fails, the record is
    /// never persisted, and that absence signals that cleanup of any
    /// partial resources is the caller's responsibility (via [`down`]
    /// with a hand-built record).
    ///
    /// [`down`]: Orchestrator::down
    pub async fn up(&self, kind: ServiceKind, display_name: &str) -> Result<ServiceRecord> {
        let template = self
            .templates
            .find(kind)
            .ok_or_else(|| DeployError::UnknownServiceKind {
                kind: kind.to_string(),
                known: self.known_kinds(),
            })?;
        let strategy = self.strategy(kind)?;

        let missing = self.env.missing_keys(&template.required_keys);
        if !missing.is_empty() {
            return Err(DeployError::MissingEnv(missing));
        }

        let payload = tokio::fs::read_to_string(&template.file_location)
            .await
            .map_err(|source| DeployError::TemplatePayload {
                path: template.file_location.clone(),
                source,
            })?;

        let id = Uuid::new_v4();
        let internal_name = format!("{display_name}-{id}");
        info!(service = %display_name, internal_name = %internal_name, kind = %kind, "deploying service");

        let func_config = strategy.up(&internal_name, &payload).await?;

        let now = Utc::now();
        let record = ServiceRecord {
            name: display_name.to_string(),
            internal_name,
            url: func_config.url.clone(),
            api_id: func_config.api_id.clone(),
            config: serde_json::to_value(&func_config)
                .map_err(|e| DeployError::Serialization(e.to_string()))?,
            id,
            service_type: kind,
            created: now,
            updated: now,
        };

        self.store.add_service(record.clone()).await?;
        info!(id = %record.id, url = ?record.url, "service deployed");
        Ok(record)
    }

    /// Tear down a deployed service and remove its record.
    pub async fn down(&self, record: &ServiceRecord) -> Result<()> {
        let strategy = self.strategy(record.service_type)?;
        info!(service = %record.internal_name, kind = %record.service_type, "destroying service");

        strategy.down(record).await?;
        self.store.delete_service(record.id).await?;

        info!(id = %record.id, "service destroyed");
        Ok(())
    }

    /// Tear down a service by record id.
    pub async fn down_by_id(&self, id: Uuid) -> Result<()> {
        let record = self
            .store
            .view_service(id)
            .await?
            .ok_or_else(|| DeployError::NotFound(format!("service '{id}' not found")))?;
        self.down(&record).await
    }
}
