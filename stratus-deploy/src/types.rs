//! Deployment data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DeployError;

/// Default handler entry point.
pub const DEFAULT_HANDLER: &str = "index.handler";

/// Default function runtime.
pub const DEFAULT_RUNTIME: &str = "nodejs18.x";

/// Inputs to function provisioning.
///
/// Immutable once submitted to a provisioning call; the builder methods
/// consume and return the spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name; also the uniqueness key for create-or-update.
    pub name: String,
    /// Handler source text.
    pub code: String,
    /// Handler entry point.
    pub handler: String,
    /// Runtime identifier.
    pub runtime: String,
    /// Environment variables for the function.
    #[serde(default)]
    pub environment: HashMap<String, String>,
}

impl FunctionSpec {
    /// Create a spec with the default handler and runtime.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            handler: DEFAULT_HANDLER.to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            environment: HashMap::new(),
        }
    }

    /// Set the handler entry point.
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = handler.into();
        self
    }

    /// Set the runtime identifier.
    pub fn runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Set the environment variables.
    pub fn environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }
}

/// Provider-reported function state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionState {
    Pending,
    Active,
    Inactive,
    Failed,
}

/// Provider-returned function fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Deployed function name.
    pub name: String,
    /// Function ARN.
    pub arn: String,
    /// Current state.
    pub state: FunctionState,
    /// Runtime identifier, when reported.
    pub runtime: Option<String>,
    /// Handler entry point, when reported.
    pub handler: Option<String>,
    /// Last-modified timestamp, when reported.
    pub last_modified: Option<String>,
}

/// Result of a full function deployment: the provider descriptor plus
/// the deployment-specific fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncConfig {
    /// Provider function descriptor.
    #[serde(flatten)]
    pub function: FunctionDescriptor,
    /// Invocable HTTPS endpoint; absent when no gateway was created.
    pub url: Option<String>,
    /// Unique deployed name, distinct from the display name.
    pub internal_name: String,
    /// REST API id, needed for teardown and permission statements.
    pub api_id: Option<String>,
    /// Companion bucket, for bucket-paired service kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
}

/// Discriminator for the deployment variant that produced a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    AwsUpload,
    InstantDatabase,
}

impl ServiceKind {
    /// All known kinds.
    pub const ALL: [ServiceKind; 2] = [ServiceKind::AwsUpload, ServiceKind::InstantDatabase];

    /// The stable tag used in records and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::AwsUpload => "aws_upload",
            ServiceKind::InstantDatabase => "instant_database",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws_upload" => Ok(ServiceKind::AwsUpload),
            "instant_database" => Ok(ServiceKind::InstantDatabase),
            other => Err(DeployError::UnknownServiceKind {
                kind: other.to_string(),
                known: ServiceKind::ALL.map(|k| k.as_str()).join(", "),
            }),
        }
    }
}

/// Persisted metadata describing one deployed service instance.
///
/// This record is the only durable state; the cloud resources carry no
/// bookkeeping beyond their names. Teardown is keyed by `internal_name`
/// and `id`, never by the display name, since display names may repeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Human-facing display name.
    pub name: String,
    /// Globally unique deployed name: `{name}-{uuid}`.
    pub internal_name: String,
    /// Opaque provider-returned fields merged at deploy time.
    pub config: serde_json::Value,
    /// Invocable HTTPS endpoint.
    pub url: Option<String>,
    /// Primary key for lookup and deletion.
    pub id: Uuid,
    /// REST API id.
    pub api_id: Option<String>,
    /// Deployment variant that produced this record.
    pub service_type: ServiceKind,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated: DateTime<Utc>,
}

impl ServiceRecord {
    /// Companion bucket name recorded in the opaque config, if any.
    pub fn bucket_name(&self) -> Option<&str> {
        self.config.get("bucket_name").and_then(|v| v.as_str())
    }
}
