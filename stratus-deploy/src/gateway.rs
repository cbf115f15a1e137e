//! REST gateway provisioning.
//!
//! The provider's REST API is not natively idempotent - creating a
//! resource or method twice raises a conflict - so every non-idempotent
//! step here is wrapped with conflict-tolerant retrieval of the existing
//! resource.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{DeployError, Result};
use crate::provider::{FunctionApi, GatewayApi};
use crate::types::ServiceRecord;

/// Stage every API is deployed to.
pub const STAGE_NAME: &str = "prod";

/// Catch-all child resource forwarding any sub-path to the function.
pub const PROXY_PATH_PART: &str = "{proxy+}";

/// HTTP verbs wired on the proxy resource.
const METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "OPTIONS"];

/// A provisioned HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub api_id: String,
}

/// Creates, reuses, and deletes the REST API in front of a function.
pub struct GatewayProvisioner {
    api: Arc<dyn GatewayApi>,
    functions: Arc<dyn FunctionApi>,
    region: String,
    stage: String,
}

impl GatewayProvisioner {
    /// Create a provisioner deploying to the fixed stage.
    pub fn new(
        api: Arc<dyn GatewayApi>,
        functions: Arc<dyn FunctionApi>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            api,
            functions,
            region: region.into(),
            stage: STAGE_NAME.to_string(),
        }
    }

    /// Naming convention tying an API to its function. Teardown relies
    /// on this convention when no record is available.
    fn api_name(function_name: &str) -> String {
        format!("{function_name}-api")
    }

    fn invoke_url(&self, api_id: &str, function_name: &str) -> String {
        format!(
            "https://{api_id}.execute-api.{}.amazonaws.com/{}/{function_name}",
            self.region, self.stage
        )
    }

    /// Look for an existing API for this function; `None` when absent.
    ///
    /// This lookup-before-create is what makes gateway provisioning
    /// idempotent at the orchestration level.
    pub async fn check_endpoint(&self, function_name: &str) -> Result<Option<Endpoint>> {
        let found = self.api.find_rest_api(&Self::api_name(function_name)).await?;
        Ok(found.map(|api_id| Endpoint {
            url: self.invoke_url(&api_id, function_name),
            api_id,
        }))
    }

    /// Ensure an API exists for the function and return its endpoint.
    ///
    /// Short-circuits when [`check_endpoint`](Self::check_endpoint) finds
    /// one. Otherwise creates the REST API, wires the proxy resource and
    /// every method/integration pair, deploys the stage, and grants the
    /// gateway principal invoke permission on the function.
    pub async fn ensure(&self, function_name: &str, function_arn: &str) -> Result<Endpoint> {
        if let Some(endpoint) = self.check_endpoint(function_name).await? {
            info!(api_id = %endpoint.api_id, "REST API already exists");
            return Ok(endpoint);
        }

        info!(function = %function_name, "creating REST API");
        let api_id = self
            .api
            .create_rest_api(&Self::api_name(function_name))
            .await?;
        let root_id = self.api.root_resource(&api_id).await?;

        let resource_id = match self
            .api
            .create_resource(&api_id, &root_id, PROXY_PATH_PART)
            .await
        {
            Ok(id) => id,
            Err(DeployError::Conflict(_)) => {
                debug!("proxy resource already exists, retrieving it");
                self.api
                    .find_resource(&api_id, &format!("/{PROXY_PATH_PART}"))
                    .await?
                    .ok_or_else(|| {
                        DeployError::NotFound(
                            "existing proxy resource could not be located".to_string(),
                        )
                    })?
            }
            Err(err) => return Err(err),
        };

        for method in METHODS {
            match self.api.put_method(&api_id, &resource_id, method).await {
                Ok(()) => {}
                Err(DeployError::Conflict(_)) => {
                    debug!(method, "method already exists, rewiring integration");
                }
                Err(err) => return Err(err),
            }

            self.api
                .put_integration(&api_id, &resource_id, method, function_arn)
                .await?;
            self.api
                .put_method_response(&api_id, &resource_id, method)
                .await?;
            self.api
                .put_integration_response(&api_id, &resource_id, method)
                .await?;
        }

        self.api.create_deployment(&api_id, &self.stage).await?;

        let source_arn = format!(
            "arn:aws:execute-api:{}:{}:{}/*/*",
            self.region,
            account_id(function_arn)?,
            api_id
        );
        self.functions
            .add_invoke_permission(function_name, &permission_statement_id(&api_id), &source_arn)
            .await?;

        info!(api_id = %api_id, stage = %self.stage, "REST API deployed");
        Ok(Endpoint {
            url: self.invoke_url(&api_id, function_name),
            api_id,
        })
    }

    /// Delete the service's API and its invoke permission.
    ///
    /// Prefers the record's `api_id`; falls back to the naming
    /// convention for resources created out-of-band. Absent resources
    /// and missing permission statements are tolerated, so the call is
    /// idempotent.
    pub async fn delete(&self, record: &ServiceRecord) -> Result<()> {
        let api_id = match record.api_id.as_deref() {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => {
                self.api
                    .find_rest_api(&Self::api_name(&record.internal_name))
                    .await?
            }
        };

        let Some(api_id) = api_id else {
            debug!(service = %record.internal_name, "no REST API to delete");
            return Ok(());
        };

        match self.api.delete_rest_api(&api_id).await {
            Ok(()) => {}
            Err(DeployError::NotFound(_)) => {
                debug!(api_id = %api_id, "REST API already gone");
            }
            Err(err) => return Err(err),
        }

        match self
            .functions
            .remove_invoke_permission(&record.internal_name, &permission_statement_id(&api_id))
            .await
        {
            Ok(()) => {}
            Err(DeployError::NotFound(_)) => {
                debug!(api_id = %api_id, "invoke permission already removed");
            }
            Err(err) => return Err(err),
        }

        info!(api_id = %api_id, service = %record.internal_name, "REST API deleted");
        Ok(())
    }
}

/// Per-API permission statement id, so grants for different APIs never
/// collide and stale grants are identifiable at teardown.
pub fn permission_statement_id(api_id: &str) -> String {
    format!("apigateway-{api_id}")
}

/// Account id is the fifth segment of the function ARN
/// (`arn:aws:lambda:region:account:function:name`).
fn account_id(function_arn: &str) -> Result<&str> {
    function_arn
        .split(':')
        .nth(4)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| DeployError::Provider(format!("malformed function ARN: {function_arn}")))
}
