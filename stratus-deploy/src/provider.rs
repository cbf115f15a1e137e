//! Provider interfaces.
//!
//! The lifecycle components talk to the cloud through these traits
//! rather than SDK clients directly, so the engine can run against
//! in-memory fakes in tests. The SDK-backed implementations live in
//! [`crate::aws`].
//!
//! Error contract: a missing resource surfaces as
//! [`DeployError::NotFound`](crate::DeployError::NotFound) (or `Ok(None)`
//! for the probing getters), an already-existing resource as
//! [`DeployError::Conflict`](crate::DeployError::Conflict). Callers
//! branch on those two; everything else propagates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;
use crate::types::FunctionDescriptor;

/// Inputs to a raw function creation call.
#[derive(Debug, Clone)]
pub struct CreateFunction {
    pub name: String,
    pub handler: String,
    pub runtime: String,
    pub role_arn: String,
    pub environment: HashMap<String, String>,
    pub archive: Vec<u8>,
}

/// Compute-resource operations.
#[async_trait]
pub trait FunctionApi: Send + Sync {
    /// Fetch a function by name; `None` when it does not exist.
    async fn get_function(&self, name: &str) -> Result<Option<FunctionDescriptor>>;

    /// Create a new function.
    async fn create_function(&self, request: CreateFunction) -> Result<()>;

    /// Replace the code of an existing function.
    async fn update_function_code(&self, name: &str, archive: Vec<u8>) -> Result<()>;

    /// Replace the environment (and execution timeout) of an existing
    /// function.
    async fn update_function_environment(
        &self,
        name: &str,
        environment: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<()>;

    /// Delete a function.
    async fn delete_function(&self, name: &str) -> Result<()>;

    /// Invoke a function synchronously with a JSON payload.
    async fn invoke(&self, name: &str, payload: serde_json::Value) -> Result<serde_json::Value>;

    /// Grant the gateway principal permission to invoke the function.
    async fn add_invoke_permission(
        &self,
        name: &str,
        statement_id: &str,
        source_arn: &str,
    ) -> Result<()>;

    /// Remove a previously granted invoke permission statement.
    async fn remove_invoke_permission(&self, name: &str, statement_id: &str) -> Result<()>;
}

/// Execution-identity operations.
#[async_trait]
pub trait RoleApi: Send + Sync {
    /// Fetch a role ARN by name; `None` when the role does not exist.
    async fn get_role(&self, name: &str) -> Result<Option<String>>;

    /// Create a role with the given trust policy document and return its
    /// ARN.
    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<String>;

    /// Attach a managed policy to the role.
    async fn attach_policy(&self, name: &str, policy_arn: &str) -> Result<()>;

    /// List the ARNs of all policies attached to the role.
    async fn list_attached_policies(&self, name: &str) -> Result<Vec<String>>;

    /// Detach a managed policy from the role.
    async fn detach_policy(&self, name: &str, policy_arn: &str) -> Result<()>;

    /// Delete the role. The role must have no attached policies.
    async fn delete_role(&self, name: &str) -> Result<()>;
}

/// REST gateway operations, mirroring the provider API one call each.
///
/// None of the creation calls are naturally idempotent; the
/// [`GatewayProvisioner`](crate::GatewayProvisioner) wraps them with
/// conflict-tolerant retrieval of the existing resource.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Find a REST API id by its display name.
    async fn find_rest_api(&self, name: &str) -> Result<Option<String>>;

    /// Create a REST API and return its id.
    async fn create_rest_api(&self, name: &str) -> Result<String>;

    /// Fetch the id of the API's root (`/`) resource.
    async fn root_resource(&self, api_id: &str) -> Result<String>;

    /// Create a child resource under `parent_id` and return its id.
    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String>;

    /// Find a resource id by its full path (e.g. `/{proxy+}`).
    async fn find_resource(&self, api_id: &str, path: &str) -> Result<Option<String>>;

    /// Create a method on a resource.
    async fn put_method(&self, api_id: &str, resource_id: &str, http_method: &str) -> Result<()>;

    /// Point a method at the function through a proxy integration.
    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        function_arn: &str,
    ) -> Result<()>;

    /// Declare the method's response headers.
    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<()>;

    /// Map the integration response onto the method response.
    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<()>;

    /// Deploy the API to a stage.
    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<()>;

    /// Delete the REST API.
    async fn delete_rest_api(&self, api_id: &str) -> Result<()>;
}

/// Storage-bucket operations.
#[async_trait]
pub trait BucketApi: Send + Sync {
    /// Create a bucket.
    async fn create_bucket(&self, name: &str) -> Result<()>;

    /// Apply a permissive CORS configuration to the bucket.
    async fn put_bucket_cors(&self, name: &str) -> Result<()>;

    /// List one page of object keys; returns the keys and the
    /// continuation token for the next page, if any.
    async fn list_object_keys(
        &self,
        name: &str,
        continuation: Option<String>,
    ) -> Result<(Vec<String>, Option<String>)>;

    /// Delete a batch of objects.
    async fn delete_objects(&self, name: &str, keys: Vec<String>) -> Result<()>;

    /// Delete the bucket. The bucket must be empty.
    async fn delete_bucket(&self, name: &str) -> Result<()>;
}
