//! In-memory provider fakes shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use stratus_deploy::error::{DeployError, Result};
use stratus_deploy::provider::{BucketApi, CreateFunction, FunctionApi, GatewayApi, RoleApi};
use stratus_deploy::types::{FunctionDescriptor, FunctionState};

pub const REGION: &str = "us-east-1";
pub const ACCOUNT_ID: &str = "123456789012";

pub fn function_arn(name: &str) -> String {
    format!("arn:aws:lambda:{REGION}:{ACCOUNT_ID}:function:{name}")
}

/// How fake functions reach the active state.
#[derive(Debug, Clone, Copy, Default)]
pub enum Activation {
    #[default]
    Immediate,
    AfterPolls(u32),
    Never,
}

#[derive(Debug, Clone)]
pub struct FakeFunction {
    pub handler: String,
    pub runtime: String,
    pub role_arn: String,
    pub environment: HashMap<String, String>,
    pub archive: Vec<u8>,
    pub code_version: u32,
    pub state: FunctionState,
    pub activation: Activation,
    pub polls_remaining: u32,
}

#[derive(Debug, Clone)]
pub struct FakeRole {
    pub arn: String,
    pub attached: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    pub name: String,
    /// resource id -> path
    pub resources: HashMap<String, String>,
    /// (resource id, verb)
    pub methods: Vec<(String, String)>,
    /// (resource id, verb, function arn)
    pub integrations: Vec<(String, String, String)>,
    pub method_responses: Vec<(String, String)>,
    pub integration_responses: Vec<(String, String)>,
    pub deployed_stage: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBucket {
    pub keys: Vec<String>,
    pub cors: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub get_function: u32,
    pub create_function: u32,
    pub update_code: u32,
    pub update_environment: u32,
    pub get_role: u32,
    pub create_role: u32,
    pub find_rest_api: u32,
    pub create_rest_api: u32,
}

#[derive(Default)]
pub struct CloudState {
    pub functions: HashMap<String, FakeFunction>,
    pub roles: HashMap<String, FakeRole>,
    /// api id -> api
    pub apis: HashMap<String, FakeApi>,
    pub buckets: HashMap<String, FakeBucket>,
    /// function name -> permission statement ids
    pub permissions: HashMap<String, Vec<String>>,
    pub activation: Activation,
    /// When set, freshly created APIs already carry a proxy resource
    /// (simulates retrying a partially provisioned API).
    pub proxy_preexists: bool,
    /// When set, freshly created APIs already carry every method.
    pub methods_preexist: bool,
    pub next_api: u32,
    pub next_resource: u32,
    pub counters: Counters,
}

/// Shared fake cloud; hands out API implementations over common state.
#[derive(Clone, Default)]
pub struct FakeCloud {
    state: Arc<Mutex<CloudState>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activation(activation: Activation) -> Self {
        let cloud = Self::default();
        cloud.state.lock().activation = activation;
        cloud
    }

    pub fn with_preexisting_proxy(self) -> Self {
        self.state.lock().proxy_preexists = true;
        self
    }

    pub fn with_preexisting_methods(self) -> Self {
        self.state.lock().methods_preexist = true;
        self
    }

    pub fn function_api(&self) -> Arc<FakeFunctionApi> {
        Arc::new(FakeFunctionApi {
            cloud: self.clone(),
        })
    }

    pub fn role_api(&self) -> Arc<FakeRoleApi> {
        Arc::new(FakeRoleApi {
            cloud: self.clone(),
        })
    }

    pub fn gateway_api(&self) -> Arc<FakeGatewayApi> {
        Arc::new(FakeGatewayApi {
            cloud: self.clone(),
        })
    }

    pub fn bucket_api(&self) -> Arc<FakeBucketApi> {
        Arc::new(FakeBucketApi {
            cloud: self.clone(),
        })
    }

    // State seeding

    pub fn seed_function(&self, name: &str) {
        self.state.lock().functions.insert(
            name.to_string(),
            FakeFunction {
                handler: "index.handler".to_string(),
                runtime: "nodejs18.x".to_string(),
                role_arn: format!("arn:aws:iam::{ACCOUNT_ID}:role/LambdaExecutionRole"),
                environment: HashMap::new(),
                archive: Vec::new(),
                code_version: 1,
                state: FunctionState::Active,
                activation: Activation::Immediate,
                polls_remaining: 0,
            },
        );
    }

    pub fn seed_role(&self, name: &str, attached: Vec<String>) {
        self.state.lock().roles.insert(
            name.to_string(),
            FakeRole {
                arn: format!("arn:aws:iam::{ACCOUNT_ID}:role/{name}"),
                attached,
            },
        );
    }

    pub fn seed_bucket(&self, name: &str, keys: Vec<String>) {
        self.state
            .lock()
            .buckets
            .insert(name.to_string(), FakeBucket { keys, cors: false });
    }

    // State inspection

    pub fn counters(&self) -> Counters {
        self.state.lock().counters.clone()
    }

    pub fn function_count(&self) -> usize {
        self.state.lock().functions.len()
    }

    pub fn function(&self, name: &str) -> Option<FakeFunction> {
        self.state.lock().functions.get(name).cloned()
    }

    pub fn role_count(&self) -> usize {
        self.state.lock().roles.len()
    }

    pub fn role(&self, name: &str) -> Option<FakeRole> {
        self.state.lock().roles.get(name).cloned()
    }

    pub fn api_count(&self) -> usize {
        self.state.lock().apis.len()
    }

    pub fn api(&self, id: &str) -> Option<FakeApi> {
        self.state.lock().apis.get(id).cloned()
    }

    pub fn bucket_count(&self) -> usize {
        self.state.lock().buckets.len()
    }

    pub fn bucket(&self, name: &str) -> Option<FakeBucket> {
        self.state.lock().buckets.get(name).cloned()
    }

    pub fn permissions(&self, function: &str) -> Vec<String> {
        self.state
            .lock()
            .permissions
            .get(function)
            .cloned()
            .unwrap_or_default()
    }
}

pub struct FakeFunctionApi {
    cloud: FakeCloud,
}

#[async_trait]
impl FunctionApi for FakeFunctionApi {
    async fn get_function(&self, name: &str) -> Result<Option<FunctionDescriptor>> {
        let mut state = self.cloud.state.lock();
        state.counters.get_function += 1;

        let Some(function) = state.functions.get_mut(name) else {
            return Ok(None);
        };

        if function.state == FunctionState::Pending {
            if let Activation::AfterPolls(_) = function.activation {
                if function.polls_remaining > 0 {
                    function.polls_remaining -= 1;
                    if function.polls_remaining == 0 {
                        function.state = FunctionState::Active;
                    }
                }
            }
        }

        Ok(Some(FunctionDescriptor {
            name: name.to_string(),
            arn: function_arn(name),
            state: function.state,
            runtime: Some(function.runtime.clone()),
            handler: Some(function.handler.clone()),
            last_modified: None,
        }))
    }

    async fn create_function(&self, request: CreateFunction) -> Result<()> {
        let mut state = self.cloud.state.lock();
        state.counters.create_function += 1;

        if state.functions.contains_key(&request.name) {
            return Err(DeployError::Conflict(format!(
                "function '{}' already exists",
                request.name
            )));
        }

        let activation = state.activation;
        let (function_state, polls_remaining) = match activation {
            Activation::Immediate => (FunctionState::Active, 0),
            Activation::AfterPolls(polls) => (FunctionState::Pending, polls),
            Activation::Never => (FunctionState::Pending, 0),
        };

        state.functions.insert(
            request.name.clone(),
            FakeFunction {
                handler: request.handler,
                runtime: request.runtime,
                role_arn: request.role_arn,
                environment: request.environment,
                archive: request.archive,
                code_version: 1,
                state: function_state,
                activation,
                polls_remaining,
            },
        );
        Ok(())
    }

    async fn update_function_code(&self, name: &str, archive: Vec<u8>) -> Result<()> {
        let mut state = self.cloud.state.lock();
        state.counters.update_code += 1;

        let function = state
            .functions
            .get_mut(name)
            .ok_or_else(|| DeployError::NotFound(format!("function '{name}' does not exist")))?;
        function.archive = archive;
        function.code_version += 1;
        Ok(())
    }

    async fn update_function_environment(
        &self,
        name: &str,
        environment: &HashMap<String, String>,
        _timeout: Duration,
    ) -> Result<()> {
        let mut state = self.cloud.state.lock();
        state.counters.update_environment += 1;

        let function = state
            .functions
            .get_mut(name)
            .ok_or_else(|| DeployError::NotFound(format!("function '{name}' does not exist")))?;
        function.environment = environment.clone();
        Ok(())
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        state
            .functions
            .remove(name)
            .ok_or_else(|| DeployError::NotFound(format!("function '{name}' does not exist")))?;
        state.permissions.remove(name);
        Ok(())
    }

    async fn invoke(&self, name: &str, payload: serde_json::Value) -> Result<serde_json::Value> {
        let state = self.cloud.state.lock();
        if !state.functions.contains_key(name) {
            return Err(DeployError::NotFound(format!(
                "function '{name}' does not exist"
            )));
        }
        Ok(serde_json::json!({ "function": name, "echo": payload }))
    }

    async fn add_invoke_permission(
        &self,
        name: &str,
        statement_id: &str,
        _source_arn: &str,
    ) -> Result<()> {
        let mut state = self.cloud.state.lock();
        if !state.functions.contains_key(name) {
            return Err(DeployError::NotFound(format!(
                "function '{name}' does not exist"
            )));
        }

        let statements = state.permissions.entry(name.to_string()).or_default();
        if statements.iter().any(|s| s == statement_id) {
            return Err(DeployError::Conflict(format!(
                "statement '{statement_id}' already exists"
            )));
        }
        statements.push(statement_id.to_string());
        Ok(())
    }

    async fn remove_invoke_permission(&self, name: &str, statement_id: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let statements = state
            .permissions
            .get_mut(name)
            .ok_or_else(|| DeployError::NotFound(format!("function '{name}' has no permissions")))?;

        let before = statements.len();
        statements.retain(|s| s != statement_id);
        if statements.len() == before {
            return Err(DeployError::NotFound(format!(
                "statement '{statement_id}' does not exist"
            )));
        }
        Ok(())
    }
}

pub struct FakeRoleApi {
    cloud: FakeCloud,
}

#[async_trait]
impl RoleApi for FakeRoleApi {
    async fn get_role(&self, name: &str) -> Result<Option<String>> {
        let mut state = self.cloud.state.lock();
        state.counters.get_role += 1;
        Ok(state.roles.get(name).map(|role| role.arn.clone()))
    }

    async fn create_role(&self, name: &str, _trust_policy: &str) -> Result<String> {
        let mut state = self.cloud.state.lock();
        state.counters.create_role += 1;

        if state.roles.contains_key(name) {
            return Err(DeployError::Conflict(format!("role '{name}' already exists")));
        }

        let arn = format!("arn:aws:iam::{ACCOUNT_ID}:role/{name}");
        state.roles.insert(
            name.to_string(),
            FakeRole {
                arn: arn.clone(),
                attached: Vec::new(),
            },
        );
        Ok(arn)
    }

    async fn attach_policy(&self, name: &str, policy_arn: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let role = state
            .roles
            .get_mut(name)
            .ok_or_else(|| DeployError::NotFound(format!("role '{name}' does not exist")))?;
        role.attached.push(policy_arn.to_string());
        Ok(())
    }

    async fn list_attached_policies(&self, name: &str) -> Result<Vec<String>> {
        let state = self.cloud.state.lock();
        let role = state
            .roles
            .get(name)
            .ok_or_else(|| DeployError::NotFound(format!("role '{name}' does not exist")))?;
        Ok(role.attached.clone())
    }

    async fn detach_policy(&self, name: &str, policy_arn: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let role = state
            .roles
            .get_mut(name)
            .ok_or_else(|| DeployError::NotFound(format!("role '{name}' does not exist")))?;

        let before = role.attached.len();
        role.attached.retain(|arn| arn != policy_arn);
        if role.attached.len() == before {
            return Err(DeployError::NotFound(format!(
                "policy '{policy_arn}' is not attached"
            )));
        }
        Ok(())
    }

    async fn delete_role(&self, name: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let role = state
            .roles
            .get(name)
            .ok_or_else(|| DeployError::NotFound(format!("role '{name}' does not exist")))?;

        if !role.attached.is_empty() {
            return Err(DeployError::Conflict(format!(
                "role '{name}' still has attached policies"
            )));
        }

        state.roles.remove(name);
        Ok(())
    }
}

pub struct FakeGatewayApi {
    cloud: FakeCloud,
}

const VERBS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "OPTIONS"];

#[async_trait]
impl GatewayApi for FakeGatewayApi {
    async fn find_rest_api(&self, name: &str) -> Result<Option<String>> {
        let mut state = self.cloud.state.lock();
        state.counters.find_rest_api += 1;
        Ok(state
            .apis
            .iter()
            .find(|(_, api)| api.name == name)
            .map(|(id, _)| id.clone()))
    }

    async fn create_rest_api(&self, name: &str) -> Result<String> {
        let mut state = self.cloud.state.lock();
        state.counters.create_rest_api += 1;

        state.next_api += 1;
        let api_id = format!("api-{}", state.next_api);

        state.next_resource += 1;
        let root_id = format!("res-{}", state.next_resource);

        let mut api = FakeApi {
            name: name.to_string(),
            ..FakeApi::default()
        };
        api.resources.insert(root_id, "/".to_string());

        if state.proxy_preexists {
            state.next_resource += 1;
            let proxy_id = format!("res-{}", state.next_resource);
            api.resources.insert(proxy_id.clone(), "/{proxy+}".to_string());
            if state.methods_preexist {
                for verb in VERBS {
                    api.methods.push((proxy_id.clone(), verb.to_string()));
                }
            }
        }

        state.apis.insert(api_id.clone(), api);
        Ok(api_id)
    }

    async fn root_resource(&self, api_id: &str) -> Result<String> {
        let state = self.cloud.state.lock();
        let api = state
            .apis
            .get(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;
        api.resources
            .iter()
            .find(|(_, path)| path.as_str() == "/")
            .map(|(id, _)| id.clone())
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' has no root resource")))
    }

    async fn create_resource(
        &self,
        api_id: &str,
        _parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        let mut state = self.cloud.state.lock();
        state.next_resource += 1;
        let resource_id = format!("res-{}", state.next_resource);

        let api = state
            .apis
            .get_mut(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;

        let path = format!("/{path_part}");
        if api.resources.values().any(|existing| existing == &path) {
            return Err(DeployError::Conflict(format!(
                "resource '{path}' already exists"
            )));
        }

        api.resources.insert(resource_id.clone(), path);
        Ok(resource_id)
    }

    async fn find_resource(&self, api_id: &str, path: &str) -> Result<Option<String>> {
        let state = self.cloud.state.lock();
        let api = state
            .apis
            .get(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;
        Ok(api
            .resources
            .iter()
            .find(|(_, existing)| existing.as_str() == path)
            .map(|(id, _)| id.clone()))
    }

    async fn put_method(&self, api_id: &str, resource_id: &str, http_method: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let api = state
            .apis
            .get_mut(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;

        let key = (resource_id.to_string(), http_method.to_string());
        if api.methods.contains(&key) {
            return Err(DeployError::Conflict(format!(
                "method '{http_method}' already exists"
            )));
        }
        api.methods.push(key);
        Ok(())
    }

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        function_arn: &str,
    ) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let api = state
            .apis
            .get_mut(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;

        api.integrations.retain(|(resource, verb, _)| {
            !(resource == resource_id && verb == http_method)
        });
        api.integrations.push((
            resource_id.to_string(),
            http_method.to_string(),
            function_arn.to_string(),
        ));
        Ok(())
    }

    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let api = state
            .apis
            .get_mut(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;
        api.method_responses
            .push((resource_id.to_string(), http_method.to_string()));
        Ok(())
    }

    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let api = state
            .apis
            .get_mut(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;
        api.integration_responses
            .push((resource_id.to_string(), http_method.to_string()));
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let api = state
            .apis
            .get_mut(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;
        api.deployed_stage = Some(stage.to_string());
        Ok(())
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        state
            .apis
            .remove(api_id)
            .ok_or_else(|| DeployError::NotFound(format!("API '{api_id}' does not exist")))?;
        Ok(())
    }
}

pub struct FakeBucketApi {
    cloud: FakeCloud,
}

#[async_trait]
impl BucketApi for FakeBucketApi {
    async fn create_bucket(&self, name: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        if state.buckets.contains_key(name) {
            return Err(DeployError::Conflict(format!(
                "bucket '{name}' already exists"
            )));
        }
        state.buckets.insert(name.to_string(), FakeBucket::default());
        Ok(())
    }

    async fn put_bucket_cors(&self, name: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let bucket = state
            .buckets
            .get_mut(name)
            .ok_or_else(|| DeployError::NotFound(format!("bucket '{name}' does not exist")))?;
        bucket.cors = true;
        Ok(())
    }

    async fn list_object_keys(
        &self,
        name: &str,
        continuation: Option<String>,
    ) -> Result<(Vec<String>, Option<String>)> {
        const PAGE_SIZE: usize = 2;

        let state = self.cloud.state.lock();
        let bucket = state
            .buckets
            .get(name)
            .ok_or_else(|| DeployError::NotFound(format!("bucket '{name}' does not exist")))?;

        // Tokens resume after the named key, like the real listing API,
        // so deleting a page between requests does not skip keys.
        let mut all = bucket.keys.clone();
        all.sort();
        let start = match continuation.as_deref() {
            Some(token) => all
                .iter()
                .position(|key| key.as_str() > token)
                .unwrap_or(all.len()),
            None => 0,
        };

        let keys: Vec<String> = all.iter().skip(start).take(PAGE_SIZE).cloned().collect();
        let next = if start + keys.len() < all.len() {
            keys.last().cloned()
        } else {
            None
        };

        Ok((keys, next))
    }

    async fn delete_objects(&self, name: &str, keys: Vec<String>) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let bucket = state
            .buckets
            .get_mut(name)
            .ok_or_else(|| DeployError::NotFound(format!("bucket '{name}' does not exist")))?;
        bucket.keys.retain(|key| !keys.contains(key));
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> Result<()> {
        let mut state = self.cloud.state.lock();
        let bucket = state
            .buckets
            .get(name)
            .ok_or_else(|| DeployError::NotFound(format!("bucket '{name}' does not exist")))?;

        if !bucket.keys.is_empty() {
            return Err(DeployError::Conflict(format!("bucket '{name}' is not empty")));
        }

        state.buckets.remove(name);
        Ok(())
    }
}
