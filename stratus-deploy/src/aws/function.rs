//! Lambda-backed function operations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use stratus_aws::AwsServices;
use stratus_aws::aws_sdk_lambda::Client;
use stratus_aws::aws_sdk_lambda::primitives::Blob;
use stratus_aws::aws_sdk_lambda::types::{
    Environment, FunctionCode, FunctionConfiguration, Runtime, State,
};

use super::classify;
use crate::error::{DeployError, Result};
use crate::provider::{CreateFunction, FunctionApi};
use crate::types::{FunctionDescriptor, FunctionState};

/// Lambda implementation of [`FunctionApi`].
pub struct AwsFunctionApi {
    client: Client,
}

impl AwsFunctionApi {
    /// Create from the shared client container.
    pub fn new(services: &AwsServices) -> Self {
        Self {
            client: services.lambda(),
        }
    }
}

#[async_trait]
impl FunctionApi for AwsFunctionApi {
    async fn get_function(&self, name: &str) -> Result<Option<FunctionDescriptor>> {
        match self.client.get_function().function_name(name).send().await {
            Ok(output) => {
                let configuration = output.configuration().ok_or_else(|| {
                    DeployError::Provider(format!("function '{name}' has no configuration"))
                })?;
                Ok(Some(descriptor_from(configuration)))
            }
            Err(err) => match classify(err) {
                DeployError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn create_function(&self, request: CreateFunction) -> Result<()> {
        let CreateFunction {
            name,
            handler,
            runtime,
            role_arn,
            environment,
            archive,
        } = request;

        let environment = Environment::builder()
            .set_variables(Some(environment))
            .build();
        let code = FunctionCode::builder().zip_file(Blob::new(archive)).build();

        self.client
            .create_function()
            .function_name(name)
            .handler(handler)
            .runtime(Runtime::from(runtime.as_str()))
            .role(role_arn)
            .environment(environment)
            .code(code)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn update_function_code(&self, name: &str, archive: Vec<u8>) -> Result<()> {
        self.client
            .update_function_code()
            .function_name(name)
            .zip_file(Blob::new(archive))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn update_function_environment(
        &self,
        name: &str,
        environment: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<()> {
        self.client
            .update_function_configuration()
            .function_name(name)
            .timeout(timeout.as_secs() as i32)
            .environment(
                Environment::builder()
                    .set_variables(Some(environment.clone()))
                    .build(),
            )
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        self.client
            .delete_function()
            .function_name(name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn invoke(&self, name: &str, payload: serde_json::Value) -> Result<serde_json::Value> {
        let payload =
            serde_json::to_vec(&payload).map_err(|e| DeployError::Serialization(e.to_string()))?;

        let output = self
            .client
            .invoke()
            .function_name(name)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(classify)?;

        let blob = output.payload().ok_or_else(|| {
            DeployError::Provider(format!("function '{name}' returned no payload"))
        })?;
        serde_json::from_slice(blob.as_ref())
            .map_err(|e| DeployError::Serialization(e.to_string()))
    }

    async fn add_invoke_permission(
        &self,
        name: &str,
        statement_id: &str,
        source_arn: &str,
    ) -> Result<()> {
        self.client
            .add_permission()
            .function_name(name)
            .statement_id(statement_id)
            .action("lambda:InvokeFunction")
            .principal("apigateway.amazonaws.com")
            .source_arn(source_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn remove_invoke_permission(&self, name: &str, statement_id: &str) -> Result<()> {
        self.client
            .remove_permission()
            .function_name(name)
            .statement_id(statement_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}

fn descriptor_from(configuration: &FunctionConfiguration) -> FunctionDescriptor {
    FunctionDescriptor {
        name: configuration.function_name().unwrap_or_default().to_string(),
        arn: configuration.function_arn().unwrap_or_default().to_string(),
        state: state_from(configuration.state()),
        runtime: configuration.runtime().map(|r| r.as_str().to_string()),
        handler: configuration.handler().map(str::to_string),
        last_modified: configuration.last_modified().map(str::to_string),
    }
}

fn state_from(state: Option<&State>) -> FunctionState {
    match state {
        Some(State::Active) => FunctionState::Active,
        Some(State::Inactive) => FunctionState::Inactive,
        Some(State::Failed) => FunctionState::Failed,
        _ => FunctionState::Pending,
    }
}
