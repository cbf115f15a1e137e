//! API Gateway-backed REST operations.

use async_trait::async_trait;

use stratus_aws::aws_sdk_apigateway::Client;
use stratus_aws::aws_sdk_apigateway::types::{
    ContentHandlingStrategy, EndpointConfiguration, EndpointType, IntegrationType,
};
use stratus_aws::AwsServices;

use super::classify;
use crate::error::{DeployError, Result};
use crate::provider::GatewayApi;

/// API Gateway implementation of [`GatewayApi`].
pub struct AwsGatewayApi {
    client: Client,
    region: String,
}

impl AwsGatewayApi {
    /// Create from the shared client container. Needs a concrete region
    /// to compose integration URIs.
    pub fn new(services: &AwsServices) -> Result<Self> {
        let region = services.require_region()?.to_string();
        Ok(Self {
            client: services.api_gateway(),
            region,
        })
    }
}

#[async_trait]
impl GatewayApi for AwsGatewayApi {
    async fn find_rest_api(&self, name: &str) -> Result<Option<String>> {
        let mut pages = self.client.get_rest_apis().into_paginator().send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(classify)?;
            for api in page.items() {
                if api.name() == Some(name) {
                    if let Some(id) = api.id() {
                        return Ok(Some(id.to_string()));
                    }
                }
            }
        }

        Ok(None)
    }

    async fn create_rest_api(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .create_rest_api()
            .name(name)
            .binary_media_types("*/*")
            .endpoint_configuration(
                EndpointConfiguration::builder()
                    .types(EndpointType::Regional)
                    .build(),
            )
            .send()
            .await
            .map_err(classify)?;

        output
            .id()
            .map(str::to_string)
            .ok_or_else(|| DeployError::Provider("REST API created without an id".to_string()))
    }

    async fn root_resource(&self, api_id: &str) -> Result<String> {
        let output = self
            .client
            .get_resources()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(classify)?;

        let items = output.items();
        items
            .iter()
            .find(|resource| resource.path() == Some("/"))
            .or_else(|| items.first())
            .and_then(|resource| resource.id())
            .map(str::to_string)
            .ok_or_else(|| {
                DeployError::NotFound(format!("root resource missing for API '{api_id}'"))
            })
    }

    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        let output = self
            .client
            .create_resource()
            .rest_api_id(api_id)
            .parent_id(parent_id)
            .path_part(path_part)
            .send()
            .await
            .map_err(classify)?;

        output
            .id()
            .map(str::to_string)
            .ok_or_else(|| DeployError::Provider("resource created without an id".to_string()))
    }

    async fn find_resource(&self, api_id: &str, path: &str) -> Result<Option<String>> {
        let output = self
            .client
            .get_resources()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(classify)?;

        Ok(output
            .items()
            .iter()
            .find(|resource| resource.path() == Some(path))
            .and_then(|resource| resource.id())
            .map(str::to_string))
    }

    async fn put_method(&self, api_id: &str, resource_id: &str, http_method: &str) -> Result<()> {
        self.client
            .put_method()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .authorization_type("NONE")
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        function_arn: &str,
    ) -> Result<()> {
        let uri = format!(
            "arn:aws:apigateway:{}:lambda:path/2015-03-31/functions/{function_arn}/invocations",
            self.region
        );

        self.client
            .put_integration()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .r#type(IntegrationType::AwsProxy)
            .integration_http_method("POST")
            .uri(uri)
            .content_handling(ContentHandlingStrategy::ConvertToBinary)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<()> {
        self.client
            .put_method_response()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .status_code("200")
            .response_models("application/json", "Empty")
            .response_parameters("method.response.header.Access-Control-Allow-Headers", true)
            .response_parameters("method.response.header.Access-Control-Allow-Methods", true)
            .response_parameters("method.response.header.Access-Control-Allow-Origin", true)
            .response_parameters("method.response.header.Content-Type", true)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<()> {
        self.client
            .put_integration_response()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .status_code("200")
            .response_templates("application/json", "")
            .response_parameters(
                "method.response.header.Access-Control-Allow-Headers",
                "'Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token'",
            )
            .response_parameters(
                "method.response.header.Access-Control-Allow-Methods",
                "'GET,OPTIONS,POST,PUT,DELETE'",
            )
            .response_parameters("method.response.header.Access-Control-Allow-Origin", "'*'")
            .response_parameters(
                "method.response.header.Content-Type",
                "integration.response.header.Content-Type",
            )
            .content_handling(ContentHandlingStrategy::ConvertToBinary)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<()> {
        self.client
            .create_deployment()
            .rest_api_id(api_id)
            .stage_name(stage)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<()> {
        self.client
            .delete_rest_api()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}
