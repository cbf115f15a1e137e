//! S3-backed bucket operations.

use async_trait::async_trait;

use stratus_aws::AwsServices;
use stratus_aws::aws_sdk_s3::Client;
use stratus_aws::aws_sdk_s3::types::{
    BucketLocationConstraint, CorsConfiguration, CorsRule, CreateBucketConfiguration, Delete,
    ObjectIdentifier,
};

use super::classify;
use crate::error::{DeployError, Result};
use crate::provider::BucketApi;

/// S3 implementation of [`BucketApi`].
pub struct AwsBucketApi {
    client: Client,
    region: String,
}

impl AwsBucketApi {
    /// Create from the shared client container. Needs a concrete region
    /// for bucket placement.
    pub fn new(services: &AwsServices) -> Result<Self> {
        let region = services.require_region()?.to_string();
        Ok(Self {
            client: services.s3(),
            region,
        })
    }
}

#[async_trait]
impl BucketApi for AwsBucketApi {
    async fn create_bucket(&self, name: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(name);

        // us-east-1 is the one region that must not carry a location
        // constraint.
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request.send().await.map_err(classify)?;
        Ok(())
    }

    async fn put_bucket_cors(&self, name: &str) -> Result<()> {
        let rule = CorsRule::builder()
            .allowed_headers("*")
            .allowed_methods("GET")
            .allowed_methods("PUT")
            .allowed_methods("POST")
            .allowed_methods("DELETE")
            .allowed_methods("HEAD")
            .allowed_origins("*")
            .build()
            .map_err(|e| DeployError::Provider(e.to_string()))?;
        let configuration = CorsConfiguration::builder()
            .cors_rules(rule)
            .build()
            .map_err(|e| DeployError::Provider(e.to_string()))?;

        self.client
            .put_bucket_cors()
            .bucket(name)
            .cors_configuration(configuration)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_object_keys(
        &self,
        name: &str,
        continuation: Option<String>,
    ) -> Result<(Vec<String>, Option<String>)> {
        let mut request = self.client.list_objects_v2().bucket(name);
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }

        let output = request.send().await.map_err(classify)?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();
        let next = if output.is_truncated() == Some(true) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok((keys, next))
    }

    async fn delete_objects(&self, name: &str, keys: Vec<String>) -> Result<()> {
        let objects = keys
            .into_iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DeployError::Provider(e.to_string()))?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| DeployError::Provider(e.to_string()))?;

        self.client
            .delete_objects()
            .bucket(name)
            .delete(delete)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}
