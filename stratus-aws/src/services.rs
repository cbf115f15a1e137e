//! AWS service client container.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::{AwsConfig, AwsError, CredentialsSource, Result};

/// Container for the AWS service clients used by the deployment engine.
///
/// Clients are initialized lazily and cached; cloning an SDK client is
/// cheap, so accessors hand out owned clients.
pub struct AwsServices {
    config: AwsConfig,
    sdk_config: aws_config::SdkConfig,

    lambda: RwLock<Option<aws_sdk_lambda::Client>>,
    iam: RwLock<Option<aws_sdk_iam::Client>>,
    api_gateway: RwLock<Option<aws_sdk_apigateway::Client>>,
    s3: RwLock<Option<aws_sdk_s3::Client>>,
}

impl AwsServices {
    /// Create a new AWS services container.
    pub async fn new(config: AwsConfig) -> Result<Arc<Self>> {
        let sdk_config = Self::build_sdk_config(&config).await?;

        info!(region = ?sdk_config.region(), "AWS services initialized");

        Ok(Arc::new(Self {
            config,
            sdk_config,
            lambda: RwLock::new(None),
            iam: RwLock::new(None),
            api_gateway: RwLock::new(None),
            s3: RwLock::new(None),
        }))
    }

    /// Build AWS SDK configuration.
    async fn build_sdk_config(config: &AwsConfig) -> Result<aws_config::SdkConfig> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        match &config.credentials {
            CredentialsSource::Profile(profile) => {
                loader = loader.profile_name(profile);
            }
            CredentialsSource::Explicit {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                if access_key_id.is_empty() || secret_access_key.is_empty() {
                    return Err(AwsError::Credentials(
                        "explicit credentials must not be empty".into(),
                    ));
                }
                let creds = aws_credential_types::Credentials::new(
                    access_key_id,
                    secret_access_key,
                    session_token.clone(),
                    None,
                    "explicit",
                );
                loader = loader.credentials_provider(creds);
            }
            CredentialsSource::Auto => {}
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        Ok(loader.load().await)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AwsConfig {
        &self.config
    }

    /// Get the SDK configuration.
    pub fn sdk_config(&self) -> &aws_config::SdkConfig {
        &self.sdk_config
    }

    /// Get the configured region, if any.
    pub fn region(&self) -> Option<&str> {
        self.sdk_config.region().map(|r| r.as_ref())
    }

    /// Get the configured region or fail.
    ///
    /// Gateway URL construction and bucket placement need a concrete
    /// region, so callers that build those resources use this accessor.
    pub fn require_region(&self) -> Result<&str> {
        self.region().ok_or(AwsError::RegionNotSpecified)
    }

    /// Get the Lambda client.
    pub fn lambda(&self) -> aws_sdk_lambda::Client {
        let mut client = self.lambda.write();
        client
            .get_or_insert_with(|| {
                info!("Lambda client initialized");
                aws_sdk_lambda::Client::new(&self.sdk_config)
            })
            .clone()
    }

    /// Get the IAM client.
    pub fn iam(&self) -> aws_sdk_iam::Client {
        let mut client = self.iam.write();
        client
            .get_or_insert_with(|| {
                info!("IAM client initialized");
                aws_sdk_iam::Client::new(&self.sdk_config)
            })
            .clone()
    }

    /// Get the API Gateway client.
    pub fn api_gateway(&self) -> aws_sdk_apigateway::Client {
        let mut client = self.api_gateway.write();
        client
            .get_or_insert_with(|| {
                info!("API Gateway client initialized");
                aws_sdk_apigateway::Client::new(&self.sdk_config)
            })
            .clone()
    }

    /// Get the S3 client.
    pub fn s3(&self) -> aws_sdk_s3::Client {
        let mut client = self.s3.write();
        client
            .get_or_insert_with(|| {
                let mut config = aws_sdk_s3::config::Builder::from(&self.sdk_config);
                if self.config.endpoint_url.is_some() {
                    config = config.force_path_style(true);
                }
                info!("S3 client initialized");
                aws_sdk_s3::Client::from_conf(config.build())
            })
            .clone()
    }
}
