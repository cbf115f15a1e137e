//! IAM-backed execution identity operations.

use async_trait::async_trait;

use stratus_aws::AwsServices;
use stratus_aws::aws_sdk_iam::Client;

use super::classify;
use crate::error::{DeployError, Result};
use crate::provider::RoleApi;

/// IAM implementation of [`RoleApi`].
pub struct AwsRoleApi {
    client: Client,
}

impl AwsRoleApi {
    /// Create from the shared client container.
    pub fn new(services: &AwsServices) -> Self {
        Self {
            client: services.iam(),
        }
    }
}

#[async_trait]
impl RoleApi for AwsRoleApi {
    async fn get_role(&self, name: &str) -> Result<Option<String>> {
        match self.client.get_role().role_name(name).send().await {
            Ok(output) => {
                let role = output.role().ok_or_else(|| {
                    DeployError::Provider(format!("role '{name}' lookup returned no role"))
                })?;
                Ok(Some(role.arn().to_string()))
            }
            Err(err) => match classify(err) {
                DeployError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<String> {
        let output = self
            .client
            .create_role()
            .role_name(name)
            .assume_role_policy_document(trust_policy)
            .send()
            .await
            .map_err(classify)?;

        let role = output.role().ok_or_else(|| {
            DeployError::Provider(format!("role '{name}' creation returned no role"))
        })?;
        Ok(role.arn().to_string())
    }

    async fn attach_policy(&self, name: &str, policy_arn: &str) -> Result<()> {
        self.client
            .attach_role_policy()
            .role_name(name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_attached_policies(&self, name: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .list_attached_role_policies()
            .role_name(name)
            .send()
            .await
            .map_err(classify)?;

        Ok(output
            .attached_policies()
            .iter()
            .filter_map(|policy| policy.policy_arn().map(str::to_string))
            .collect())
    }

    async fn detach_policy(&self, name: &str, policy_arn: &str) -> Result<()> {
        self.client
            .detach_role_policy()
            .role_name(name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete_role(&self, name: &str) -> Result<()> {
        self.client
            .delete_role()
            .role_name(name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}
