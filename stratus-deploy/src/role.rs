//! Execution role management.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{DeployError, Result};
use crate::provider::RoleApi;

/// Fixed, process-wide execution role name.
pub const EXECUTION_ROLE_NAME: &str = "LambdaExecutionRole";

/// Managed policy granting basic execution (log writing).
pub const EXECUTION_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// Outcome of [`RoleManager::ensure`].
///
/// `newly_created` tells callers whether the identity-propagation grace
/// period applies before first use.
#[derive(Debug, Clone)]
pub struct EnsuredRole {
    pub arn: String,
    pub newly_created: bool,
}

/// Ensures the execution role exists and tears it down.
///
/// The resolved ARN is cached for the lifetime of this instance; the
/// cache is owned here and injected where needed rather than held in
/// module state.
pub struct RoleManager {
    api: Arc<dyn RoleApi>,
    role_name: String,
    cached_arn: RwLock<Option<String>>,
}

impl RoleManager {
    /// Create a manager for the fixed execution role name.
    pub fn new(api: Arc<dyn RoleApi>) -> Self {
        Self::with_role_name(api, EXECUTION_ROLE_NAME)
    }

    /// Create a manager for a custom role name.
    pub fn with_role_name(api: Arc<dyn RoleApi>, role_name: impl Into<String>) -> Self {
        Self {
            api,
            role_name: role_name.into(),
            cached_arn: RwLock::new(None),
        }
    }

    /// The role name this manager owns.
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Return the role ARN, resolving or creating the role on first use.
    ///
    /// Lookup errors other than not-found are fatal. A freshly created
    /// role is eventually consistent across the provider; callers must
    /// honor `newly_created` with a grace period before first use.
    pub async fn ensure(&self) -> Result<EnsuredRole> {
        if let Some(arn) = self.cached_arn.read().clone() {
            return Ok(EnsuredRole {
                arn,
                newly_created: false,
            });
        }

        if let Some(arn) = self.api.get_role(&self.role_name).await? {
            debug!(role = %self.role_name, "execution role already exists");
            *self.cached_arn.write() = Some(arn.clone());
            return Ok(EnsuredRole {
                arn,
                newly_created: false,
            });
        }

        info!(role = %self.role_name, "creating execution role");
        let arn = self
            .api
            .create_role(&self.role_name, &lambda_trust_policy())
            .await?;
        self.api
            .attach_policy(&self.role_name, EXECUTION_POLICY_ARN)
            .await?;
        *self.cached_arn.write() = Some(arn.clone());

        Ok(EnsuredRole {
            arn,
            newly_created: true,
        })
    }

    /// Delete the role, detaching every attached policy first.
    ///
    /// A role that never existed is a silent no-op. The role cannot be
    /// deleted while policies are attached, so detachment failures
    /// propagate.
    pub async fn delete(&self) -> Result<()> {
        if self.api.get_role(&self.role_name).await?.is_none() {
            debug!(role = %self.role_name, "execution role absent, nothing to delete");
            self.cached_arn.write().take();
            return Ok(());
        }

        for policy_arn in self.api.list_attached_policies(&self.role_name).await? {
            self.api.detach_policy(&self.role_name, &policy_arn).await?;
            debug!(role = %self.role_name, policy = %policy_arn, "detached policy");
        }

        match self.api.delete_role(&self.role_name).await {
            Ok(()) => {}
            Err(DeployError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }

        self.cached_arn.write().take();
        info!(role = %self.role_name, "execution role deleted");
        Ok(())
    }
}

/// Trust policy scoped to the Lambda service principal.
fn lambda_trust_policy() -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "lambda.amazonaws.com" },
            "Action": "sts:AssumeRole",
        }],
    })
    .to_string()
}
