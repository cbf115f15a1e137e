//! Function provisioning: create-or-update with readiness polling.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::archive::Archiver;
use crate::error::{DeployError, Result};
use crate::provider::{CreateFunction, FunctionApi};
use crate::role::RoleManager;
use crate::types::{FunctionDescriptor, FunctionSpec, FunctionState};

/// Execution timeout applied when updating a function's environment.
pub const FUNCTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Grace period after creating a fresh execution role; identity
/// propagation across the provider is eventually consistent.
pub const ROLE_PROPAGATION_DELAY: Duration = Duration::from_secs(10);

/// Readiness polling settings: a wall-clock deadline and a fixed sleep
/// between probes. Defined in time units, not attempt counts.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub max_wait: Duration,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(60),
            interval: Duration::from_secs(5),
        }
    }
}

/// Creates, updates, deletes, and invokes functions.
pub struct FunctionProvisioner {
    api: Arc<dyn FunctionApi>,
    roles: Arc<RoleManager>,
    archiver: Archiver,
    poll: PollSettings,
    role_propagation_delay: Duration,
}

impl FunctionProvisioner {
    /// Create a provisioner with default polling and grace settings.
    pub fn new(api: Arc<dyn FunctionApi>, roles: Arc<RoleManager>) -> Self {
        Self {
            api,
            roles,
            archiver: Archiver::new(),
            poll: PollSettings::default(),
            role_propagation_delay: ROLE_PROPAGATION_DELAY,
        }
    }

    /// Override the polling settings.
    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Override the role propagation grace period.
    pub fn with_role_propagation_delay(mut self, delay: Duration) -> Self {
        self.role_propagation_delay = delay;
        self
    }

    /// Whether a function with this name exists. Not-found is `false`;
    /// any other probe error is fatal.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.api.get_function(name).await?.is_some())
    }

    /// Create the function, or update its code (and environment, when
    /// one is supplied) if it already exists, then wait until it is
    /// active and return the provider's descriptor.
    pub async fn create_or_update(&self, spec: &FunctionSpec) -> Result<FunctionDescriptor> {
        let role = self.roles.ensure().await?;
        if role.newly_created {
            debug!(delay = ?self.role_propagation_delay, "waiting for role propagation");
            sleep(self.role_propagation_delay).await;
        }

        let archive = self.archiver.pack(&spec.code)?;

        if self.exists(&spec.name).await? {
            info!(function = %spec.name, "function exists, updating code");
            self.api.update_function_code(&spec.name, archive).await?;

            if !spec.environment.is_empty() {
                debug!(function = %spec.name, "updating environment");
                self.api
                    .update_function_environment(&spec.name, &spec.environment, FUNCTION_TIMEOUT)
                    .await?;
            }
        } else {
            info!(function = %spec.name, runtime = %spec.runtime, "creating function");
            self.api
                .create_function(CreateFunction {
                    name: spec.name.clone(),
                    handler: spec.handler.clone(),
                    runtime: spec.runtime.clone(),
                    role_arn: role.arn,
                    environment: spec.environment.clone(),
                    archive,
                })
                .await?;
        }

        self.wait_active(&spec.name).await?;

        self.api.get_function(&spec.name).await?.ok_or_else(|| {
            DeployError::NotFound(format!(
                "function '{}' disappeared after provisioning",
                spec.name
            ))
        })
    }

    /// Poll until the function reports active.
    ///
    /// Transient probe errors are logged and retried; only the wall-clock
    /// deadline ends the loop, with a timeout error distinct from other
    /// provider failures.
    pub async fn wait_active(&self, name: &str) -> Result<()> {
        let deadline = Instant::now() + self.poll.max_wait;

        loop {
            match self.api.get_function(name).await {
                Ok(Some(function)) if function.state == FunctionState::Active => {
                    info!(function = %name, "function is active");
                    return Ok(());
                }
                Ok(Some(function)) => {
                    debug!(function = %name, state = ?function.state, "function not active yet");
                }
                Ok(None) => {
                    debug!(function = %name, "function not visible yet");
                }
                Err(err) => {
                    warn!(function = %name, error = %err, "error checking function state");
                }
            }

            if Instant::now() >= deadline {
                return Err(DeployError::ActivationTimeout {
                    name: name.to_string(),
                    waited: self.poll.max_wait,
                });
            }

            sleep(self.poll.interval).await;
        }
    }

    /// Delete the function; absent functions are a no-op.
    pub async fn delete(&self, name: &str) -> Result<()> {
        if !self.exists(name).await? {
            debug!(function = %name, "function absent, skipping deletion");
            return Ok(());
        }

        self.api.delete_function(name).await?;
        info!(function = %name, "function deleted");
        Ok(())
    }

    /// Invoke the function synchronously. Smoke-test helper, not part of
    /// the provisioning chain.
    pub async fn invoke(&self, name: &str, payload: serde_json::Value) -> Result<serde_json::Value> {
        self.api.invoke(name, payload).await
    }
}
