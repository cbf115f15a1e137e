//! Companion bucket provisioning.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{DeployError, Result};
use crate::provider::BucketApi;

/// Creates and deletes the storage bucket paired with a function.
pub struct BucketProvisioner {
    api: Arc<dyn BucketApi>,
}

impl BucketProvisioner {
    /// Create a bucket provisioner.
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }

    /// Create the bucket and apply a permissive CORS configuration.
    /// A bucket that already exists is reused.
    pub async fn create(&self, name: &str) -> Result<()> {
        match self.api.create_bucket(name).await {
            Ok(()) => info!(bucket = %name, "bucket created"),
            Err(DeployError::Conflict(_)) => {
                debug!(bucket = %name, "bucket already exists");
            }
            Err(err) => return Err(err),
        }

        self.api.put_bucket_cors(name).await
    }

    /// Delete the bucket, emptying it first. The bucket cannot be
    /// deleted while objects remain. Absent buckets are a no-op.
    pub async fn delete(&self, name: &str) -> Result<()> {
        match self.empty(name).await {
            Ok(()) => {}
            Err(DeployError::NotFound(_)) => {
                debug!(bucket = %name, "bucket absent, nothing to delete");
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        match self.api.delete_bucket(name).await {
            Ok(()) => {
                info!(bucket = %name, "bucket deleted");
                Ok(())
            }
            Err(DeployError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Delete every object in the bucket, page by page.
    async fn empty(&self, name: &str) -> Result<()> {
        let mut continuation = None;

        loop {
            let (keys, next) = self.api.list_object_keys(name, continuation).await?;
            if !keys.is_empty() {
                debug!(bucket = %name, count = keys.len(), "deleting objects");
                self.api.delete_objects(name, keys).await?;
            }
            match next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        Ok(())
    }
}
