//! Service record store.
//!
//! The store is the single source of truth for which services exist;
//! the engine never caches service state beyond the current call. The
//! durable persistence format is a collaborator concern - this crate
//! ships the contract and an in-memory implementation.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::types::ServiceRecord;

/// Service record store contract.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Persist a new record.
    async fn add_service(&self, record: ServiceRecord) -> Result<()>;

    /// Fetch a record by id.
    async fn view_service(&self, id: Uuid) -> Result<Option<ServiceRecord>>;

    /// Remove a record by id. Removing an absent record is a no-op.
    async fn delete_service(&self, id: Uuid) -> Result<()>;

    /// All persisted records.
    async fn list_services(&self) -> Result<Vec<ServiceRecord>>;
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryStore {
    services: RwLock<Vec<ServiceRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn add_service(&self, record: ServiceRecord) -> Result<()> {
        self.services.write().push(record);
        Ok(())
    }

    async fn view_service(&self, id: Uuid) -> Result<Option<ServiceRecord>> {
        Ok(self.services.read().iter().find(|s| s.id == id).cloned())
    }

    async fn delete_service(&self, id: Uuid) -> Result<()> {
        self.services.write().retain(|s| s.id != id);
        Ok(())
    }

    async fn list_services(&self) -> Result<Vec<ServiceRecord>> {
        Ok(self.services.read().clone())
    }
}
