//! Service trait for the remote entity collaborator

use crate::core::entity::{Entity, EntityId};
use crate::core::error::ApiError;
use async_trait::async_trait;

/// CRUD access to one entity type on the REST service
///
/// Implementations only move data; they hold no entity state. The stores are
/// agnostic to whether the calls go over HTTP or stay in-process.
#[async_trait]
pub trait EntityApi<T: Entity>: Send + Sync {
    /// List all entities, in server order
    async fn list(&self) -> Result<Vec<T>, ApiError>;

    /// Get an entity by ID
    async fn get(&self, id: EntityId) -> Result<T, ApiError>;

    /// Create an entity; the server assigns the id and computed fields
    async fn create(&self, draft: &T::Draft) -> Result<T, ApiError>;

    /// Apply a partial update and return the server's new version
    async fn update(&self, id: EntityId, patch: &T::Patch) -> Result<T, ApiError>;

    /// Delete an entity
    async fn delete(&self, id: EntityId) -> Result<(), ApiError>;
}
