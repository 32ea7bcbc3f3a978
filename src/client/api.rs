//! `EntityApi` over HTTP

use super::endpoints;
use super::rest::RestClient;
use crate::core::entity::{Entity, EntityId};
use crate::core::error::ApiError;
use crate::core::service::EntityApi;
use async_trait::async_trait;
use std::marker::PhantomData;

/// REST implementation of [`EntityApi`] for one entity type
///
/// Paths come from `T::resource_name()`: `GET /products/`,
/// `PATCH /products/{id}/`, and so on.
#[derive(Debug)]
pub struct RestEntityApi<T> {
    client: RestClient,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RestEntityApi<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> RestEntityApi<T> {
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub(crate) fn item_action(&self, id: EntityId, action: &str) -> String {
        endpoints::item_action(T::resource_name(), id, action)
    }

    pub(crate) fn collection_action(&self, action: &str) -> String {
        endpoints::collection_action(T::resource_name(), action)
    }
}

#[async_trait]
impl<T: Entity> EntityApi<T> for RestEntityApi<T> {
    async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.client
            .get(&endpoints::collection(T::resource_name()))
            .await
    }

    async fn get(&self, id: EntityId) -> Result<T, ApiError> {
        self.client
            .get(&endpoints::item(T::resource_name(), id))
            .await
    }

    async fn create(&self, draft: &T::Draft) -> Result<T, ApiError> {
        self.client
            .post(&endpoints::collection(T::resource_name()), draft)
            .await
    }

    async fn update(&self, id: EntityId, patch: &T::Patch) -> Result<T, ApiError> {
        self.client
            .patch(&endpoints::item(T::resource_name(), id), patch)
            .await
    }

    async fn delete(&self, id: EntityId) -> Result<(), ApiError> {
        self.client
            .delete(&endpoints::item(T::resource_name(), id))
            .await
    }
}
