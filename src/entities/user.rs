//! Back-office user accounts
//!
//! Besides CRUD on `/users/`, `GET /users/self/` returns the account the
//! current tokens belong to.

use crate::client::RestEntityApi;
use crate::client::endpoints;
use crate::core::entity::{Entity, EntityId};
use crate::core::error::ApiError;
use crate::core::events::NotificationBus;
use crate::core::service::EntityApi;
use crate::core::validation::filters::trim;
use crate::core::validation::validators::{email, message, required};
use crate::core::validation::{FormData, FormSchema};
use crate::storage::InMemoryEntityApi;
use crate::store::{DetailSlot, EntityStore};
use async_trait::async_trait;
use std::sync::Arc;

crate::impl_entity!(
    User,
    "user",
    "User",
    draft: UserDraft,
    patch: UserPatch,
    {
        username: String,
        email: String,
        role: String,
    }
);

impl FormData for UserDraft {
    fn schema() -> FormSchema {
        FormSchema::new()
            .filter("username", trim())
            .filter("email", trim())
            .filter("role", trim())
            .validate("username", message("Username is required", required()))
            .validate("email", message("Email is required", required()))
            .validate("email", message("Invalid email address", email()))
            .validate("role", message("Role is required", required()))
    }
}

/// User endpoints beyond CRUD
#[async_trait]
pub trait UserApi: EntityApi<User> {
    async fn current_user(&self) -> Result<User, ApiError>;
}

#[async_trait]
impl UserApi for RestEntityApi<User> {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.client().get(&self.collection_action("self")).await
    }
}

#[async_trait]
impl UserApi for InMemoryEntityApi<User> {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.action(&endpoints::collection_action(User::resource_name(), "self"))
            .await
    }
}

/// User state: the generic store plus the signed-in account
#[derive(Clone)]
pub struct UserStore {
    store: EntityStore<User, dyn UserApi>,
    account: DetailSlot<User>,
}

impl UserStore {
    pub fn new(api: Arc<dyn UserApi>, notifications: NotificationBus) -> Self {
        Self {
            store: EntityStore::new(api, notifications),
            account: DetailSlot::new(),
        }
    }

    pub fn entities(&self) -> &EntityStore<User, dyn UserApi> {
        &self.store
    }

    pub fn account(&self) -> &DetailSlot<User> {
        &self.account
    }

    pub async fn fetch_account(&self) -> Result<User, ApiError> {
        let api = self.store.api().clone();
        self.store
            .load_detail(&self.account, "Failed to fetch user", async move {
                api.current_user().await
            })
            .await
    }

    /// Delete a user; returns `true` when it was the signed-in account,
    /// whose session the caller must then end
    pub async fn delete(&self, id: EntityId) -> Result<bool, ApiError> {
        self.store.delete(id).await?;
        let own = self.account.get().is_some_and(|account| account.id == id);
        if own {
            self.account.clear();
        }
        Ok(own)
    }

    pub fn reset(&self) {
        self.store.reset();
        self.account.clear();
    }
}
