//! Entity stores: the single owner of each entity type's client-side state
//!
//! An [`EntityStore`] holds the ordered collection, the `current` record, the
//! loading flag and the last error for one entity type. Every operation
//! clears the previous error, calls the [`EntityApi`], and on success updates
//! the collection in place from the server's response. On failure the
//! collection is left untouched, the error slot receives the server's
//! `detail` (or a fixed fallback) and an error notification is published.
//!
//! ```text
//! list()    -> collection replaced
//! get(id)   -> current set, collection untouched
//! create()  -> appended, becomes current
//! update()  -> row with id replaced, current refreshed if it matched
//! delete()  -> row with id removed, current cleared if it matched
//! ```
//!
//! State sits behind a lock that is never held across an `.await`, so
//! concurrent operations interleave and the last response to land wins.

pub mod collection;
pub mod detail;
pub mod flag;

pub use collection::EntityCollection;
pub use detail::{DetailSlot, PanelContent};
pub use flag::{LoadingFlag, LoadingGuard};

use crate::core::entity::{Entity, EntityId};
use crate::core::error::ApiError;
use crate::core::events::{Notification, NotificationBus};
use crate::core::service::EntityApi;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

#[derive(Debug)]
struct StoreState<T> {
    collection: EntityCollection<T>,
    current: Option<T>,
    error: Option<String>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            collection: EntityCollection::default(),
            current: None,
            error: None,
        }
    }
}

/// Point-in-time copy of a store's state, for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<T> {
    pub items: Vec<T>,
    pub current: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Client-side state and CRUD operations for one entity type
///
/// `A` is the collaborator; it defaults to a plain `dyn EntityApi<T>` and is
/// narrowed to an extension trait object (e.g. `dyn ProductApi`) by stores
/// that also run entity-specific operations.
pub struct EntityStore<T, A: ?Sized = dyn EntityApi<T>> {
    api: Arc<A>,
    state: Arc<RwLock<StoreState<T>>>,
    loading: LoadingFlag,
    notifications: NotificationBus,
}

impl<T, A: ?Sized> Clone for EntityStore<T, A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
            loading: self.loading.clone(),
            notifications: self.notifications.clone(),
        }
    }
}

impl<T, A> EntityStore<T, A>
where
    T: Entity,
    A: EntityApi<T> + ?Sized,
{
    pub fn new(api: Arc<A>, notifications: NotificationBus) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(StoreState::default())),
            loading: LoadingFlag::new(),
            notifications,
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }

    // === Reads ===

    /// All rows, in server order
    pub fn items(&self) -> Vec<T> {
        self.read(|s| s.collection.to_vec())
    }

    pub fn find(&self, id: EntityId) -> Option<T> {
        self.read(|s| s.collection.get(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.collection.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn current(&self) -> Option<T> {
        self.read(|s| s.current.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.read(|s| s.error.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn snapshot(&self) -> StoreSnapshot<T> {
        let is_loading = self.is_loading();
        self.read(|s| StoreSnapshot {
            items: s.collection.to_vec(),
            current: s.current.clone(),
            is_loading,
            error: s.error.clone(),
        })
    }

    // === CRUD ===

    /// Fetch every row and replace the collection
    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        let _loading = self.loading.raise();
        self.clear_error();
        debug!(entity = T::resource_name(), "fetching list");

        match self.api.list().await {
            Ok(items) => {
                self.write(|s| s.collection.replace_all(items.clone()));
                Ok(items)
            }
            Err(e) => Err(self.fail(e, format!("Failed to fetch {}", T::plural_label()))),
        }
    }

    /// Fetch one row into `current`; the collection is untouched
    pub async fn get(&self, id: EntityId) -> Result<T, ApiError> {
        let _loading = self.loading.raise();
        self.clear_error();
        debug!(entity = T::resource_name(), %id, "fetching one");

        match self.api.get(id).await {
            Ok(entity) => {
                self.write(|s| s.current = Some(entity.clone()));
                Ok(entity)
            }
            Err(e) => Err(self.fail(e, format!("Failed to fetch {}", singular_label::<T>()))),
        }
    }

    /// Create a row; the server's version is appended and becomes `current`
    pub async fn create(&self, draft: &T::Draft) -> Result<T, ApiError> {
        let _loading = self.loading.raise();
        self.clear_error();
        debug!(entity = T::resource_name(), "creating");

        match self.api.create(draft).await {
            Ok(created) => {
                self.write(|s| {
                    s.collection.push(created.clone());
                    s.current = Some(created.clone());
                });
                self.notify_success(format!("{} created successfully!", T::display_name()));
                Ok(created)
            }
            Err(e) => Err(self.fail(e, format!("Failed to create {}", singular_label::<T>()))),
        }
    }

    /// Send a partial update; the row with `id` is replaced by the response
    pub async fn update(&self, id: EntityId, patch: &T::Patch) -> Result<T, ApiError> {
        let _loading = self.loading.raise();
        self.clear_error();
        debug!(entity = T::resource_name(), %id, "updating");

        match self.api.update(id, patch).await {
            Ok(updated) => {
                self.accept(id, updated.clone());
                self.notify_success(format!("{} updated successfully!", T::display_name()));
                Ok(updated)
            }
            Err(e) => Err(self.fail(e, format!("Failed to update {}", singular_label::<T>()))),
        }
    }

    /// Delete a row; `current` is cleared if it was that row
    pub async fn delete(&self, id: EntityId) -> Result<(), ApiError> {
        let _loading = self.loading.raise();
        self.clear_error();
        debug!(entity = T::resource_name(), %id, "deleting");

        match self.api.delete(id).await {
            Ok(()) => {
                self.write(|s| {
                    s.collection.remove(id);
                    if s.current.as_ref().is_some_and(|c| c.id() == id) {
                        s.current = None;
                    }
                });
                self.notify_success(format!("{} deleted successfully!", T::display_name()));
                Ok(())
            }
            Err(e) => Err(self.fail(e, format!("Failed to delete {}", singular_label::<T>()))),
        }
    }

    // === Entity-specific operations ===

    /// Run a side operation under the store's error contract
    ///
    /// The error slot is cleared first; a failure is recorded with `fallback`
    /// and notified. Neither the collection nor the main loading flag is
    /// touched.
    pub async fn perform<R, Fut>(&self, fallback: &str, operation: Fut) -> Result<R, ApiError>
    where
        Fut: Future<Output = Result<R, ApiError>>,
    {
        self.clear_error();
        operation
            .await
            .map_err(|e| self.fail(e, fallback.to_string()))
    }

    /// Fetch into a detail slot, raising the slot's own loading flag
    pub async fn load_detail<D, Fut>(
        &self,
        slot: &DetailSlot<D>,
        fallback: &str,
        operation: Fut,
    ) -> Result<D, ApiError>
    where
        D: Clone,
        Fut: Future<Output = Result<D, ApiError>>,
    {
        let _loading = slot.loading_flag().raise();
        let data = self.perform(fallback, operation).await?;
        slot.set(data.clone());
        Ok(data)
    }

    /// Merge a server-returned version of row `id` into the state
    ///
    /// Rows not in the collection are not added; `current` follows if it
    /// holds the same id.
    pub fn accept(&self, id: EntityId, entity: T) {
        self.write(|s| {
            s.collection.replace(entity.clone());
            if s.current.as_ref().is_some_and(|c| c.id() == id) {
                s.current = Some(entity);
            }
        });
    }

    pub fn notify_success(&self, message: impl Into<String>) {
        self.notifications
            .publish(Notification::success(T::resource_name(), message));
    }

    // === Housekeeping ===

    pub fn clear_error(&self) {
        self.write(|s| s.error = None);
    }

    /// Drop every row, `current`, the error and the loading flag
    pub fn reset(&self) {
        self.write(|s| *s = StoreState::default());
        self.loading.reset();
    }

    fn fail(&self, error: ApiError, fallback: String) -> ApiError {
        let message = error.user_message(&fallback);
        warn!(
            entity = T::resource_name(),
            code = error.error_code(),
            error = %error,
            "operation failed"
        );
        self.write(|s| s.error = Some(message.clone()));
        self.notifications
            .publish(Notification::error(T::resource_name(), message));
        error
    }

    fn read<R>(&self, f: impl FnOnce(&StoreState<T>) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreState<T>) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }
}

fn singular_label<T: Entity>() -> String {
    T::display_name().to_lowercase()
}
