//! In-memory implementation of `EntityApi` for tests and offline development
//!
//! Behaves like the REST service: it assigns sequential ids, merges partial
//! updates and answers unknown ids with `NotFound`. Failures can be queued to
//! make the next call fail, and every call is logged so tests can assert that
//! an operation did (or did not) reach the collaborator.

use crate::core::entity::{Entity, EntityId};
use crate::core::error::ApiError;
use crate::core::service::EntityApi;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::Duration;

/// A call received by an [`InMemoryEntityApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Get(EntityId),
    Create,
    Update(EntityId),
    Delete(EntityId),
    /// A sub-resource request, identified by its path
    Action(String),
}

struct Inner<T> {
    rows: Vec<T>,
    next_id: i64,
    failures: VecDeque<ApiError>,
    responses: HashMap<String, Value>,
    calls: Vec<ApiCall>,
    latency: Option<Duration>,
}

/// In-memory entity API
///
/// Uses RwLock for thread-safe access; locks are released before any await.
pub struct InMemoryEntityApi<T> {
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T> Clone for InMemoryEntityApi<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Entity> Default for InMemoryEntityApi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> InMemoryEntityApi<T> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Start with existing rows; new ids continue after the highest one
    pub fn with_rows(rows: Vec<T>) -> Self {
        let next_id = rows.iter().map(|r| r.id().get()).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(RwLock::new(Inner {
                rows,
                next_id,
                failures: VecDeque::new(),
                responses: HashMap::new(),
                calls: Vec::new(),
                latency: None,
            })),
        }
    }

    /// Make the next call fail with `error`; queued failures apply in order
    pub fn fail_next(&self, error: ApiError) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failures.push_back(error);
        }
    }

    /// Delay every response, to interleave concurrent operations in tests
    pub fn set_latency(&self, latency: Duration) {
        if let Ok(mut inner) = self.inner.write() {
            inner.latency = Some(latency);
        }
    }

    /// Register the body returned for a sub-resource path
    pub fn respond<R: Serialize>(&self, path: &str, body: &R) -> Result<(), ApiError> {
        let value = serde_json::to_value(body)?;
        self.lock()?.responses.insert(path.to_string(), value);
        Ok(())
    }

    /// Rows currently held, in insertion order
    pub fn rows(&self) -> Vec<T> {
        self.inner
            .read()
            .map(|inner| inner.rows.clone())
            .unwrap_or_default()
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<ApiCall> {
        self.inner
            .read()
            .map(|inner| inner.calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.inner.read().map(|inner| inner.calls.len()).unwrap_or(0)
    }

    /// Answer a sub-resource request from the registered responses
    pub async fn action<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let value = {
            let inner = self.begin(ApiCall::Action(path.to_string())).await?;
            inner.responses.get(path).cloned()
        };
        match value {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(ApiError::NotFound {
                detail: Some(format!("No response registered for {}", path)),
            }),
        }
    }

    /// Compute a read-only answer from the rows after logging `call`
    pub async fn query<R, F>(&self, call: ApiCall, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&[T]) -> R + Send,
    {
        let inner = self.begin(call).await?;
        Ok(f(&inner.rows))
    }

    /// Apply `f` to the row with `id` after logging `call`
    ///
    /// Lets entity-specific operations mutate a row the way the service would.
    pub async fn modify<F>(&self, call: ApiCall, id: EntityId, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut T) + Send,
    {
        let mut inner = self.begin(call).await?;
        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        f(row);
        Ok(row.clone())
    }

    fn lock(&self) -> Result<RwLockWriteGuard<'_, Inner<T>>, ApiError> {
        self.inner
            .write()
            .map_err(|e| ApiError::transport(format!("Failed to acquire write lock: {}", e)))
    }

    /// Wait out the latency, log the call and pop a queued failure
    async fn begin(&self, call: ApiCall) -> Result<RwLockWriteGuard<'_, Inner<T>>, ApiError> {
        let latency = self.lock()?.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.lock()?;
        inner.calls.push(call);
        match inner.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(inner),
        }
    }
}

fn not_found<T: Entity>(id: EntityId) -> ApiError {
    ApiError::NotFound {
        detail: Some(format!(
            "No {} matches the given query (id {}).",
            T::resource_name_singular(),
            id
        )),
    }
}

fn merge(target: &mut Value, patch: Value) {
    if let (Some(target), Value::Object(fields)) = (target.as_object_mut(), patch) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
}

#[async_trait]
impl<T: Entity> EntityApi<T> for InMemoryEntityApi<T> {
    async fn list(&self) -> Result<Vec<T>, ApiError> {
        let inner = self.begin(ApiCall::List).await?;
        Ok(inner.rows.clone())
    }

    async fn get(&self, id: EntityId) -> Result<T, ApiError> {
        let inner = self.begin(ApiCall::Get(id)).await?;
        inner
            .rows
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    async fn create(&self, draft: &T::Draft) -> Result<T, ApiError> {
        let mut body = serde_json::to_value(draft)?;
        let mut inner = self.begin(ApiCall::Create).await?;

        let id = EntityId(inner.next_id);
        merge(&mut body, serde_json::json!({ "id": id }));
        let created: T = serde_json::from_value(body)?;

        inner.next_id += 1;
        inner.rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: EntityId, patch: &T::Patch) -> Result<T, ApiError> {
        let patch = serde_json::to_value(patch)?;
        let mut inner = self.begin(ApiCall::Update(id)).await?;

        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;

        let mut merged = serde_json::to_value(&*row)?;
        merge(&mut merged, patch);
        merge(&mut merged, serde_json::json!({ "id": id }));
        *row = serde_json::from_value(merged)?;
        Ok(row.clone())
    }

    async fn delete(&self, id: EntityId) -> Result<(), ApiError> {
        let mut inner = self.begin(ApiCall::Delete(id)).await?;
        let before = inner.rows.len();
        inner.rows.retain(|r| r.id() != id);
        if inner.rows.len() == before {
            return Err(not_found::<T>(id));
        }
        Ok(())
    }
}
