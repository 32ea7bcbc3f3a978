//! Read-only panels showing data related to one row (histories)

use crate::core::entity::EntityId;
use crate::core::error::ApiError;
use crate::entities::customer::{CustomerPurchaseHistory, CustomerStore};
use crate::entities::product::{ProductPriceHistory, ProductStore};
use crate::store::PanelContent;
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

/// Something that fetches data keyed by a row's id into a detail slot
#[async_trait]
pub trait RelatedSource: Send + Sync {
    type Data: Clone + Send + Sync + 'static;

    async fn load(&self, id: EntityId) -> Result<Self::Data, ApiError>;

    fn content(&self) -> PanelContent<Self::Data>;

    fn clear(&self);
}

#[async_trait]
impl RelatedSource for CustomerStore {
    type Data = CustomerPurchaseHistory;

    async fn load(&self, id: EntityId) -> Result<Self::Data, ApiError> {
        self.fetch_purchase_history(id).await
    }

    fn content(&self) -> PanelContent<Self::Data> {
        self.purchase_history_panel()
    }

    fn clear(&self) {
        self.purchase_history().clear();
    }
}

#[async_trait]
impl RelatedSource for ProductStore {
    type Data = ProductPriceHistory;

    async fn load(&self, id: EntityId) -> Result<Self::Data, ApiError> {
        self.fetch_price_history(id).await
    }

    fn content(&self) -> PanelContent<Self::Data> {
        self.price_history_panel()
    }

    fn clear(&self) {
        self.price_history().clear();
    }
}

/// A side panel bound to one subject at a time
///
/// Opening it for another subject replaces the previous one. The panel reads
/// `Loading` until the fetch lands, then the data or the empty state.
pub struct RelatedPanel<S> {
    source: S,
    subject: Arc<RwLock<Option<EntityId>>>,
}

impl<S: Clone> Clone for RelatedPanel<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            subject: self.subject.clone(),
        }
    }
}

impl<S: RelatedSource> RelatedPanel<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            subject: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn open(&self, id: EntityId) -> Result<S::Data, ApiError> {
        *self.subject.write().unwrap_or_else(PoisonError::into_inner) = Some(id);
        self.source.load(id).await
    }

    pub fn close(&self) {
        *self.subject.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.source.clear();
    }

    pub fn subject(&self) -> Option<EntityId> {
        *self.subject.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// What to render, or `None` while the panel is closed
    pub fn content(&self) -> Option<PanelContent<S::Data>> {
        self.subject().map(|_| self.source.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::NotificationBus;
    use crate::entities::customer::{Customer, CustomerDraft, PurchaseTransaction};
    use crate::storage::InMemoryEntityApi;
    use std::time::Duration;

    fn ada() -> Customer {
        Customer::from_draft(
            EntityId(1),
            CustomerDraft {
                name: "Ada".to_string(),
                phone: "1".to_string(),
                address: "x".to_string(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_panel_shows_loading_then_empty() {
        let api = InMemoryEntityApi::with_rows(vec![ada()]);
        api.respond("/customers/1/purchase_history/", &Vec::<PurchaseTransaction>::new())
            .unwrap();
        api.set_latency(Duration::from_millis(50));
        let store = CustomerStore::new(Arc::new(api), NotificationBus::default());
        let panel = RelatedPanel::new(store);
        assert_eq!(panel.content(), None);

        let pending = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.open(EntityId(1)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(panel.content(), Some(PanelContent::Loading));

        pending.await.unwrap().unwrap();
        assert_eq!(panel.content(), Some(PanelContent::Empty));
        assert_eq!(panel.subject(), Some(EntityId(1)));

        panel.close();
        assert_eq!(panel.content(), None);
    }
}
