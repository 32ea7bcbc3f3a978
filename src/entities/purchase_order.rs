//! Purchase orders placed with suppliers
//!
//! Decimal columns (quantities, prices, totals) travel as strings, exactly as
//! the service serializes them. Line and order totals are derived client-side
//! while the form is edited; the service recomputes them on save.

use crate::client::RestEntityApi;
use crate::client::endpoints;
use crate::core::entity::{Entity, EntityId};
use crate::core::error::ApiError;
use crate::core::events::NotificationBus;
use crate::core::service::EntityApi;
use crate::core::validation::filters::{fixed_decimals, trim};
use crate::core::validation::validators::{date, in_list, message, min_items, min_value, required};
use crate::core::validation::{FormData, FormSchema};
use crate::storage::{ApiCall, InMemoryEntityApi};
use crate::store::EntityStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

crate::impl_entity!(
    PurchaseOrder,
    "purchase_order",
    "Purchase order",
    path: "purchase_orders",
    draft: PurchaseOrderDraft,
    patch: PurchaseOrderPatch,
    {
        supplier: EntityId,
        order_date: String,
        #[serde(default)]
        status: PurchaseOrderStatus,
        #[serde(default)]
        total_amount: String,
        #[serde(default)]
        notes: String,
        #[serde(default)]
        items: Vec<OrderItem>,
    },
    computed {
        supplier_name: String,
    }
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    #[default]
    Pending,
    Completed,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "Pending",
            PurchaseOrderStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product line of an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub product: EntityId,
    #[serde(default)]
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    #[serde(default)]
    pub received_quantity: String,
    #[serde(default)]
    pub total_price: String,
}

impl OrderItem {
    /// A blank line as the form adds it
    pub fn blank() -> Self {
        Self {
            quantity: "1".to_string(),
            unit_price: "0".to_string(),
            received_quantity: "0".to_string(),
            ..Default::default()
        }
    }

    /// `quantity × unit_price`; unparseable inputs count as zero
    pub fn line_total(&self) -> f64 {
        lenient(&self.quantity) * lenient(&self.unit_price)
    }
}

fn lenient(value: &str) -> f64 {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0)
}

impl PurchaseOrder {
    pub fn is_completed(&self) -> bool {
        self.status == PurchaseOrderStatus::Completed
    }
}

impl PurchaseOrderDraft {
    /// Rewrite every line total and the order total from quantities and prices
    pub fn recalculate(&mut self) {
        for item in &mut self.items {
            item.total_price = format!("{:.2}", item.line_total());
        }
        let total: f64 = self.items.iter().map(|item| lenient(&item.total_price)).sum();
        self.total_amount = format!("{:.2}", total);
    }

    pub fn add_item(&mut self) {
        self.items.push(OrderItem::blank());
        self.recalculate();
    }

    pub fn remove_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
            self.recalculate();
        }
    }
}

impl FormData for PurchaseOrderDraft {
    fn schema() -> FormSchema {
        let item = FormSchema::new()
            .filter("quantity", trim())
            .filter("unit_price", trim())
            .validate("product", message("Product is required", min_value(1.0)))
            .validate("quantity", message("Quantity is required", required()))
            .validate("unit_price", message("Unit price is required", required()));

        FormSchema::new()
            .filter("notes", trim())
            .filter("total_amount", fixed_decimals(2))
            .validate("supplier", message("Supplier is required", min_value(1.0)))
            .validate("order_date", message("Invalid date", date()))
            .validate(
                "status",
                in_list(vec![
                    PurchaseOrderStatus::Pending.to_string(),
                    PurchaseOrderStatus::Completed.to_string(),
                ]),
            )
            .validate("items", message("At least one item is required", min_items(1)))
            .each("items", item)
    }

    /// Today's date, pending, with one blank line
    fn initial() -> Self {
        let mut draft = Self {
            order_date: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
            status: PurchaseOrderStatus::Pending,
            items: vec![OrderItem::blank()],
            ..Default::default()
        };
        draft.recalculate();
        draft
    }

    fn recompute(&mut self) {
        self.recalculate();
    }
}

// =============================================================================
// Collaborator
// =============================================================================

/// Purchase order endpoints beyond CRUD
#[async_trait]
pub trait PurchaseOrderApi: EntityApi<PurchaseOrder> {
    /// Mark an order as received; the service books the stock
    async fn complete(&self, id: EntityId) -> Result<PurchaseOrder, ApiError>;
}

#[async_trait]
impl PurchaseOrderApi for RestEntityApi<PurchaseOrder> {
    async fn complete(&self, id: EntityId) -> Result<PurchaseOrder, ApiError> {
        self.client()
            .post(&self.item_action(id, "complete"), &serde_json::json!({}))
            .await
    }
}

#[async_trait]
impl PurchaseOrderApi for InMemoryEntityApi<PurchaseOrder> {
    async fn complete(&self, id: EntityId) -> Result<PurchaseOrder, ApiError> {
        let path = endpoints::item_action(PurchaseOrder::resource_name(), id, "complete");
        self.modify(ApiCall::Action(path), id, |order| {
            order.status = PurchaseOrderStatus::Completed;
            for item in &mut order.items {
                item.received_quantity = item.quantity.clone();
            }
        })
        .await
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Clone)]
pub struct PurchaseOrderStore {
    store: EntityStore<PurchaseOrder, dyn PurchaseOrderApi>,
}

impl PurchaseOrderStore {
    pub fn new(api: Arc<dyn PurchaseOrderApi>, notifications: NotificationBus) -> Self {
        Self {
            store: EntityStore::new(api, notifications),
        }
    }

    pub fn entities(&self) -> &EntityStore<PurchaseOrder, dyn PurchaseOrderApi> {
        &self.store
    }

    /// Complete an order and merge the returned version into the list
    pub async fn complete(&self, id: EntityId) -> Result<PurchaseOrder, ApiError> {
        let api = self.store.api().clone();
        let order = self
            .store
            .perform("Failed to complete purchase order", async move {
                api.complete(id).await
            })
            .await?;
        self.store.accept(id, order.clone());
        self.store.notify_success("Purchase order completed successfully!");
        Ok(order)
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: i64, quantity: &str, unit_price: &str) -> OrderItem {
        OrderItem {
            product: EntityId(product),
            quantity: quantity.to_string(),
            unit_price: unit_price.to_string(),
            ..OrderItem::blank()
        }
    }

    fn order(id: i64) -> PurchaseOrder {
        let mut draft = PurchaseOrderDraft {
            supplier: EntityId(2),
            order_date: "2024-05-01".to_string(),
            items: vec![item(1, "10", "2.50")],
            ..Default::default()
        };
        draft.recalculate();
        PurchaseOrder::from_draft(EntityId(id), draft)
    }

    #[test]
    fn test_resource_path() {
        assert_eq!(PurchaseOrder::resource_name(), "purchase_orders");
        assert_eq!(PurchaseOrder::plural_label(), "purchase orders");
    }

    #[test]
    fn test_recalculate_totals() {
        let mut draft = PurchaseOrderDraft {
            items: vec![item(1, "3", "1.25"), item(2, "2", "abc"), item(3, "0.5", "10")],
            ..Default::default()
        };
        draft.recalculate();

        let totals: Vec<&str> = draft.items.iter().map(|i| i.total_price.as_str()).collect();
        assert_eq!(totals, vec!["3.75", "0.00", "5.00"]);
        assert_eq!(draft.total_amount, "8.75");
    }

    #[test]
    fn test_initial_draft() {
        let draft = PurchaseOrderDraft::initial();
        assert_eq!(draft.status, PurchaseOrderStatus::Pending);
        assert_eq!(draft.items, vec![OrderItem {
            total_price: "0.00".to_string(),
            ..OrderItem::blank()
        }]);
        assert_eq!(draft.total_amount, "0.00");
        assert!(chrono::NaiveDate::parse_from_str(&draft.order_date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_item_edits_recompute() {
        let mut draft = PurchaseOrderDraft::initial();
        draft.add_item();
        draft.items[1].unit_price = "4".to_string();
        draft.recompute();
        assert_eq!(draft.total_amount, "4.00");

        draft.remove_item(1);
        assert_eq!(draft.total_amount, "0.00");
    }

    #[test]
    fn test_schema_messages() {
        let mut draft = PurchaseOrderDraft::initial();
        draft.order_date = "not a date".to_string();
        draft.items[0].quantity = String::new();

        let err = draft.validated().unwrap_err();
        assert_eq!(err.fields.first("supplier"), Some("Supplier is required"));
        assert_eq!(err.fields.first("order_date"), Some("Invalid date"));
        assert_eq!(err.fields.first("items.0.product"), Some("Product is required"));
        assert_eq!(err.fields.first("items.0.quantity"), Some("Quantity is required"));
        assert!(!err.fields.contains("items.0.unit_price"));

        draft.items.clear();
        let err = draft.validated().unwrap_err();
        assert_eq!(err.fields.first("items"), Some("At least one item is required"));
    }

    #[test]
    fn test_status_wire_format() {
        let value = serde_json::to_value(order(1)).unwrap();
        assert_eq!(value["status"], "Pending");
        assert_eq!(value["total_amount"], "25.00");
        assert!(value["items"][0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_complete_replaces_member() {
        let api = InMemoryEntityApi::with_rows(vec![order(1), order(2)]);
        let store = PurchaseOrderStore::new(Arc::new(api.clone()), NotificationBus::default());
        store.entities().list().await.unwrap();
        let mut rx = store.entities().notifications().subscribe();

        let completed = store.complete(EntityId(2)).await.unwrap();

        assert!(completed.is_completed());
        assert_eq!(completed.items[0].received_quantity, "10");
        assert!(store.entities().find(EntityId(2)).unwrap().is_completed());
        assert!(!store.entities().find(EntityId(1)).unwrap().is_completed());
        assert_eq!(
            rx.try_recv().unwrap().notification.message,
            "Purchase order completed successfully!"
        );
    }

    #[tokio::test]
    async fn test_complete_unknown_order() {
        let api = InMemoryEntityApi::with_rows(vec![order(1)]);
        let store = PurchaseOrderStore::new(Arc::new(api), NotificationBus::default());
        store.entities().list().await.unwrap();

        assert!(store.complete(EntityId(9)).await.is_err());
        assert_eq!(
            store.entities().error().as_deref(),
            Some("No purchase_order matches the given query (id 9).")
        );
        assert_eq!(store.entities().len(), 1);
    }
}
