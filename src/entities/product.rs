//! Products, stock adjustments and purchase price history
//!
//! Besides CRUD, the product endpoints expose:
//!
//! - `GET /products/{id}/price_history/`: purchase prices over time
//! - `POST /products/{id}/adjust_stock/`: manual stock correction
//! - `GET /products/low_stocks/`: products at or under their minimum stock

use crate::client::RestEntityApi;
use crate::core::entity::{Entity, EntityId};
use crate::core::error::{ApiError, ValidationError};
use crate::core::events::NotificationBus;
use crate::core::service::EntityApi;
use crate::core::validation::filters::{round_decimals, trim};
use crate::core::validation::validators::{as_number, in_list, message, min_value, positive, required};
use crate::core::validation::{FormData, FormSchema};
use crate::storage::{ApiCall, InMemoryEntityApi};
use crate::store::{DetailSlot, EntityStore, PanelContent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

crate::impl_entity!(
    Product,
    "product",
    "Product",
    draft: ProductDraft,
    patch: ProductPatch,
    {
        name: String,
        #[serde(default)]
        description: String,
        sku: String,
        #[serde(default)]
        barcode: String,
        category: EntityId,
        supplier: EntityId,
        purchase_price: f64,
        selling_price: f64,
        current_stock: f64,
        minimum_stock: f64,
        unit_of_measurement: String,
    },
    computed {
        category_name: String,
        supplier_name: String,
    }
);

impl Product {
    /// At or below the reorder threshold
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }
}

impl FormData for ProductDraft {
    fn schema() -> FormSchema {
        let mut schema = FormSchema::new()
            .filter("name", trim())
            .filter("sku", trim())
            .filter("barcode", trim())
            .validate("name", message("Product name is required", required()))
            .validate("sku", message("SKU is required", required()))
            .validate("category", message("Category is required", min_value(1.0)))
            .validate("supplier", message("Supplier is required", min_value(1.0)))
            .validate("unit_of_measurement", message("Unit is required", required()));

        for price in ["purchase_price", "selling_price"] {
            schema = schema.filter(price, round_decimals(2));
        }
        for amount in ["purchase_price", "selling_price", "current_stock", "minimum_stock"] {
            schema = schema.validate(amount, message("Must be >= 0", min_value(0.0)));
        }
        schema
    }
}

// =============================================================================
// Stock adjustment
// =============================================================================

/// Direction of a stock correction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentType {
    #[default]
    Increase,
    Decrease,
}

impl AdjustmentType {
    pub const ALL: [AdjustmentType; 2] = [AdjustmentType::Increase, AdjustmentType::Decrease];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Increase => "Increase",
            AdjustmentType::Decrease => "Decrease",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Signed change in stock for `quantity`
    pub fn apply(&self, quantity: f64) -> f64 {
        match self {
            AdjustmentType::Increase => quantity,
            AdjustmentType::Decrease => -quantity,
        }
    }

    pub(crate) fn names() -> Vec<String> {
        Self::ALL.iter().map(|t| t.as_str().to_string()).collect()
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /products/{id}/adjust_stock/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub adjustment_type: AdjustmentType,
    pub quantity: f64,
    pub reason: String,
}

/// The adjust-stock dialog's inputs, as typed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustmentForm {
    pub adjustment_type: String,
    pub quantity: String,
    pub reason: String,
}

impl FormData for StockAdjustmentForm {
    fn schema() -> FormSchema {
        FormSchema::new()
            .filter("reason", trim())
            .validate(
                "adjustment_type",
                message("Adjustment type is required", required()),
            )
            .validate("adjustment_type", in_list(AdjustmentType::names()))
            .validate("quantity", message("Quantity is required", required()))
            .validate(
                "quantity",
                message("Quantity must be a positive number", positive()),
            )
            .validate("reason", message("Reason is required", required()))
    }
}

impl StockAdjustmentForm {
    /// Validate the inputs and convert them into a request body
    pub fn into_adjustment(self) -> Result<StockAdjustment, ValidationError> {
        let form = self.validated()?;
        let adjustment_type = AdjustmentType::parse(&form.adjustment_type).ok_or_else(|| {
            ValidationError::single("adjustment_type", "Adjustment type is required")
        })?;
        let quantity = as_number(&serde_json::Value::String(form.quantity)).ok_or_else(|| {
            ValidationError::single("quantity", "Quantity must be a positive number")
        })?;
        Ok(StockAdjustment {
            adjustment_type,
            quantity,
            reason: form.reason,
        })
    }
}

// =============================================================================
// Price history
// =============================================================================

/// One received purchase of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub purchase_price: String,
    pub effective_date: String,
    pub purchase_order: EntityId,
    pub quantity_received: String,
}

/// Body of `GET /products/{id}/price_history/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPriceHistory {
    pub product_id: EntityId,
    pub product_name: String,
    pub current_purchase_price: f64,
    #[serde(default)]
    pub price_history: Vec<PriceHistoryEntry>,
}

// =============================================================================
// Collaborator
// =============================================================================

/// Product endpoints beyond CRUD
#[async_trait]
pub trait ProductApi: EntityApi<Product> {
    async fn price_history(&self, id: EntityId) -> Result<ProductPriceHistory, ApiError>;

    async fn adjust_stock(&self, id: EntityId, adjustment: &StockAdjustment) -> Result<(), ApiError>;

    async fn low_stock(&self) -> Result<Vec<Product>, ApiError>;
}

#[async_trait]
impl ProductApi for RestEntityApi<Product> {
    async fn price_history(&self, id: EntityId) -> Result<ProductPriceHistory, ApiError> {
        self.client().get(&self.item_action(id, "price_history")).await
    }

    async fn adjust_stock(&self, id: EntityId, adjustment: &StockAdjustment) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client()
            .post(&self.item_action(id, "adjust_stock"), adjustment)
            .await?;
        Ok(())
    }

    async fn low_stock(&self) -> Result<Vec<Product>, ApiError> {
        self.client().get(&self.collection_action("low_stocks")).await
    }
}

#[async_trait]
impl ProductApi for InMemoryEntityApi<Product> {
    async fn price_history(&self, id: EntityId) -> Result<ProductPriceHistory, ApiError> {
        self.action(&crate::client::endpoints::item_action(
            Product::resource_name(),
            id,
            "price_history",
        ))
        .await
    }

    async fn adjust_stock(&self, id: EntityId, adjustment: &StockAdjustment) -> Result<(), ApiError> {
        let path = crate::client::endpoints::item_action(Product::resource_name(), id, "adjust_stock");
        let change = adjustment.adjustment_type.apply(adjustment.quantity);

        let on_hand = self
            .rows()
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.current_stock);
        if on_hand.is_some_and(|stock| stock + change < 0.0) {
            return Err(ApiError::Status {
                status: 400,
                detail: Some("Insufficient stock for this adjustment.".to_string()),
            });
        }

        self.modify(ApiCall::Action(path), id, |product| {
            product.current_stock += change;
        })
        .await?;
        Ok(())
    }

    async fn low_stock(&self) -> Result<Vec<Product>, ApiError> {
        let path = crate::client::endpoints::collection_action(Product::resource_name(), "low_stocks");
        self.query(ApiCall::Action(path), |rows| {
            rows.iter().filter(|p| p.is_low_stock()).cloned().collect()
        })
        .await
    }
}

// =============================================================================
// Store
// =============================================================================

/// Product state: the generic store plus price history and low-stock slots
#[derive(Clone)]
pub struct ProductStore {
    store: EntityStore<Product, dyn ProductApi>,
    price_history: DetailSlot<ProductPriceHistory>,
    low_stock: DetailSlot<Vec<Product>>,
}

impl ProductStore {
    pub fn new(api: Arc<dyn ProductApi>, notifications: NotificationBus) -> Self {
        Self {
            store: EntityStore::new(api, notifications),
            price_history: DetailSlot::new(),
            low_stock: DetailSlot::new(),
        }
    }

    /// The CRUD store, for lists and dialogs
    pub fn entities(&self) -> &EntityStore<Product, dyn ProductApi> {
        &self.store
    }

    pub fn price_history(&self) -> &DetailSlot<ProductPriceHistory> {
        &self.price_history
    }

    pub fn low_stock(&self) -> &DetailSlot<Vec<Product>> {
        &self.low_stock
    }

    pub async fn fetch_price_history(&self, id: EntityId) -> Result<ProductPriceHistory, ApiError> {
        let api = self.store.api().clone();
        self.store
            .load_detail(&self.price_history, "Failed to fetch price history", async move {
                api.price_history(id).await
            })
            .await
    }

    /// Correct the stock of a product
    ///
    /// The list is not refreshed here; callers re-fetch it after success.
    pub async fn adjust_stock(&self, id: EntityId, adjustment: &StockAdjustment) -> Result<(), ApiError> {
        let api = self.store.api().clone();
        self.store
            .perform("Failed to adjust product", async move {
                api.adjust_stock(id, adjustment).await
            })
            .await?;
        self.store.notify_success("Product adjusted successfully!");
        Ok(())
    }

    pub async fn fetch_low_stock(&self) -> Result<Vec<Product>, ApiError> {
        let api = self.store.api().clone();
        self.store
            .load_detail(&self.low_stock, "Failed to fetch low stock products", async move {
                api.low_stock().await
            })
            .await
    }

    /// Price history panel content; empty when no purchase was received yet
    pub fn price_history_panel(&self) -> PanelContent<ProductPriceHistory> {
        self.price_history.panel(|h| h.price_history.is_empty())
    }

    pub fn reset(&self) {
        self.store.reset();
        self.price_history.clear();
        self.low_stock.clear();
    }
}
