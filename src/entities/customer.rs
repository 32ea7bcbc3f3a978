//! Customers, their purchase history and credit payments

use crate::client::RestEntityApi;
use crate::client::endpoints;
use crate::core::entity::{Entity, EntityId};
use crate::core::error::{ApiError, ValidationError};
use crate::core::events::NotificationBus;
use crate::core::service::EntityApi;
use crate::core::validation::filters::trim;
use crate::core::validation::validators::{as_number, email, message, min_value, positive, required};
use crate::core::validation::{FormData, FormSchema};
use crate::storage::{ApiCall, InMemoryEntityApi};
use crate::store::{DetailSlot, EntityStore, PanelContent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

crate::impl_entity!(
    Customer,
    "customer",
    "Customer",
    draft: CustomerDraft,
    patch: CustomerPatch,
    {
        name: String,
        phone: String,
        #[serde(default)]
        email: Option<String>,
        address: String,
        // The service spells this field "loyality".
        #[serde(default, rename = "loyality_points")]
        loyalty_points: Option<i64>,
        #[serde(default)]
        outstanding_balance: Option<f64>,
    }
);

impl Customer {
    pub fn has_credit_due(&self) -> bool {
        self.outstanding_balance.is_some_and(|due| due > 0.0)
    }
}

impl FormData for CustomerDraft {
    /// A new customer starts with no points and nothing owed
    fn initial() -> Self {
        Self {
            email: Some(String::new()),
            loyalty_points: Some(0),
            outstanding_balance: Some(0.0),
            ..Default::default()
        }
    }

    fn schema() -> FormSchema {
        FormSchema::new()
            .filter("name", trim())
            .filter("phone", trim())
            .filter("email", trim())
            .filter("address", trim())
            .validate("name", message("Customer name is required", required()))
            .validate("phone", message("Phone no. is required", required()))
            .validate("email", message("Invalid email address", email()))
            .validate("address", message("Address is required", required()))
            .validate("loyality_points", message("Must be >= 0", min_value(0.0)))
            .validate("outstanding_balance", message("Must be >= 0", min_value(0.0)))
    }
}

// =============================================================================
// Purchase history
// =============================================================================

/// A line of a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub id: EntityId,
    pub product: EntityId,
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    #[serde(default)]
    pub discount_amount: String,
    pub total_price: String,
}

/// A line of a return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub id: EntityId,
    pub product: EntityId,
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub total_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReturn {
    pub id: EntityId,
    pub transaction: EntityId,
    pub return_date: String,
    #[serde(default)]
    pub reason: String,
    pub refund_amount: String,
    pub refund_method: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<ReturnItem>,
}

/// A completed sale, with any returns made against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseTransaction {
    pub id: EntityId,
    pub customer: EntityId,
    #[serde(default)]
    pub customer_name: String,
    pub transaction_date: String,
    pub payment_method: String,
    pub subtotal: String,
    pub discount_amount: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub amount_paid: String,
    pub change_amount: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
    #[serde(default)]
    pub returns: Vec<PurchaseReturn>,
}

impl PurchaseTransaction {
    /// Sum of refunds issued against this sale
    pub fn refunded(&self) -> f64 {
        self.returns
            .iter()
            .filter_map(|r| r.refund_amount.trim().parse::<f64>().ok())
            .sum()
    }
}

/// Body of `GET /customers/{id}/purchase_history/`
pub type CustomerPurchaseHistory = Vec<PurchaseTransaction>;

// =============================================================================
// Credit payment
// =============================================================================

/// Body of `POST /customers/{id}/pay_credit/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPayment {
    pub payment_amount: f64,
}

/// The pay-credit dialog's single input; starts blank every time it opens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditPaymentForm {
    pub payment_amount: String,
}

impl FormData for CreditPaymentForm {
    fn schema() -> FormSchema {
        FormSchema::new()
            .validate("payment_amount", message("Payment amount is required", required()))
            .validate(
                "payment_amount",
                message("Payment amount must be a positive number", positive()),
            )
    }
}

impl CreditPaymentForm {
    pub fn into_payment(self) -> Result<CreditPayment, ValidationError> {
        let form = self.validated()?;
        let payment_amount = as_number(&serde_json::Value::String(form.payment_amount))
            .ok_or_else(|| {
                ValidationError::single("payment_amount", "Payment amount must be a positive number")
            })?;
        Ok(CreditPayment { payment_amount })
    }
}

// =============================================================================
// Collaborator
// =============================================================================

/// Customer endpoints beyond CRUD
#[async_trait]
pub trait CustomerApi: EntityApi<Customer> {
    async fn purchase_history(&self, id: EntityId) -> Result<CustomerPurchaseHistory, ApiError>;

    async fn pay_credit(&self, id: EntityId, payment: &CreditPayment) -> Result<(), ApiError>;
}

#[async_trait]
impl CustomerApi for RestEntityApi<Customer> {
    async fn purchase_history(&self, id: EntityId) -> Result<CustomerPurchaseHistory, ApiError> {
        self.client()
            .get(&self.item_action(id, "purchase_history"))
            .await
    }

    async fn pay_credit(&self, id: EntityId, payment: &CreditPayment) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client()
            .post(&self.item_action(id, "pay_credit"), payment)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CustomerApi for InMemoryEntityApi<Customer> {
    async fn purchase_history(&self, id: EntityId) -> Result<CustomerPurchaseHistory, ApiError> {
        self.action(&endpoints::item_action(
            Customer::resource_name(),
            id,
            "purchase_history",
        ))
        .await
    }

    async fn pay_credit(&self, id: EntityId, payment: &CreditPayment) -> Result<(), ApiError> {
        let path = endpoints::item_action(Customer::resource_name(), id, "pay_credit");
        let amount = payment.payment_amount;
        self.modify(ApiCall::Action(path), id, |customer| {
            let due = customer.outstanding_balance.unwrap_or(0.0);
            customer.outstanding_balance = Some((due - amount).max(0.0));
        })
        .await?;
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

/// Customer state: the generic store plus the purchase history slot
#[derive(Clone)]
pub struct CustomerStore {
    store: EntityStore<Customer, dyn CustomerApi>,
    purchase_history: DetailSlot<CustomerPurchaseHistory>,
}

impl CustomerStore {
    pub fn new(api: Arc<dyn CustomerApi>, notifications: NotificationBus) -> Self {
        Self {
            store: EntityStore::new(api, notifications),
            purchase_history: DetailSlot::new(),
        }
    }

    pub fn entities(&self) -> &EntityStore<Customer, dyn CustomerApi> {
        &self.store
    }

    pub fn purchase_history(&self) -> &DetailSlot<CustomerPurchaseHistory> {
        &self.purchase_history
    }

    pub async fn fetch_purchase_history(
        &self,
        id: EntityId,
    ) -> Result<CustomerPurchaseHistory, ApiError> {
        let api = self.store.api().clone();
        self.store
            .load_detail(
                &self.purchase_history,
                "Failed to fetch purchase history",
                async move { api.purchase_history(id).await },
            )
            .await
    }

    /// Record a credit payment; the list is re-fetched by the caller
    pub async fn pay_credit(&self, id: EntityId, payment: &CreditPayment) -> Result<(), ApiError> {
        let api = self.store.api().clone();
        self.store
            .perform("Failed to update credit", async move {
                api.pay_credit(id, payment).await
            })
            .await?;
        self.store.notify_success("Credit updated successfully!");
        Ok(())
    }

    /// Purchase history panel content
    pub fn purchase_history_panel(&self) -> PanelContent<CustomerPurchaseHistory> {
        self.purchase_history.panel(Vec::is_empty)
    }

    /// Text for the purchase history panel once it settles on no sales
    pub fn purchase_history_notice(&self) -> Option<&'static str> {
        matches!(self.purchase_history_panel(), PanelContent::Empty).then_some(EMPTY_PURCHASE_HISTORY)
    }

    /// Loaded customers that get a pay-credit action
    pub fn with_credit_due(&self) -> Vec<Customer> {
        self.store
            .items()
            .into_iter()
            .filter(Customer::has_credit_due)
            .collect()
    }

    pub fn reset(&self) {
        self.store.reset();
        self.purchase_history.clear();
    }
}

/// Shown when a customer has no recorded sales
pub const EMPTY_PURCHASE_HISTORY: &str = "No purchase history found for this customer.";
