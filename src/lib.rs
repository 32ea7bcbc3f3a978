//! # Stockroom
//!
//! Client-side state for a point-of-sale back office whose records live in a
//! REST service: categories, suppliers, customers, products, purchase orders,
//! inventory adjustments, customer deposits and user accounts.
//!
//! ## Features
//!
//! - **Entity stores**: one owner per record type for the list, the current
//!   record, the loading flag and the last error
//! - **Server-confirmed state**: rows change only from service responses,
//!   never optimistically
//! - **List/dialog workflows**: create, edit and delete dialogs with
//!   client-side validation, driving the stores
//! - **Macro-defined entities**: one field list yields the record, its create
//!   body and its partial update body
//! - **REST transport**: bearer tokens with refresh, capped read retries,
//!   server `detail` messages surfaced verbatim
//! - **In-memory API**: the same contract without a network, with failure
//!   injection for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockroom::prelude::*;
//!
//! let config = ClientConfig::from_env()?;
//! let client = RestClient::new(&config)?;
//! client.login(&Credentials::new("admin", "secret")).await?;
//!
//! let stores = Stores::rest(&client, NotificationBus::new(config.notification_capacity));
//! let categories = ListDialogWorkflow::new(stores.categories.clone());
//! categories.mount().await?;
//!
//! categories.open_create();
//! categories.update_form(|form| form.name = "Fasteners".to_string());
//! categories.submit().await?;
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod entities;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod workflow;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::{Entity, EntityId},
        error::{ApiError, ConfigError, FieldErrors, StockroomError, ValidationError},
        events::{Notification, NotificationBus, NotificationEnvelope, NotificationLevel},
        pluralize::Pluralizer,
        service::EntityApi,
        validation::{FormData, FormSchema},
    };

    // === Macros ===
    pub use crate::impl_entity;

    // === Entities ===
    pub use crate::entities::{
        AdjustmentType, Category, CategoryDraft, CreditPayment, CreditPaymentForm, Customer,
        CustomerApi, CustomerDeposit, CustomerDepositDraft, CustomerDraft,
        CustomerPurchaseHistory, CustomerStore, InventoryAdjustment, InventoryAdjustmentDraft,
        OrderItem, Product, ProductApi, ProductDraft, ProductPriceHistory, ProductStore,
        PurchaseOrder, PurchaseOrderApi, PurchaseOrderDraft, PurchaseOrderStatus,
        PurchaseOrderStore, PurchaseTransaction, StockAdjustment, StockAdjustmentForm, Stores,
        Supplier, SupplierDraft, User, UserApi, UserDraft, UserStore,
    };

    // === Stores and workflows ===
    pub use crate::store::{DetailSlot, EntityStore, PanelContent, StoreSnapshot};
    pub use crate::workflow::{
        ActionDialog, DialogState, ListDialogWorkflow, RelatedPanel, RelatedSource,
        WorkflowError,
    };

    // === Transport ===
    pub use crate::client::{AuthSession, Credentials, RestClient, RestEntityApi, RetryPolicy};
    pub use crate::storage::{ApiCall, InMemoryEntityApi};

    // === Config ===
    pub use crate::config::ClientConfig;
    pub use crate::telemetry::init_tracing;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
