//! The back office's record types and the stores that own them

#[macro_use]
pub mod macros;

pub mod category;
pub mod customer;
pub mod customer_deposit;
pub mod inventory_adjustment;
pub mod product;
pub mod purchase_order;
pub mod supplier;
pub mod user;

pub use category::{Category, CategoryDraft, CategoryPatch};
pub use customer::{
    CreditPayment, CreditPaymentForm, Customer, CustomerApi, CustomerDraft, CustomerPatch,
    CustomerPurchaseHistory, CustomerStore, PurchaseTransaction,
};
pub use customer_deposit::{CustomerDeposit, CustomerDepositDraft, CustomerDepositPatch};
pub use inventory_adjustment::{
    InventoryAdjustment, InventoryAdjustmentDraft, InventoryAdjustmentPatch,
};
pub use product::{
    AdjustmentType, Product, ProductApi, ProductDraft, ProductPatch, ProductPriceHistory,
    ProductStore, StockAdjustment, StockAdjustmentForm,
};
pub use purchase_order::{
    OrderItem, PurchaseOrder, PurchaseOrderApi, PurchaseOrderDraft, PurchaseOrderPatch,
    PurchaseOrderStatus, PurchaseOrderStore,
};
pub use supplier::{Supplier, SupplierDraft, SupplierPatch};
pub use user::{User, UserApi, UserDraft, UserPatch, UserStore};

use crate::client::{RestClient, RestEntityApi};
use crate::core::entity::Entity;
use crate::core::events::NotificationBus;
use crate::core::service::EntityApi;
use crate::storage::InMemoryEntityApi;
use crate::store::EntityStore;
use std::sync::Arc;

/// Every store of the back office, sharing one notification bus
///
/// Built once at startup and handed to the views that need it; there is no
/// global registry.
#[derive(Clone)]
pub struct Stores {
    pub categories: EntityStore<Category>,
    pub suppliers: EntityStore<Supplier>,
    pub customers: CustomerStore,
    pub products: ProductStore,
    pub purchase_orders: PurchaseOrderStore,
    pub inventory_adjustments: EntityStore<InventoryAdjustment>,
    pub deposits: EntityStore<CustomerDeposit>,
    pub users: UserStore,
    notifications: NotificationBus,
}

impl Stores {
    /// Stores backed by the REST service behind `client`
    pub fn rest(client: &RestClient, notifications: NotificationBus) -> Self {
        Self {
            categories: rest_store(client, &notifications),
            suppliers: rest_store(client, &notifications),
            customers: CustomerStore::new(
                Arc::new(RestEntityApi::<Customer>::new(client.clone())),
                notifications.clone(),
            ),
            products: ProductStore::new(
                Arc::new(RestEntityApi::<Product>::new(client.clone())),
                notifications.clone(),
            ),
            purchase_orders: PurchaseOrderStore::new(
                Arc::new(RestEntityApi::<PurchaseOrder>::new(client.clone())),
                notifications.clone(),
            ),
            inventory_adjustments: rest_store(client, &notifications),
            deposits: rest_store(client, &notifications),
            users: UserStore::new(
                Arc::new(RestEntityApi::<User>::new(client.clone())),
                notifications.clone(),
            ),
            notifications,
        }
    }

    /// Stores backed by empty in-memory services, for offline work
    pub fn in_memory(notifications: NotificationBus) -> Self {
        Self {
            categories: memory_store(&notifications),
            suppliers: memory_store(&notifications),
            customers: CustomerStore::new(
                Arc::new(InMemoryEntityApi::<Customer>::new()),
                notifications.clone(),
            ),
            products: ProductStore::new(
                Arc::new(InMemoryEntityApi::<Product>::new()),
                notifications.clone(),
            ),
            purchase_orders: PurchaseOrderStore::new(
                Arc::new(InMemoryEntityApi::<PurchaseOrder>::new()),
                notifications.clone(),
            ),
            inventory_adjustments: memory_store(&notifications),
            deposits: memory_store(&notifications),
            users: UserStore::new(
                Arc::new(InMemoryEntityApi::<User>::new()),
                notifications.clone(),
            ),
            notifications,
        }
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }

    /// Reset every store, as on logout
    pub fn reset_all(&self) {
        self.categories.reset();
        self.suppliers.reset();
        self.customers.reset();
        self.products.reset();
        self.purchase_orders.reset();
        self.inventory_adjustments.reset();
        self.deposits.reset();
        self.users.reset();
    }
}

fn rest_store<T: Entity>(client: &RestClient, notifications: &NotificationBus) -> EntityStore<T> {
    let api: Arc<dyn EntityApi<T>> = Arc::new(RestEntityApi::<T>::new(client.clone()));
    EntityStore::new(api, notifications.clone())
}

fn memory_store<T: Entity>(notifications: &NotificationBus) -> EntityStore<T> {
    let api: Arc<dyn EntityApi<T>> = Arc::new(InMemoryEntityApi::<T>::new());
    EntityStore::new(api, notifications.clone())
}
