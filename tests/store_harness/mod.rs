//! Shared test harness for entity store testing
//!
//! Provides a [`Harness`] bundling a store, its in-memory API and a
//! notification receiver, plus sample rows for every record type.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

pub mod store_contract_tests;

use std::sync::Arc;
use tokio::sync::broadcast;

use stockroom::prelude::*;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A store wired to an in-memory API, with a receiver subscribed before any
/// operation runs
pub struct Harness<T: Entity> {
    pub store: EntityStore<T>,
    pub api: InMemoryEntityApi<T>,
    pub bus: NotificationBus,
    rx: broadcast::Receiver<NotificationEnvelope>,
}

impl<T: Entity> Harness<T> {
    pub fn new(rows: Vec<T>) -> Self {
        let api = InMemoryEntityApi::with_rows(rows);
        let bus = NotificationBus::new(64);
        let rx = bus.subscribe();
        let shared: Arc<dyn EntityApi<T>> = Arc::new(api.clone());
        Self {
            store: EntityStore::new(shared, bus.clone()),
            api,
            bus,
            rx,
        }
    }

    /// Every notification published since the last call
    pub fn notifications(&mut self) -> Vec<Notification> {
        let mut received = Vec::new();
        while let Ok(envelope) = self.rx.try_recv() {
            received.push(envelope.notification);
        }
        received
    }

    pub fn ids(&self) -> Vec<i64> {
        self.store.items().iter().map(|row| row.id().get()).collect()
    }
}

// ---------------------------------------------------------------------------
// Sample rows
// ---------------------------------------------------------------------------

pub fn category_draft(n: i64) -> CategoryDraft {
    CategoryDraft {
        name: format!("Category {}", n),
        description: format!("Shelf {}", n),
    }
}

pub fn supplier_draft(n: i64) -> SupplierDraft {
    SupplierDraft {
        name: format!("Supplier {}", n),
        email: format!("orders{}@example.com", n),
        ..Default::default()
    }
}

pub fn product_draft(n: i64) -> ProductDraft {
    ProductDraft {
        name: format!("Product {}", n),
        sku: format!("SKU-{:04}", n),
        category: EntityId(1),
        supplier: EntityId(1),
        purchase_price: 1.5 * n as f64,
        selling_price: 2.0 * n as f64,
        current_stock: 10.0,
        minimum_stock: 2.0,
        unit_of_measurement: "pcs".to_string(),
        ..Default::default()
    }
}

pub fn customer_draft(n: i64) -> CustomerDraft {
    CustomerDraft {
        name: format!("Customer {}", n),
        phone: format!("555-{:04}", n),
        address: format!("{} Market St", n),
        loyalty_points: Some(n),
        ..Default::default()
    }
}

pub fn purchase_order_draft(n: i64) -> PurchaseOrderDraft {
    let mut draft = PurchaseOrderDraft {
        supplier: EntityId(1),
        order_date: "2024-05-01".to_string(),
        items: vec![OrderItem {
            product: EntityId(n),
            quantity: format!("{}", n),
            unit_price: "2.00".to_string(),
            ..OrderItem::blank()
        }],
        ..Default::default()
    };
    draft.recalculate();
    draft
}

pub fn inventory_adjustment_draft(n: i64) -> InventoryAdjustmentDraft {
    InventoryAdjustmentDraft {
        product: EntityId(n),
        adjustment_type: "Increase".to_string(),
        quantity: format!("{}", n),
        reason: "Recount".to_string(),
    }
}

pub fn customer_deposit_draft(n: i64) -> CustomerDepositDraft {
    CustomerDepositDraft {
        customer: EntityId(n),
        amount: format!("{}.00", 10 * n),
        notes: "Layaway".to_string(),
    }
}

pub fn user_draft(n: i64) -> UserDraft {
    UserDraft {
        username: format!("clerk{}", n),
        email: format!("clerk{}@example.com", n),
        role: "cashier".to_string(),
    }
}

/// A product row as the service would return it
pub fn product(id: i64, name: &str) -> Product {
    Product::from_draft(
        EntityId(id),
        ProductDraft {
            name: name.to_string(),
            ..product_draft(id)
        },
    )
}

/// A product store whose API is also returned for assertions
pub fn product_store(rows: Vec<Product>) -> (ProductStore, InMemoryEntityApi<Product>, NotificationBus) {
    let api = InMemoryEntityApi::with_rows(rows);
    let bus = NotificationBus::new(64);
    let store = ProductStore::new(Arc::new(api.clone()), bus.clone());
    (store, api, bus)
}
