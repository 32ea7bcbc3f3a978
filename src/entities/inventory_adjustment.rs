//! Inventory adjustments: the audit log of manual stock corrections

use crate::core::entity::EntityId;
use crate::core::validation::filters::trim;
use crate::core::validation::validators::{in_list, message, min_value, positive, required};
use crate::core::validation::{FormData, FormSchema};
use crate::entities::product::AdjustmentType;

crate::impl_entity!(
    InventoryAdjustment,
    "inventory_adjustment",
    "Inventory adjustment",
    path: "inventory_adjustment",
    draft: InventoryAdjustmentDraft,
    patch: InventoryAdjustmentPatch,
    {
        product: EntityId,
        adjustment_type: String,
        quantity: String,
        reason: String,
    },
    computed {
        product_name: String,
        adjustment_date: String,
        adjusted_by: String,
    }
);

impl InventoryAdjustment {
    pub fn kind(&self) -> Option<AdjustmentType> {
        AdjustmentType::parse(&self.adjustment_type)
    }
}

impl FormData for InventoryAdjustmentDraft {
    fn schema() -> FormSchema {
        FormSchema::new()
            .filter("quantity", trim())
            .filter("reason", trim())
            .validate("product", message("Product is required", min_value(1.0)))
            .validate(
                "adjustment_type",
                message("Adjustment type is required", required()),
            )
            .validate(
                "adjustment_type",
                message(
                    "Adjustment type is required",
                    in_list(AdjustmentType::names()),
                ),
            )
            .validate("quantity", message("Quantity is required", required()))
            .validate(
                "quantity",
                message("Quantity must be a positive number", positive()),
            )
            .validate("reason", message("Reason is required", required()))
    }
}
