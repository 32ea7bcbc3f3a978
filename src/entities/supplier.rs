//! Suppliers that purchase orders are placed with

use crate::core::validation::filters::trim;
use crate::core::validation::validators::{email, message, required};
use crate::core::validation::{FormData, FormSchema};

crate::impl_entity!(
    Supplier,
    "supplier",
    "Supplier",
    draft: SupplierDraft,
    patch: SupplierPatch,
    {
        name: String,
        #[serde(default)]
        contact_person: String,
        #[serde(default)]
        phone: String,
        #[serde(default)]
        email: String,
        #[serde(default)]
        address: String,
    }
);

impl FormData for SupplierDraft {
    fn schema() -> FormSchema {
        FormSchema::new()
            .filter("name", trim())
            .filter("contact_person", trim())
            .filter("phone", trim())
            .filter("email", trim())
            .validate("name", message("Supplier name is required", required()))
            .validate("email", message("Invalid email address", email()))
    }
}
