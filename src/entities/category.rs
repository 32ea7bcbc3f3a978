//! Product categories

use crate::core::validation::filters::trim;
use crate::core::validation::validators::{message, required};
use crate::core::validation::{FormData, FormSchema};

crate::impl_entity!(
    Category,
    "category",
    "Category",
    draft: CategoryDraft,
    patch: CategoryPatch,
    {
        name: String,
        #[serde(default)]
        description: String,
    }
);

impl FormData for CategoryDraft {
    fn schema() -> FormSchema {
        FormSchema::new()
            .filter("name", trim())
            .filter("description", trim())
            .validate("name", message("Category name is required", required()))
    }
}
