//! Client-side form validation and filtering
//!
//! Each form type declares a [`FormSchema`] of per-field filters and
//! validators. Submitting a form runs the schema over the serialized value;
//! any failure is reported per field and blocks the network call.

pub mod filters;
pub mod schema;
pub mod validators;

pub use schema::FormSchema;

use crate::core::error::ValidationError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value edited through a form dialog
pub trait FormData: Serialize + DeserializeOwned + Default {
    /// Rules checked before the value is submitted
    fn schema() -> FormSchema;

    /// Value a create dialog starts from
    fn initial() -> Self {
        Self::default()
    }

    /// Refresh derived fields after an edit (e.g. line totals)
    fn recompute(&mut self) {}

    /// Run the schema, returning the filtered value or the per-field errors
    fn validated(&self) -> Result<Self, ValidationError> {
        let value = serde_json::to_value(self)
            .map_err(|e| ValidationError::single("form", e.to_string()))?;
        let filtered = Self::schema()
            .apply(value)
            .map_err(|fields| ValidationError { fields })?;
        serde_json::from_value(filtered).map_err(|e| ValidationError::single("form", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::filters::trim;
    use super::validators::{message, required};
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct NoteForm {
        title: String,
    }

    impl FormData for NoteForm {
        fn schema() -> FormSchema {
            FormSchema::new()
                .filter("title", trim())
                .validate("title", message("Title is required", required()))
        }
    }

    #[test]
    fn test_validated_returns_filtered_copy() {
        let form = NoteForm {
            title: "  Restock  ".to_string(),
        };
        let valid = form.validated().unwrap();
        assert_eq!(valid.title, "Restock");
    }

    #[test]
    fn test_validated_reports_field_errors() {
        let err = NoteForm::initial().validated().unwrap_err();
        assert_eq!(err.fields.first("title"), Some("Title is required"));
    }
}
