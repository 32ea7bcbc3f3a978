//! Declarative per-field rules for a form

use crate::core::error::FieldErrors;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Validator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type Filter = Arc<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;

#[derive(Default, Clone)]
struct FieldRules {
    filters: Vec<Filter>,
    validators: Vec<Validator>,
}

/// Validation and filtering rules for one form
///
/// Fields are processed in the order they were first mentioned; for each
/// field the filters run first, then every validator sees the filtered value.
/// Array fields holding objects get their own nested schema via
/// [`FormSchema::each`], reported under `field.index.child` paths.
///
/// ```rust,ignore
/// let schema = FormSchema::new()
///     .filter("name", trim())
///     .validate("name", message("Product name is required", required()))
///     .validate("selling_price", message("Must be >= 0", min_value(0.0)));
/// ```
#[derive(Default, Clone)]
pub struct FormSchema {
    fields: IndexMap<String, FieldRules>,
    nested: IndexMap<String, FormSchema>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator for a field
    pub fn validate<V>(mut self, field: &str, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.fields
            .entry(field.to_string())
            .or_default()
            .validators
            .push(Arc::new(validator));
        self
    }

    /// Add a filter for a field
    pub fn filter<F>(mut self, field: &str, filter: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.fields
            .entry(field.to_string())
            .or_default()
            .filters
            .push(Arc::new(filter));
        self
    }

    /// Apply `schema` to every element of the array stored in `field`
    pub fn each(mut self, field: &str, schema: FormSchema) -> Self {
        self.nested.insert(field.to_string(), schema);
        self
    }

    /// Names of the fields carrying rules, in processing order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().chain(self.nested.keys()).map(String::as_str)
    }

    /// Filter then validate a JSON object
    ///
    /// Returns the filtered object, or every failing field with its messages.
    pub fn apply(&self, data: Value) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::new();
        let data = self.apply_into(data, &mut errors);
        if errors.is_empty() {
            Ok(data)
        } else {
            Err(errors)
        }
    }

    fn apply_into(&self, mut data: Value, errors: &mut FieldErrors) -> Value {
        let Some(object) = data.as_object_mut() else {
            errors.add("form", "expected an object");
            return data;
        };

        for (field, rules) in &self.fields {
            let mut value = object.get(field).cloned().unwrap_or(Value::Null);

            for filter in &rules.filters {
                match filter(field, value.clone()) {
                    Ok(filtered) => value = filtered,
                    Err(e) => errors.add(field.as_str(), e.to_string()),
                }
            }

            for validator in &rules.validators {
                if let Err(message) = validator(field, &value) {
                    errors.add(field.as_str(), message);
                }
            }

            if object.contains_key(field) {
                object.insert(field.clone(), value);
            }
        }

        for (field, schema) in &self.nested {
            let Some(Value::Array(items)) = object.get_mut(field) else {
                continue;
            };
            for (index, item) in items.iter_mut().enumerate() {
                let mut item_errors = FieldErrors::new();
                *item = schema.apply_into(item.take(), &mut item_errors);
                errors.extend_prefixed(&format!("{}.{}", field, index), item_errors);
            }
        }

        data
    }
}

impl fmt::Debug for FormSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSchema")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("nested", &self.nested)
            .finish()
    }
}
