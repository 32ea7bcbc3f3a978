//! Reusable field validators
//!
//! A validator receives the field path and its (already filtered) JSON value
//! and returns a human-readable message on failure. Form values arrive in the
//! shapes a UI produces: numbers may be typed as strings, untouched inputs are
//! blank strings, selects that were never chosen hold id `0`.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Parse a JSON number or a numeric string into `f64`
///
/// Blank strings and non-numeric values yield `None`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Validator: field is present and not blank
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if is_blank(value) {
            Err(format!("'{}' is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: number (or numeric string) must be at least `min`
///
/// Blank values pass; pair with [`required`] when the field is mandatory.
pub fn min_value(min: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if is_blank(value) {
            return Ok(());
        }
        match as_number(value) {
            Some(num) if num < min => Err(format!("'{}' must be >= {}", field, min)),
            Some(_) => Ok(()),
            None => Err(format!("'{}' must be a number", field)),
        }
    }
}

/// Validator: number (or numeric string) must be strictly positive
pub fn positive() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if is_blank(value) {
            return Ok(());
        }
        match as_number(value) {
            Some(num) if num > 0.0 => Ok(()),
            _ => Err(format!("'{}' must be a positive number", field)),
        }
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if is_blank(value) {
            return Ok(());
        }
        match value.as_str() {
            Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
            _ => Err(format!(
                "'{}' must be one of: {} (got: {})",
                field,
                allowed.join(", "),
                value
            )),
        }
    }
}

/// Validator: string must parse as a date
///
/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps, the two shapes the
/// back office exchanges.
pub fn date() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        if s.trim().is_empty() {
            return Ok(());
        }
        let parses = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            || chrono::DateTime::parse_from_rfc3339(s).is_ok();
        if parses {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid date (got: {})", field, s))
        }
    }
}

/// Validator: non-empty string must look like an email address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        static EMAIL: OnceLock<Regex> = OnceLock::new();

        let Some(s) = value.as_str().filter(|s| !s.trim().is_empty()) else {
            return Ok(());
        };
        let re = EMAIL.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
                .unwrap_or_else(|_| unreachable!("static email pattern is valid"))
        });
        if re.is_match(s.trim()) {
            Ok(())
        } else {
            Err(format!("'{}' must be a valid email address", field))
        }
    }
}

/// Validator: array must hold at least `min` elements
pub fn min_items(min: usize) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let len = value.as_array().map(Vec::len).unwrap_or(0);
        if len < min {
            Err(format!("'{}' needs at least {} item(s)", field, min))
        } else {
            Ok(())
        }
    }
}

/// Replace the message of `validator` with a fixed, user-facing one
///
/// ```rust,ignore
/// schema.validate("sku", message("SKU is required", required()));
/// ```
pub fn message<V>(
    text: &'static str,
    validator: V,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone
where
    V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone,
{
    move |field: &str, value: &Value| validator(field, value).map_err(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === as_number() ===

    #[test]
    fn test_as_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(as_number(&json!(12)), Some(12.0));
        assert_eq!(as_number(&json!("12.50")), Some(12.5));
        assert_eq!(as_number(&json!(" 3 ")), Some(3.0));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!("")), None);
        assert_eq!(as_number(&json!(null)), None);
    }

    // === required() ===

    #[test]
    fn test_required_null_returns_error() {
        let v = required();
        let result = v("name", &json!(null));
        assert_eq!(result.unwrap_err(), "'name' is required");
    }

    #[test]
    fn test_required_blank_string_returns_error() {
        let v = required();
        assert!(v("name", &json!("")).is_err());
        assert!(v("name", &json!("   ")).is_err());
    }

    #[test]
    fn test_required_values_pass() {
        let v = required();
        assert!(v("name", &json!("Bolt")).is_ok());
        assert!(v("stock", &json!(0)).is_ok());
        assert!(v("items", &json!([])).is_ok());
    }

    // === min_value() ===

    #[test]
    fn test_min_value_rejects_below_minimum() {
        let v = min_value(0.0);
        assert_eq!(v("selling_price", &json!(-1)).unwrap_err(), "'selling_price' must be >= 0");
        assert!(v("selling_price", &json!("-0.5")).is_err());
    }

    #[test]
    fn test_min_value_accepts_boundary_and_blank() {
        let v = min_value(0.0);
        assert!(v("current_stock", &json!(0)).is_ok());
        assert!(v("current_stock", &json!("")).is_ok());
        assert!(v("current_stock", &json!(null)).is_ok());
    }

    #[test]
    fn test_min_value_rejects_non_numeric_text() {
        let v = min_value(0.0);
        assert_eq!(v("price", &json!("ten")).unwrap_err(), "'price' must be a number");
    }

    #[test]
    fn test_min_value_one_rejects_unselected_reference() {
        let v = min_value(1.0);
        assert!(v("supplier", &json!(0)).is_err());
        assert!(v("supplier", &json!(4)).is_ok());
    }

    // === positive() ===

    #[test]
    fn test_positive_rejects_zero_negative_and_text() {
        let v = positive();
        assert!(v("quantity", &json!("0")).is_err());
        assert!(v("quantity", &json!(-3)).is_err());
        assert!(v("quantity", &json!("lots")).is_err());
    }

    #[test]
    fn test_positive_accepts_positive_numbers() {
        let v = positive();
        assert!(v("quantity", &json!("5")).is_ok());
        assert!(v("quantity", &json!(0.25)).is_ok());
    }

    // === in_list() ===

    #[test]
    fn test_in_list_accepts_allowed() {
        let v = in_list(vec!["Increase".into(), "Decrease".into()]);
        assert!(v("adjustment_type", &json!("Decrease")).is_ok());
    }

    #[test]
    fn test_in_list_rejects_unknown() {
        let v = in_list(vec!["Increase".into(), "Decrease".into()]);
        let err = v("adjustment_type", &json!("Remove")).unwrap_err();
        assert!(err.contains("Increase, Decrease"));
    }

    // === date() ===

    #[test]
    fn test_date_accepts_iso_shapes() {
        let v = date();
        assert!(v("order_date", &json!("2024-03-01")).is_ok());
        assert!(v("order_date", &json!("2024-03-01T10:00:00Z")).is_ok());
    }

    #[test]
    fn test_date_rejects_garbage() {
        let v = date();
        assert!(v("order_date", &json!("yesterday")).is_err());
        assert!(v("order_date", &json!("2024-13-45")).is_err());
    }

    // === email() ===

    #[test]
    fn test_email_validation() {
        let v = email();
        assert!(v("email", &json!("shop@example.com")).is_ok());
        assert!(v("email", &json!("")).is_ok());
        assert!(v("email", &json!("not-an-email")).is_err());
    }

    // === min_items() ===

    #[test]
    fn test_min_items() {
        let v = min_items(1);
        assert!(v("items", &json!([])).is_err());
        assert!(v("items", &json!(null)).is_err());
        assert!(v("items", &json!([{}])).is_ok());
    }

    // === message() ===

    #[test]
    fn test_message_overrides_text() {
        let v = message("SKU is required", required());
        assert_eq!(v("sku", &json!("")).unwrap_err(), "SKU is required");
        assert!(v("sku", &json!("BLT-01")).is_ok());
    }
}
