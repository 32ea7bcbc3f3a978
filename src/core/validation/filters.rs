//! Reusable field filters
//!
//! Filters normalize form values before validation runs. They never reject a
//! value: anything they cannot interpret passes through untouched so the
//! validators report it.

use super::validators::as_number;
use anyhow::Result;
use serde_json::{Value, json};

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: round number to specified decimal places
pub fn round_decimals(
    decimals: u32,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| {
        if let Some(num) = value.as_f64() {
            let factor = 10_f64.powi(decimals as i32);
            let rounded = (num * factor).round() / factor;
            Ok(json!(rounded))
        } else {
            Ok(value)
        }
    }
}

/// Filter: rewrite a numeric string with a fixed number of decimals
///
/// Decimal columns travel as strings (`"12.50"`); this keeps what the form
/// sends in the same shape the server returns.
pub fn fixed_decimals(
    decimals: usize,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| match (&value, as_number(&value)) {
        (Value::String(_), Some(num)) => Ok(Value::String(format!("{:.*}", decimals, num))),
        _ => Ok(value),
    }
}
