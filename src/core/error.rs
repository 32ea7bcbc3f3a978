//! Typed error handling for stockroom
//!
//! # Error Categories
//!
//! - [`ApiError`]: failures talking to the REST service (transport, HTTP status,
//!   not-found, authentication, undecodable bodies)
//! - [`ValidationError`]: client-side form validation, reported per field
//! - [`ConfigError`]: configuration parsing and validation
//!
//! Every category converts into [`StockroomError`] for callers that only want
//! one error type.
//!
//! # Example
//!
//! ```rust,ignore
//! match store.create(&draft).await {
//!     Ok(product) => println!("created {}", product.id),
//!     Err(ApiError::NotFound { .. }) => println!("endpoint missing"),
//!     Err(e) => eprintln!("{}", e.user_message("Failed to create product")),
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The umbrella error type for the crate
#[derive(Debug, Error)]
pub enum StockroomError {
    /// REST collaborator errors
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Form validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StockroomError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StockroomError::Api(e) => e.error_code(),
            StockroomError::Validation(_) => "VALIDATION_ERROR",
            StockroomError::Config(_) => "CONFIG_ERROR",
        }
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by the REST collaborator
///
/// The service may attach a `detail` string to any error body; it is kept
/// verbatim so it can be shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The resource does not exist (HTTP 404)
    #[error("Not found: {}", detail.as_deref().unwrap_or("resource does not exist"))]
    NotFound { detail: Option<String> },

    /// Missing or expired credentials (HTTP 401)
    #[error("Unauthorized: {}", detail.as_deref().unwrap_or("authentication required"))]
    Unauthorized { detail: Option<String> },

    /// Any other non-success status, including 400/422 validation failures
    #[error("Request failed with status {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

/// Shape of an error body as produced by the service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl ApiError {
    /// Build an error from a non-success status and its raw body
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .filter(|d| !d.trim().is_empty());

        match status {
            401 => ApiError::Unauthorized { detail },
            404 => ApiError::NotFound { detail },
            _ => ApiError::Status { status, detail },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
        }
    }

    /// The HTTP status this error carries, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { .. } | ApiError::Decode { .. } => None,
        }
    }

    /// The server-provided `detail` message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { detail }
            | ApiError::Unauthorized { detail }
            | ApiError::Status { detail, .. } => detail.as_deref(),
            ApiError::Transport { .. } | ApiError::Decode { .. } => None,
        }
    }

    /// The message to show the user: the server's detail, or `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Transport { .. } => "TRANSPORT_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Status { .. } => "REQUEST_FAILED",
            ApiError::Decode { .. } => "DECODE_ERROR",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode {
                message: err.to_string(),
            }
        } else {
            ApiError::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Per-field validation messages, in the order fields were checked
///
/// Nested fields use dotted paths (`items.0.quantity`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Merge another set of errors, prefixing its field paths
    pub fn extend_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            let path = format!("{}.{}", prefix, field);
            self.0.entry(path).or_default().extend(messages);
        }
    }

    /// All messages recorded for `field`
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first message for `field`, as a form shows it under the input
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when no errors were recorded
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields: self })
        }
    }
}

/// Client-side validation failure; blocks submission before any network call
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Validation failed: {}", summarize(fields))]
pub struct ValidationError {
    pub fields: FieldErrors,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.add(field, message);
        Self { fields }
    }
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .0
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}
