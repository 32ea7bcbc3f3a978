//! Core module containing the fundamental traits and types of the crate

pub mod entity;
pub mod error;
pub mod events;
pub mod pluralize;
pub mod service;
pub mod validation;

pub use entity::{Entity, EntityId};
pub use error::{ApiError, ConfigError, FieldErrors, StockroomError, ValidationError};
pub use events::{Notification, NotificationBus, NotificationEnvelope, NotificationLevel};
pub use pluralize::Pluralizer;
pub use service::EntityApi;
pub use validation::{FormData, FormSchema};
