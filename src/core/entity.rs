//! Entity traits defining the core abstraction for all managed record types

use crate::core::validation::FormData;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a record.
///
/// The back office keys every table by an integer primary key; it travels as a
/// bare JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId(value)
    }
}

/// Base trait for all records managed by a store.
///
/// Every entity has:
/// - id: unique identifier assigned by the server
/// - a `Draft`: the writable fields sent when creating (everything but the id
///   and server-computed columns)
/// - a `Patch`: the same fields, all optional, sent as a partial update
///
/// Entities are replaced wholesale whenever the server returns a new version;
/// nothing mutates them in place.
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Body of a create request; also the value edited by the form dialog
    type Draft: FormData + Clone + fmt::Debug + Default + PartialEq + Send + Sync + 'static;

    /// Body of a partial update request
    type Patch: Serialize + Clone + fmt::Debug + Default + From<Self::Draft> + Send + Sync + 'static;

    /// The path segment used in URLs (e.g., "products", "inventory_adjustment")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "product")
    fn resource_name_singular() -> &'static str;

    /// Human-readable name used in notifications (e.g., "Purchase order")
    fn display_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> EntityId;

    /// Copy the writable fields into a draft, used to pre-fill the edit form
    fn to_draft(&self) -> Self::Draft;

    /// Lower-case plural label used in failure messages (e.g., "purchase orders")
    fn plural_label() -> String {
        crate::core::pluralize::Pluralizer::pluralize(&Self::display_name().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_serializes_as_bare_number() {
        let json = serde_json::to_string(&EntityId(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: EntityId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, EntityId(7));
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::from(15).to_string(), "15");
        assert_eq!(EntityId(3).get(), 3);
    }
}
