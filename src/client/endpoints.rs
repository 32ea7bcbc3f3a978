//! URL paths of the back-office REST service
//!
//! Every path carries a trailing slash; the service redirects without it.

use crate::core::entity::EntityId;

pub const AUTH_TOKEN: &str = "/auth/token/";
pub const AUTH_TOKEN_REFRESH: &str = "/auth/token/refresh/";

/// `/{resource}/`
pub fn collection(resource: &str) -> String {
    format!("/{}/", resource)
}

/// `/{resource}/{id}/`
pub fn item(resource: &str, id: EntityId) -> String {
    format!("/{}/{}/", resource, id)
}

/// `/{resource}/{id}/{action}/`
pub fn item_action(resource: &str, id: EntityId, action: &str) -> String {
    format!("/{}/{}/{}/", resource, id, action)
}

/// `/{resource}/{action}/`
pub fn collection_action(resource: &str, action: &str) -> String {
    format!("/{}/{}/", resource, action)
}
