//! User-facing notifications emitted by the stores
//!
//! Stores publish a [`Notification`] after every mutation (success or failure)
//! and after every failed fetch. The UI layer subscribes and renders toasts;
//! the stores never wait on it.
//!
//! # Architecture
//!
//! ```text
//! EntityStore<Product> ──┐
//!                        ├──▶ NotificationBus::publish() ──▶ broadcast ──▶ toast layer
//! EntityStore<Customer> ─┘                                           ──▶ audit log, tests
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = NotificationBus::new(256);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(Notification::success("products", "Product created successfully!"));
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{}", envelope.notification.message);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message for the user about the outcome of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Resource the operation targeted (e.g. "products")
    pub entity: String,
    pub message: String,
}

impl Notification {
    pub fn success(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn error(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Envelope wrapping a notification with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    /// Unique notification ID, usable as a toast key
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub notification: Notification,
}

impl NotificationEnvelope {
    pub fn new(notification: Notification) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            notification,
        }
    }
}

/// Broadcast-based notification channel shared by all stores
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<NotificationEnvelope>,
}

impl NotificationBus {
    /// Create a bus buffering up to `capacity` notifications per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a notification to all subscribers
    ///
    /// Never blocks and never fails. Without subscribers the notification is
    /// dropped. Returns the number of receivers reached.
    pub fn publish(&self, notification: Notification) -> usize {
        tracing::trace!(
            entity = %notification.entity,
            level = ?notification.level,
            "publishing notification"
        );
        self.sender
            .send(NotificationEnvelope::new(notification))
            .unwrap_or(0)
    }

    /// Subscribe to notifications published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_constructors() {
        let ok = Notification::success("products", "Product created successfully!");
        assert_eq!(ok.level, NotificationLevel::Success);
        assert!(!ok.is_error());

        let failed = Notification::error("customers", "Failed to fetch customers");
        assert!(failed.is_error());
        assert_eq!(failed.entity, "customers");
    }

    #[test]
    fn test_notification_serializes_level_in_snake_case() {
        let json = serde_json::to_value(Notification::error("products", "boom")).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn test_envelope_has_metadata() {
        let envelope = NotificationEnvelope::new(Notification::success("products", "ok"));
        assert!(!envelope.id.is_nil());
        assert!(envelope.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_bus_publish_subscribe() {
        let bus = NotificationBus::new(16);
        let mut rx = bus.subscribe();

        let receivers = bus.publish(Notification::success("suppliers", "Supplier created successfully!"));
        assert_eq!(receivers, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.notification.message, "Supplier created successfully!");
    }

    #[tokio::test]
    async fn test_bus_multiple_subscribers_share_envelope() {
        let bus = NotificationBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        bus.publish(Notification::error("products", "Failed to delete product"));

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.id, e2.id);
    }

    #[test]
    fn test_bus_publish_without_subscribers() {
        let bus = NotificationBus::default();
        assert_eq!(bus.publish(Notification::success("products", "ok")), 0);
    }

    #[test]
    fn test_bus_clone_shares_channel() {
        let bus = NotificationBus::new(16);
        let _rx = bus.subscribe();

        let other = bus.clone();
        assert_eq!(other.receiver_count(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = NotificationBus::new(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.publish(Notification::success("products", "ok")), 1);
    }
}
