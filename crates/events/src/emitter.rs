//! Fire-and-forget notification emission.
//!
//! Business services hand named notifications to an [`EventEmitter`] and move
//! on. Delivery is best effort: an emitter never reports failure back to the
//! caller, so a broken sink cannot fail the operation that produced the
//! notification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::bus::EventBus;
use crate::event::Event;

/// Notification collaborator consumed by business services.
pub trait EventEmitter: Send + Sync {
    /// Emit `event_name` with `payload`. Never fails from the caller's view.
    fn emit(&self, event_name: &str, payload: JsonValue);
}

impl<E> EventEmitter for Arc<E>
where
    E: EventEmitter + ?Sized,
{
    fn emit(&self, event_name: &str, payload: JsonValue) {
        (**self).emit(event_name, payload)
    }
}

/// A named notification as it travels over a bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub name: String,
    pub payload: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

impl NotificationMessage {
    pub fn new(name: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            name: name.into(),
            payload,
            occurred_at: Utc::now(),
        }
    }
}

impl Event for NotificationMessage {
    fn event_type(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Emitter that publishes onto an [`EventBus`].
///
/// Publish errors are logged and dropped.
#[derive(Debug)]
pub struct BusEventEmitter<B> {
    bus: B,
}

impl<B> BusEventEmitter<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B> EventEmitter for BusEventEmitter<B>
where
    B: EventBus<NotificationMessage>,
{
    fn emit(&self, event_name: &str, payload: JsonValue) {
        let message = NotificationMessage::new(event_name, payload);
        if let Err(err) = self.bus.publish(message) {
            tracing::warn!(event = event_name, error = ?err, "dropping notification: publish failed");
        }
    }
}

/// Emitter that discards everything (wiring without a sink).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit(&self, event_name: &str, _payload: JsonValue) {
        tracing::trace!(event = event_name, "notification discarded");
    }
}
