//! Event and notification plumbing.
//!
//! - [`EventBus`]: transport-agnostic pub/sub
//! - [`EventEmitter`]: fire-and-forget notifications for business services

pub mod bus;
pub mod emitter;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use emitter::{BusEventEmitter, EventEmitter, NoopEventEmitter, NotificationMessage};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
