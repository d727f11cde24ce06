//! # Messaging Module
//!
//! Event bus adapter for the seat lock engine. The bus is a shared fanout
//! exchange; this module owns both directions of traffic across it:
//!
//! - [`envelope`] - the JSON wire format and its typed event decoding
//! - [`bus`] - the [`EventBus`] trait and RabbitMQ implementation
//! - [`in_memory`] - fanout bus for tests and development
//! - [`consumer`] - inbound: bus messages to state actor commands
//! - [`outbound`] - outbound: expired batches to deletes, notifications,
//!   and cancellation publishes

pub mod bus;
pub mod consumer;
pub mod envelope;
pub mod in_memory;
pub mod outbound;

pub use bus::{EventBus, EventBusConfig, MessageStream, RabbitMqEventBus};
pub use consumer::{LockConsumerStats, LockEventConsumer};
pub use envelope::{LockEvent, LockMessage};
pub use in_memory::InMemoryEventBus;
pub use outbound::{CancellationRelay, CancellationRelayStats};
