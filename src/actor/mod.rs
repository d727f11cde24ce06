//! # State Actor
//!
//! Single-writer command processing for seat lock records. Every mutation
//! of the lock store flows through one actor task, making arrival order in
//! the inbox the serialization order of the whole service.
//!
//! ## Components
//!
//! - [`commands`] - typed commands, mutation outcomes, processing statistics
//! - [`channels`] - semantic NewType channel wrappers and factory
//! - [`state_actor`] - the actor task and its command handler

pub mod channels;
pub mod commands;
pub mod state_actor;

pub use channels::{
    ChannelFactory, ExpiredBatchReceiver, ExpiredBatchSender, LockCommandReceiver,
    LockCommandSender,
};
pub use commands::{
    CommandResponder, ExpiredBatch, LockCommand, LockKey, LockProcessingStats, MutationOutcome,
};
pub use state_actor::StateActor;
