//! Core types for ironstub
//!
//! This crate provides the error taxonomy, message id generation and the
//! name-keyed store used by the queue crates.

pub mod error;
pub mod message_id;
pub mod registry;

pub use error::{ErrorCode, MqError, MqResult};
pub use message_id::MessageIdGenerator;
pub use registry::NamedStore;
