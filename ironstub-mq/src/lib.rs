//! In-memory message queue for ironstub
//!
//! Emulates the message lifecycle of a hosted queue:
//! - post messages (strings, `{"body": ...}` objects, or arrays of both)
//! - lease them with `get`, starting a release timer per message
//! - acknowledge with `delete`, hand back with `release`, extend with `touch`
//! - leased messages that are never acknowledged return to the queue when
//!   the release timeout elapses

pub mod message;
pub mod queue;
mod timers;

pub use message::Message;
pub use queue::{GetOptions, Leased, Queue, QueueBuilder, QueueInfo, QueueSnapshot, ReleaseOptions};
pub use timers::{LeaseToken, TimerRegistry};
