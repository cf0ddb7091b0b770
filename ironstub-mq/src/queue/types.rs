//! Option and result types for queue operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Message;

/// Options for [`Queue::get`](super::Queue::get)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOptions {
    /// Maximum number of messages to lease. Absent, 0 or 1 selects the
    /// single-message result shape.
    pub n: Option<usize>,
}

impl GetOptions {
    pub fn n(n: usize) -> Self {
        Self { n: Some(n) }
    }
}

/// Messages leased by a `get` call
#[derive(Debug, Clone, PartialEq)]
pub enum Leased {
    /// Result of a single-message get; `None` when nothing was available
    One(Option<Message>),
    /// Result of a multi-message get; empty when nothing was available
    Many(Vec<Message>),
}

impl Leased {
    /// The leased message of a single-message get.
    ///
    /// On a multi-message result this yields the first message only; the
    /// others stay leased until deleted, released or expired. Use
    /// [`Leased::into_vec`] to keep them all.
    pub fn into_one(self) -> Option<Message> {
        match self {
            Self::One(message) => message,
            Self::Many(messages) => messages.into_iter().next(),
        }
    }

    /// All leased messages, whatever the shape
    pub fn into_vec(self) -> Vec<Message> {
        match self {
            Self::One(message) => message.into_iter().collect(),
            Self::Many(messages) => messages,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(message) => usize::from(message.is_some()),
            Self::Many(messages) => messages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Options for [`Queue::release`](super::Queue::release)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOptions {
    /// Accepted for API compatibility; releases are always immediate.
    pub delay: Option<u64>,
}

/// Copy of a queue's contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub available: Vec<Message>,
    pub outstanding: Vec<Message>,
}

/// Queue metadata in the shape the hosted service reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueInfo {
    pub name: String,
    /// Messages available for leasing
    pub size: usize,
    /// Messages currently leased
    pub reserved: usize,
    /// Messages ever posted to the queue
    pub total_messages: u64,
    pub release_timeout_ms: u64,
    pub created_at: DateTime<Utc>,
}
