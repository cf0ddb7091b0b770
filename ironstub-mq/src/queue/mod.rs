//! Queue lifecycle: available -> outstanding -> deleted / released

mod types;


pub use types::{GetOptions, Leased, QueueInfo, QueueSnapshot, ReleaseOptions};

use chrono::{DateTime, Utc};
use ironstub_core::{MessageIdGenerator, MqError, MqResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::message::{kind_of, normalize_body, Message, DEFAULT_MESSAGE_TIMEOUT_SECS};
use crate::timers::{LeaseToken, TimerRegistry};

/// Release timeout used when none is configured
pub const DEFAULT_RELEASE_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Default)]
struct QueueState {
    available: VecDeque<Message>,
    outstanding: Vec<Message>,
    timers: TimerRegistry,
    total_messages: u64,
}

impl QueueState {
    fn take_outstanding(&mut self, id: &str) -> Option<Message> {
        let index = self.outstanding.iter().position(|m| m.id == id)?;
        Some(self.outstanding.remove(index))
    }

    fn take_available(&mut self, id: &str) -> Option<Message> {
        let index = self.available.iter().position(|m| m.id == id)?;
        self.available.remove(index)
    }

    /// Fired by a release timer once its delay has elapsed
    fn expire(&mut self, queue: &str, id: &str, lease: LeaseToken) {
        if !self.timers.claim(id, lease) {
            return;
        }
        if let Some(message) = self.take_outstanding(id) {
            debug!(queue = %queue, message_id = %id, "Lease expired, message returned to queue");
            self.available.push_back(message);
        }
    }
}

/// Builder for [`Queue`]
#[derive(Debug)]
pub struct QueueBuilder {
    name: String,
    release_timeout_ms: u64,
    message_timeout_secs: u64,
    ids: Option<Arc<MessageIdGenerator>>,
    runtime: Option<Handle>,
}

impl QueueBuilder {
    /// Release timeout in milliseconds. Zero falls back to the default.
    pub fn release_timeout_ms(mut self, ms: u64) -> Self {
        self.release_timeout_ms = if ms == 0 { DEFAULT_RELEASE_TIMEOUT_MS } else { ms };
        self
    }

    /// Lease duration reported in each message's `timeout` field
    pub fn message_timeout_secs(mut self, secs: u64) -> Self {
        self.message_timeout_secs = secs;
        self
    }

    /// Share an id generator, e.g. across all queues of one client
    pub fn id_generator(mut self, ids: Arc<MessageIdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Runtime that drives release timers when a lease is taken outside of
    /// any runtime. Defaults to the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> MqResult<Queue> {
        if self.name.is_empty() {
            return Err(MqError::InvalidQueueName);
        }
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| MqError::NoRuntime)?,
        };

        debug!(queue = %self.name, release_timeout_ms = self.release_timeout_ms, "Creating queue");
        Ok(Queue {
            name: self.name,
            release_timeout: Duration::from_millis(self.release_timeout_ms),
            message_timeout_secs: self.message_timeout_secs,
            ids: self.ids.unwrap_or_default(),
            runtime,
            created_at: Utc::now(),
            state: Arc::new(Mutex::new(QueueState::default())),
        })
    }
}

/// An in-memory queue with lease semantics.
///
/// `get` moves messages from the available pool to the outstanding pool and
/// arms a release timer for each. A leased message leaves the queue for good
/// on `delete`, or goes back to the tail of the available pool on `release`
/// or when its timer fires. Every caller receives copies; nothing returned by
/// the queue aliases its internal state.
///
/// Timers run on a Tokio runtime, so queues have to be built inside one (or
/// be handed a [`Handle`]).
pub struct Queue {
    name: String,
    release_timeout: Duration,
    message_timeout_secs: u64,
    ids: Arc<MessageIdGenerator>,
    runtime: Handle,
    created_at: DateTime<Utc>,
    state: Arc<Mutex<QueueState>>,
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("release_timeout", &self.release_timeout)
            .finish_non_exhaustive()
    }
}

impl Queue {
    pub fn builder(name: impl Into<String>) -> QueueBuilder {
        QueueBuilder {
            name: name.into(),
            release_timeout_ms: DEFAULT_RELEASE_TIMEOUT_MS,
            message_timeout_secs: DEFAULT_MESSAGE_TIMEOUT_SECS,
            ids: None,
            runtime: None,
        }
    }

    /// Create a queue with the default release timeout
    pub fn new(name: impl Into<String>) -> MqResult<Self> {
        Self::builder(name).build()
    }

    /// Create a queue with a release timeout in milliseconds
    pub fn with_release_timeout(name: impl Into<String>, ms: u64) -> MqResult<Self> {
        Self::builder(name).release_timeout_ms(ms).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn release_timeout(&self) -> Duration {
        self.release_timeout
    }

    fn release_timeout_ms(&self) -> u64 {
        u64::try_from(self.release_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Post one message, or an array of them.
    ///
    /// Accepts a string, an object with a `body` field, or an array of
    /// either. Returns the ids of the new messages. Invalid elements of an
    /// array are skipped and reported together once the whole array has been
    /// processed; the valid elements stay queued.
    pub fn post(&self, data: impl Into<Value>) -> MqResult<Vec<String>> {
        let data: Value = data.into();
        let elements = match data {
            Value::Array(elements) => elements,
            single @ (Value::String(_) | Value::Object(_)) => vec![single],
            other => return Err(MqError::InvalidType(kind_of(&other))),
        };

        let mut state = self.state.lock();
        let ids = self.push_all(&mut state, elements)?;
        debug!(queue = %self.name, count = ids.len(), "Posted messages");
        Ok(ids)
    }

    /// Lease up to `options.n` messages from the head of the queue
    pub fn get(&self, options: GetOptions) -> Leased {
        let mut state = self.state.lock();

        let leased = match options.n {
            Some(n) if n > 1 => {
                let count = n.min(state.available.len());
                Leased::Many(
                    (0..count)
                        .filter_map(|_| self.lease_next(&mut state))
                        .collect(),
                )
            }
            _ => Leased::One(self.lease_next(&mut state)),
        };

        debug!(queue = %self.name, count = leased.len(), "Leased messages");
        leased
    }

    /// Delete a message for good.
    ///
    /// Looks in the outstanding pool first, then in the available pool so a
    /// delete that races an auto-release still succeeds.
    pub fn delete(&self, id: &str) -> MqResult<()> {
        let mut state = self.state.lock();

        let found = state
            .take_outstanding(id)
            .or_else(|| state.take_available(id));
        if found.is_none() {
            warn!(queue = %self.name, message_id = %id, "Delete of unknown message");
            return Err(MqError::MessageNotFound {
                id: id.to_string(),
                release_timeout_ms: self.release_timeout_ms(),
            });
        }

        state.timers.cancel(id);
        debug!(queue = %self.name, message_id = %id, "Deleted message");
        Ok(())
    }

    /// Hand a leased message back to the tail of the queue.
    ///
    /// Unknown ids are not an error: releasing always succeeds.
    pub fn release(&self, id: &str, _options: &ReleaseOptions) -> MqResult<()> {
        let mut state = self.state.lock();

        if let Some(message) = state.take_outstanding(id) {
            state.available.push_back(message);
            debug!(queue = %self.name, message_id = %id, "Released message");
        }
        state.timers.cancel(id);
        Ok(())
    }

    /// Extend the lease of an outstanding message by a full release timeout
    pub fn touch(&self, id: &str) -> MqResult<()> {
        let mut state = self.state.lock();

        if !state.outstanding.iter().any(|m| m.id == id) {
            return Err(MqError::MessageNotFound {
                id: id.to_string(),
                release_timeout_ms: self.release_timeout_ms(),
            });
        }

        self.arm_release_timer(&mut state, id);
        debug!(queue = %self.name, message_id = %id, "Touched message");
        Ok(())
    }

    /// Drop every message and cancel every pending timer
    pub fn clear(&self) {
        let mut state = self.state.lock();
        Self::clear_state(&mut state);
        info!(queue = %self.name, "Cleared queue");
    }

    /// Replace the queue's contents with `messages`, which must be an array.
    ///
    /// Elements are accepted in the same shapes as [`Queue::post`].
    pub fn set_messages(&self, messages: impl Into<Value>) -> MqResult<()> {
        let messages: Value = messages.into();
        let Value::Array(elements) = messages else {
            return Err(MqError::InvalidArgument(
                "messages must be an array".to_string(),
            ));
        };

        let mut state = self.state.lock();
        Self::clear_state(&mut state);
        let ids = self.push_all(&mut state, elements)?;
        info!(queue = %self.name, count = ids.len(), "Loaded messages");
        Ok(())
    }

    /// Copy of the available and outstanding messages
    pub fn dump(&self) -> QueueSnapshot {
        let state = self.state.lock();
        QueueSnapshot {
            available: state.available.iter().cloned().collect(),
            outstanding: state.outstanding.clone(),
        }
    }

    /// Copies of up to `n` messages from the head of the queue, without leasing them
    pub fn peek(&self, n: usize) -> Vec<Message> {
        let state = self.state.lock();
        state.available.iter().take(n).cloned().collect()
    }

    pub fn info(&self) -> QueueInfo {
        let state = self.state.lock();
        QueueInfo {
            name: self.name.clone(),
            size: state.available.len(),
            reserved: state.outstanding.len(),
            total_messages: state.total_messages,
            release_timeout_ms: self.release_timeout_ms(),
            created_at: self.created_at,
        }
    }

    /// Number of available messages
    pub fn len(&self) -> usize {
        self.state.lock().available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of leased messages
    pub fn outstanding_len(&self) -> usize {
        self.state.lock().outstanding.len()
    }

    fn clear_state(state: &mut QueueState) {
        state.available.clear();
        state.outstanding.clear();
        state.timers.cancel_all();
    }

    /// Append every valid element, then report the invalid ones together
    fn push_all(&self, state: &mut QueueState, elements: Vec<Value>) -> MqResult<Vec<String>> {
        let mut ids = Vec::with_capacity(elements.len());
        let mut rejected = Vec::new();

        for (index, element) in elements.into_iter().enumerate() {
            match normalize_body(element) {
                Ok(body) => {
                    let id = self.ids.next_id();
                    state
                        .available
                        .push_back(Message::new(id.clone(), body, self.message_timeout_secs));
                    state.total_messages += 1;
                    ids.push(id);
                }
                Err(kind) => {
                    warn!(queue = %self.name, index, kind, "Rejected message");
                    rejected.push(index);
                }
            }
        }

        if rejected.is_empty() {
            Ok(ids)
        } else {
            Err(MqError::InvalidMessages {
                accepted: ids.len(),
                rejected,
            })
        }
    }

    fn lease_next(&self, state: &mut QueueState) -> Option<Message> {
        let message = state.available.pop_front()?;
        self.arm_release_timer(state, &message.id);
        state.outstanding.push(message.clone());
        Some(message)
    }

    fn arm_release_timer(&self, state: &mut QueueState, id: &str) {
        let weak: Weak<Mutex<QueueState>> = Arc::downgrade(&self.state);
        let delay = self.release_timeout;
        let queue = self.name.clone();
        let message_id = id.to_string();
        // Prefer the caller's runtime; the one the queue was built in may have shut down
        let runtime = Handle::try_current().unwrap_or_else(|_| self.runtime.clone());

        state.timers.arm(id, |lease| {
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(state) = weak.upgrade() {
                    state.lock().expire(&queue, &message_id, lease);
                }
            })
        });
    }
}
