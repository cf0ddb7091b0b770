//! Client: creates and shares queues by name

use ironstub_core::{MessageIdGenerator, MqError, MqResult, NamedStore};
use ironstub_mq::Queue;
use std::sync::Arc;
use tracing::info;

use crate::config::ClientOptions;

/// Create a client from options
pub fn create_client(options: ClientOptions) -> Client {
    Client::new(options)
}

/// Entry point for working with queues.
///
/// Each name maps to a single queue for the lifetime of the client, so every
/// holder of that name sees the same messages. All queues of a client draw
/// message ids from one generator.
pub struct Client {
    options: ClientOptions,
    ids: Arc<MessageIdGenerator>,
    queues: NamedStore<Queue>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl Client {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            ids: Arc::new(MessageIdGenerator::new()),
            queues: NamedStore::new(),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Get the queue called `name`, creating it with the configured release
    /// timeout on first use
    pub fn queue(&self, name: &str) -> MqResult<Arc<Queue>> {
        self.queue_with_timeout(name, self.options.release_timeout_ms)
    }

    /// Get the queue called `name`, creating it with `release_timeout_ms` on
    /// first use. An existing queue keeps the timeout it was created with.
    pub fn queue_with_timeout(&self, name: &str, release_timeout_ms: u64) -> MqResult<Arc<Queue>> {
        if name.is_empty() {
            return Err(MqError::InvalidQueueName);
        }

        self.queues.get_or_try_insert(name, || {
            info!(queue = %name, release_timeout_ms, "Creating queue");
            Queue::builder(name)
                .release_timeout_ms(release_timeout_ms)
                .message_timeout_secs(self.options.message_timeout_secs)
                .id_generator(Arc::clone(&self.ids))
                .build()
        })
    }

    /// Names of all queues created so far, sorted
    pub fn queue_names(&self) -> Vec<String> {
        self.queues.names()
    }

    /// Clear the queue called `name` and forget it. Returns whether it existed.
    pub fn delete_queue(&self, name: &str) -> bool {
        match self.queues.remove(name) {
            Some(queue) => {
                queue.clear();
                info!(queue = %name, "Deleted queue");
                true
            }
            None => false,
        }
    }
}
