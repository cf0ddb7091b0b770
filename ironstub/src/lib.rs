//! ironstub - an in-memory message queue for tests
//!
//! Stands in for a hosted queueing service so queue-based workflows can be
//! exercised without a network:
//!
//! ```rust,no_run
//! use ironstub::prelude::*;
//!
//! # async fn demo() -> Result<(), MqError> {
//! let client = create_client(ClientOptions::default());
//! let queue = client.queue_with_timeout("jobs", 100)?;
//!
//! queue.post("hello")?;
//! if let Some(message) = queue.get(GetOptions::default()).into_one() {
//!     queue.delete(&message.id)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;

pub use crate::client::{create_client, Client};
pub use crate::config::ClientOptions;

pub use ironstub_core::{ErrorCode, MessageIdGenerator, MqError, MqResult};
pub use ironstub_mq::{
    GetOptions, Leased, Message, Queue, QueueBuilder, QueueInfo, QueueSnapshot, ReleaseOptions,
};

pub mod prelude {
    pub use crate::{
        create_client, Client, ClientOptions, GetOptions, Leased, Message, MqError, MqResult,
        Queue, ReleaseOptions,
    };
}
