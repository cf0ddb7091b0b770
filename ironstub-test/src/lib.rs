//! Test utilities for ironstub
//!
//! Provides helpers shared by the ironstub test suites:
//! - Install a tracing subscriber once per test binary
//! - Generate queue names that do not collide between tests
//! - Canonical payloads in each accepted message format
//! - Sleep past a release timeout
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ironstub_test::{fixtures, init_tracing, sleep_past, unique_queue_name};
//! use std::time::Duration;
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_release() {
//!     init_tracing();
//!     let name = unique_queue_name("jobs");
//!     let payload = fixtures::text();
//!
//!     // ... lease a message from `name`, then
//!     sleep_past(Duration::from_millis(20)).await;
//! }
//! ```

pub mod fixtures;

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_TEST_FILTER: &str = "ironstub=debug,ironstub_mq=debug";

static TRACING: Once = Once::new();

/// Install a tracing subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| DEFAULT_TEST_FILTER.into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// A queue name with a random suffix, e.g. `jobs-x81KqP0a`
pub fn unique_queue_name(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{prefix}-{suffix}")
}

/// Sleep for twice `release_timeout`, long enough for any lease armed
/// before the call to expire.
pub async fn sleep_past(release_timeout: Duration) {
    tokio::time::sleep(release_timeout * 2).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_queue_names() {
        let a = unique_queue_name("jobs");
        let b = unique_queue_name("jobs");

        assert!(a.starts_with("jobs-"));
        assert_eq!(a.len(), "jobs-".len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_past() {
        let start = tokio::time::Instant::now();
        sleep_past(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
