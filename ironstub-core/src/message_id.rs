//! Message ID generation

use std::sync::atomic::{AtomicU64, Ordering};

/// Numeric prefix shared by every generated id, in the style of the large
/// decimal ids handed out by the hosted service.
pub const BASE_ID: u64 = 5_940_635_112_690_500_000;

/// Hands out unique, monotonically increasing message ids.
///
/// Every id is `BASE_ID + n` rendered in decimal. All ids have the same
/// number of digits, so string order matches generation order.
///
/// Ids are unique only within one generator. Separate generators (for
/// instance two clients in the same process) hand out the same sequence, so
/// ids from different clients must not be compared with each other.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    next: AtomicU64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator whose first id is `BASE_ID + offset` (for testing)
    pub fn starting_at(offset: u64) -> Self {
        Self {
            next: AtomicU64::new(offset),
        }
    }

    /// Generate the next id
    pub fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        (BASE_ID + n).to_string()
    }

    /// Number of ids generated so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let ids = MessageIdGenerator::new();

        let first = ids.next_id();
        let second = ids.next_id();

        assert_eq!(first, "5940635112690500000");
        assert_eq!(second, "5940635112690500001");
        assert!(first < second);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_ids_are_decimal() {
        let ids = MessageIdGenerator::starting_at(998);
        for _ in 0..4 {
            let id = ids.next_id();
            assert_eq!(id.len(), 19);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generators_are_independent() {
        let a = MessageIdGenerator::new();
        let b = MessageIdGenerator::new();

        assert_eq!(a.next_id(), b.next_id());
    }

    #[test]
    fn test_concurrent_generation_never_collides() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(MessageIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
