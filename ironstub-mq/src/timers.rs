//! Per-queue auto-release timers

use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Identifies one lease of a message.
///
/// A message can be leased, released and leased again; each lease gets a
/// fresh token so a timer armed for an old lease can never release a newer one.
pub type LeaseToken = u64;

#[derive(Debug)]
struct TimerEntry {
    lease: LeaseToken,
    handle: JoinHandle<()>,
}

/// Pending auto-release timers keyed by message id.
///
/// Owned by a queue's state and only touched under the queue lock. Timer
/// tasks must call [`TimerRegistry::claim`] before acting, so a timer whose
/// entry was canceled or replaced is a no-op even if its task already woke up.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: HashMap<String, TimerEntry>,
    next_lease: LeaseToken,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for `id`, replacing (and aborting) any existing one.
    ///
    /// `spawn` receives the token of the new lease and returns the task
    /// that fires the timer.
    pub fn arm(
        &mut self,
        id: &str,
        spawn: impl FnOnce(LeaseToken) -> JoinHandle<()>,
    ) -> LeaseToken {
        let lease = self.next_lease;
        self.next_lease += 1;

        let handle = spawn(lease);
        if let Some(previous) = self.timers.insert(id.to_string(), TimerEntry { lease, handle }) {
            previous.handle.abort();
        }
        lease
    }

    /// Cancel the timer for `id`. Returns whether one was pending.
    pub fn cancel(&mut self, id: &str) -> bool {
        match self.timers.remove(id) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called by a firing timer: removes the entry if it still belongs to
    /// `lease` and reports whether the timer may act.
    pub fn claim(&mut self, id: &str, lease: LeaseToken) -> bool {
        match self.timers.get(id) {
            Some(entry) if entry.lease == lease => {
                self.timers.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Cancel every pending timer
    pub fn cancel_all(&mut self) {
        for (_, entry) in self.timers.drain() {
            entry.handle.abort();
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.timers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
