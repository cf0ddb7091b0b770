//! Name-keyed shared state

use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe store handing out one shared instance per name
pub struct NamedStore<T> {
    data: DashMap<String, Arc<T>>,
}

impl<T> Default for NamedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NamedStore<T> {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Get the instance registered under `name`, building it on first use.
    ///
    /// `build` runs at most once per name; if it fails nothing is stored.
    pub fn get_or_try_insert<E>(
        &self,
        name: &str,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(existing) = self.data.get(name) {
            return Ok(Arc::clone(existing.value()));
        }

        let entry = self.data.entry(name.to_string());
        match entry {
            dashmap::mapref::entry::Entry::Occupied(occupied) => Ok(Arc::clone(occupied.get())),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let value = Arc::new(build()?);
                vacant.insert(Arc::clone(&value));
                Ok(value)
            }
        }
    }

    /// Get the instance for a name if it exists
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.data.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.data.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Remove the instance for a name
    pub fn remove(&self, name: &str) -> Option<Arc<T>> {
        self.data.remove(name).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TestState {
        counter: AtomicUsize,
    }

    #[test]
    fn test_same_name_returns_same_instance() {
        let store: NamedStore<TestState> = NamedStore::new();

        let first = store
            .get_or_try_insert("jobs", || Ok::<_, ()>(TestState::default()))
            .unwrap();
        first.counter.store(42, Ordering::SeqCst);

        let second = store
            .get_or_try_insert("jobs", || Ok::<_, ()>(TestState::default()))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.counter.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_different_names() {
        let store: NamedStore<TestState> = NamedStore::new();

        store
            .get_or_try_insert("b", || Ok::<_, ()>(TestState::default()))
            .unwrap();
        store
            .get_or_try_insert("a", || Ok::<_, ()>(TestState::default()))
            .unwrap();

        assert_eq!(store.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failed_build_stores_nothing() {
        let store: NamedStore<TestState> = NamedStore::new();

        let result = store.get_or_try_insert("broken", || Err("nope"));
        assert_eq!(result.err(), Some("nope"));
        assert!(store.get("broken").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove() {
        let store: NamedStore<TestState> = NamedStore::new();
        store
            .get_or_try_insert("jobs", || Ok::<_, ()>(TestState::default()))
            .unwrap();

        assert!(store.remove("jobs").is_some());
        assert!(store.get("jobs").is_none());
    }
}
