use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::trie::Trie;
use crate::value::{StateValue, SubscriptionId};

/// Change notification callback.
///
/// Receives the changed path and the new value, or `None` when the slot
/// was removed.
pub type ChangeHandler = Arc<dyn Fn(&str, Option<&StateValue>) + Send + Sync>;

/// Path-addressed observable state.
///
/// - `set` / `remove` replace a slot and notify matching subscribers.
/// - `update` / `update_all` are atomic read-modify-write operations.
/// - `subscribe(pattern, handler)` observes changes via trie patterns.
///
/// Slots live in a `BTreeMap` so prefix scans come back ordered by path.
/// Subscribers are always called after the value lock is released, so a
/// handler may read the store again.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: RwLock<Trie<HandlerEntry>>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: RwLock::new(Trie::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // ====================================================================
    // Reads
    // ====================================================================

    /// Current value at `path` (an `Arc` clone, no data copy).
    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.read_values().get(path).cloned()
    }

    /// Current value at `path` cloned out as `T`.
    ///
    /// `None` if the slot is empty or holds a different type.
    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.cloned::<T>())
    }

    /// Entries strictly below `prefix`, ordered by path.
    ///
    /// `scan("posts")` returns `posts/feed` and `posts/profile/7` but not
    /// `posts` itself.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let start = format!("{prefix}/");
        self.read_values()
            .range(start.clone()..)
            .take_while(|(k, _)| k.starts_with(&start))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.read_values().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.read_values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paths(&self) -> Vec<String> {
        self.read_values().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> Vec<(String, StateValue)> {
        self.read_values()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // ====================================================================
    // Writes
    // ====================================================================

    /// Replace the value at `path` and notify subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    pub fn set_value(&self, path: &str, value: StateValue) {
        self.write_values().insert(path.to_string(), value.clone());
        self.notify(path, Some(&value));
    }

    /// Remove the value at `path`, notifying subscribers with `None`.
    ///
    /// Returns the old value; removing an empty slot notifies nobody.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        let old = self.write_values().remove(path);
        if old.is_some() {
            self.notify(path, None);
        }
        old
    }

    /// Atomically read-modify-write the slot at `path`.
    ///
    /// `f` sees the current value when it holds a `T` (`None` for an empty
    /// slot or another type) and returns `Some(new)` to commit. Nothing is
    /// written or notified when it returns `None`. The whole step runs
    /// under the write lock, so two racing updates never observe the same
    /// starting value.
    ///
    /// Returns whether a value was committed.
    pub fn update<T, F>(&self, path: &str, f: F) -> bool
    where
        T: Any + Send + Sync,
        F: FnOnce(Option<&T>) -> Option<T>,
    {
        let committed = {
            let mut values = self.write_values();
            let current = values.get(path).and_then(|v| v.downcast_ref::<T>());
            match f(current) {
                Some(next) => {
                    let next = StateValue::new(next);
                    values.insert(path.to_string(), next.clone());
                    Some(next)
                }
                None => None,
            }
        };
        match committed {
            Some(value) => {
                self.notify(path, Some(&value));
                true
            }
            None => false,
        }
    }

    /// Apply `f` to every slot strictly below `prefix` that holds a `T`.
    ///
    /// Slots of other types are skipped. Returns how many slots committed.
    pub fn update_all<T, F>(&self, prefix: &str, mut f: F) -> usize
    where
        T: Any + Send + Sync,
        F: FnMut(&str, &T) -> Option<T>,
    {
        let start = format!("{prefix}/");
        let committed: Vec<(String, StateValue)> = {
            let mut values = self.write_values();
            let mut changed = Vec::new();
            for (path, value) in values
                .range(start.clone()..)
                .take_while(|(k, _)| k.starts_with(&start))
            {
                if let Some(next) = value.downcast_ref::<T>().and_then(|cur| f(path, cur)) {
                    changed.push((path.clone(), StateValue::new(next)));
                }
            }
            for (path, value) in &changed {
                values.insert(path.clone(), value.clone());
            }
            changed
        };
        for (path, value) in &committed {
            self.notify(path, Some(value));
        }
        committed.len()
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    /// Observe changes on paths matching `pattern` (`+` / `#` wildcards).
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, Option<&StateValue>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                pattern,
                HandlerEntry {
                    id,
                    handler: Arc::new(handler),
                },
            );
        id
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(pattern, |entry| entry.id == id)
    }

    fn notify(&self, path: &str, value: Option<&StateValue>) {
        let entries = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .matches(path);
        trace!(path, subscribers = entries.len(), "state changed");
        for entry in entries {
            (entry.handler)(path, value);
        }
    }

    fn read_values(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, StateValue>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_values(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, StateValue>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
