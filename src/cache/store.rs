//! Collaborator stores the cache reads and writes through.
//!
//! Both are owned by the session, not by the fetcher; see
//! [`SessionContext`](crate::context::SessionContext).

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mapping from cache key to serialized response.
pub trait CacheStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;

  fn set(&self, key: &str, payload: String);

  /// Remove one entry, returning whether it existed.
  fn delete(&self, key: &str) -> bool;

  fn keys(&self) -> Vec<String>;

  /// Replace the contents with an empty mapping.
  fn clear(&self);
}

/// Ids of records mutated since they were last fetched.
pub trait DirtySet: Send + Sync {
  fn contains(&self, id: &str) -> bool;

  fn insert(&self, id: &str);

  /// Remove one id, returning whether it was present.
  fn remove(&self, id: &str) -> bool;

  fn len(&self) -> usize;
}

/// In-memory [`CacheStore`].
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries().is_empty()
  }

  // A panic while holding the lock cannot leave a HashMap half-updated
  fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CacheStore for MemoryCacheStore {
  fn get(&self, key: &str) -> Option<String> {
    self.entries().get(key).cloned()
  }

  fn set(&self, key: &str, payload: String) {
    self.entries().insert(key.to_string(), payload);
  }

  fn delete(&self, key: &str) -> bool {
    self.entries().remove(key).is_some()
  }

  fn keys(&self) -> Vec<String> {
    self.entries().keys().cloned().collect()
  }

  fn clear(&self) {
    *self.entries() = HashMap::new();
  }
}

/// In-memory [`DirtySet`].
#[derive(Debug, Default)]
pub struct MemoryDirtySet {
  ids: Mutex<HashSet<String>>,
}

impl MemoryDirtySet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.ids().is_empty()
  }

  fn ids(&self) -> MutexGuard<'_, HashSet<String>> {
    self.ids.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl DirtySet for MemoryDirtySet {
  fn contains(&self, id: &str) -> bool {
    self.ids().contains(id)
  }

  fn insert(&self, id: &str) {
    self.ids().insert(id.to_string());
  }

  fn remove(&self, id: &str) -> bool {
    self.ids().remove(id)
  }

  fn len(&self) -> usize {
    self.ids().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_store_set_get_delete() {
    let store = MemoryCacheStore::new();
    assert!(store.get("employees").is_none());

    store.set("employees", "[]".to_string());
    store.set("employees", "[1]".to_string());
    assert_eq!(store.get("employees").as_deref(), Some("[1]"));
    assert_eq!(store.len(), 1);

    assert!(store.delete("employees"));
    assert!(!store.delete("employees"));
    assert!(store.is_empty());
  }

  #[test]
  fn test_store_clear() {
    let store = MemoryCacheStore::new();
    store.set("a", "1".to_string());
    store.set("b", "2".to_string());

    let mut keys = store.keys();
    keys.sort();
    assert_eq!(keys, vec!["a", "b"]);

    store.clear();
    assert!(store.is_empty());
    assert!(store.keys().is_empty());
  }

  #[test]
  fn test_dirty_set() {
    let dirty = MemoryDirtySet::new();
    dirty.insert("txn-1");
    dirty.insert("txn-1");
    assert_eq!(dirty.len(), 1);
    assert!(dirty.contains("txn-1"));

    assert!(dirty.remove("txn-1"));
    assert!(!dirty.remove("txn-1"));
    assert!(dirty.is_empty());
  }
}
