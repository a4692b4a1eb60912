//! Session-wide state shared by every fetcher.

use std::sync::Arc;

use crate::cache::{CacheStore, DirtySet, MemoryCacheStore, MemoryDirtySet};
use crate::config::CacheConfig;
use crate::fetch::{ErrorSink, TracingErrorSink};

/// Collaborators that outlive any single fetcher.
///
/// A missing `cache` disables caching (every fetch goes to the transport);
/// a missing `dirty` set means cached entries are never considered stale.
#[derive(Clone)]
pub struct SessionContext {
  pub cache: Option<Arc<dyn CacheStore>>,
  pub dirty: Option<Arc<dyn DirtySet>>,
  pub errors: Arc<dyn ErrorSink>,
}

impl SessionContext {
  /// In-memory store and dirty set, errors go to the log.
  pub fn new() -> Self {
    Self {
      cache: Some(Arc::new(MemoryCacheStore::new())),
      dirty: Some(Arc::new(MemoryDirtySet::new())),
      errors: Arc::new(TracingErrorSink),
    }
  }

  /// No store and no dirty set.
  pub fn detached() -> Self {
    Self {
      cache: None,
      dirty: None,
      errors: Arc::new(TracingErrorSink),
    }
  }

  pub fn from_config(config: &CacheConfig) -> Self {
    let context = Self::new();
    Self {
      cache: context.cache.filter(|_| config.enabled),
      dirty: context.dirty.filter(|_| config.track_dirty),
      errors: context.errors,
    }
  }

  pub fn with_errors(mut self, errors: Arc<dyn ErrorSink>) -> Self {
    self.errors = errors;
    self
  }

  /// Number of cached entries, zero when caching is disabled.
  pub fn cached_entries(&self) -> usize {
    self.cache.as_ref().map_or(0, |cache| cache.keys().len())
  }

  /// Number of records marked dirty, zero when dirty tracking is off.
  pub fn dirty_records(&self) -> usize {
    self.dirty.as_ref().map_or(0, |dirty| dirty.len())
  }
}

impl Default for SessionContext {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_config_disables_collaborators() {
    let context = SessionContext::from_config(&CacheConfig {
      enabled: false,
      track_dirty: true,
    });
    assert!(context.cache.is_none());
    assert!(context.dirty.is_some());

    let context = SessionContext::from_config(&CacheConfig {
      enabled: true,
      track_dirty: false,
    });
    assert!(context.cache.is_some());
    assert!(context.dirty.is_none());
  }

  #[test]
  fn test_clones_share_stores() {
    let context = SessionContext::new();
    let other = context.clone();

    other.cache.as_ref().unwrap().set("employees", "[]".to_string());
    other.dirty.as_ref().unwrap().insert("txn-01");
    assert_eq!(context.cached_entries(), 1);
    assert_eq!(context.dirty_records(), 1);
  }

  #[test]
  fn test_detached_has_nothing() {
    let context = SessionContext::detached();
    assert!(context.cache.is_none());
    assert!(context.dirty.is_none());
    assert_eq!(context.cached_entries(), 0);
    assert_eq!(context.dirty_records(), 0);
  }
}
