//! Fetch orchestration: the cache read path, the uncached path, and the
//! invalidation entry points.

mod request;

pub use request::{ErrorSink, LastError, RequestState, TracingErrorSink};

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{Endpoint, Transport};
use crate::cache::{build_key, key_belongs_to, reconcile, CacheStore, DirtySet, Freshness};
use crate::context::SessionContext;

/// `params` argument for endpoints called without parameters.
pub const NO_PARAMS: Option<&()> = None;

/// Fetcher that memoizes responses in the session's cache store.
///
/// Cached entries are served until invalidated, or until a record they embed
/// is marked dirty; such an entry is re-fetched on its next read. Concurrent
/// misses on the same key are not coalesced: each one calls the transport and
/// the last write wins.
#[derive(Clone)]
pub struct CustomFetch {
  cache: Option<Arc<dyn CacheStore>>,
  dirty: Option<Arc<dyn DirtySet>>,
  transport: Arc<dyn Transport>,
  request: RequestState,
}

impl CustomFetch {
  pub fn new(context: &SessionContext, transport: Arc<dyn Transport>) -> Self {
    Self {
      cache: context.cache.clone(),
      dirty: context.dirty.clone(),
      transport,
      request: RequestState::new(context.errors.clone()),
    }
  }

  /// Whether a request started through this fetcher is in flight.
  pub fn loading(&self) -> bool {
    self.request.loading()
  }

  /// Fetch through the cache.
  ///
  /// 1. Miss: call the transport and store the response
  /// 2. Hit: reconcile against the dirty set
  /// 3. Fresh hit: return the cached response
  /// 4. Stale hit: call the transport and overwrite the entry
  ///
  /// Returns `None` when the request failed; the error has been reported.
  pub async fn fetch_cached<T, P>(&self, endpoint: Endpoint, params: Option<&P>) -> Option<T>
  where
    T: DeserializeOwned,
    P: Serialize + ?Sized,
  {
    self.request.run(self.cached(endpoint, params)).await
  }

  /// Fetch straight from the transport, never touching the cache.
  pub async fn fetch_uncached<T, P>(&self, endpoint: Endpoint, params: Option<&P>) -> Option<T>
  where
    T: DeserializeOwned,
    P: Serialize + ?Sized,
  {
    self
      .request
      .run(async {
        let params = to_params(params)?;
        let value = self.transport.call(endpoint, params).await?;
        decode(endpoint, value)
      })
      .await
  }

  /// Drop every cached entry.
  pub fn invalidate_all(&self) {
    if let Some(cache) = &self.cache {
      cache.clear();
      info!("cache cleared");
    }
  }

  /// Drop every cached entry of the given endpoints, returning how many went.
  pub fn invalidate_by_endpoints(&self, endpoints: &[Endpoint]) -> usize {
    let Some(cache) = &self.cache else {
      return 0;
    };

    let mut removed = 0;
    for key in cache.keys() {
      if endpoints.iter().any(|e| key_belongs_to(&key, *e)) && cache.delete(&key) {
        removed += 1;
      }
    }

    info!(?endpoints, removed, "cache entries invalidated");
    removed
  }

  /// Record that `record_id` changed remotely, so cached payloads embedding
  /// it are re-fetched on their next read.
  pub fn mark_dirty(&self, record_id: &str) {
    if let Some(dirty) = &self.dirty {
      dirty.insert(record_id);
      info!(record_id, "record marked dirty");
    }
  }

  async fn cached<T, P>(&self, endpoint: Endpoint, params: Option<&P>) -> Result<T>
  where
    T: DeserializeOwned,
    P: Serialize + ?Sized,
  {
    let params = to_params(params)?;

    let Some(cache) = &self.cache else {
      let value = self.transport.call(endpoint, params).await?;
      return decode(endpoint, value);
    };

    let key = build_key(endpoint, params.as_ref());
    let mut stale = false;

    if let Some(cached) = cache.get(&key) {
      let payload: Value = serde_json::from_str(&cached)
        .map_err(|e| eyre!("Failed to parse cached entry {}: {}", key, e))?;

      match reconcile(endpoint.shape(), &payload, self.dirty.as_deref())
        .map_err(|e| eyre!("Malformed cached entry {}: {}", key, e))?
      {
        Freshness::Fresh => {
          debug!(%key, "cache hit");
          return decode(endpoint, payload);
        }
        Freshness::Stale => {
          debug!(%key, "cache entry stale, re-fetching");
          stale = true;
        }
      }
    } else {
      debug!(%key, "cache miss");
    }

    let value = match self.transport.call(endpoint, params).await {
      Ok(value) => value,
      Err(e) => {
        // Reconciliation already consumed the dirty markers; the old entry
        // must not be served as fresh afterwards
        if stale && cache.delete(&key) {
          debug!(%key, "stale entry dropped after failed re-fetch");
        }
        return Err(e);
      }
    };
    cache.set(&key, value.to_string());
    decode(endpoint, value)
  }
}

fn to_params<P: Serialize + ?Sized>(params: Option<&P>) -> Result<Option<Value>> {
  params
    .map(serde_json::to_value)
    .transpose()
    .map_err(|e| eyre!("Failed to serialize request parameters: {}", e))
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, value: Value) -> Result<T> {
  serde_json::from_value(value).map_err(|e| eyre!("Unexpected {} response: {}", endpoint, e))
}
