//! Read-time freshness check for cached payloads.
//!
//! A cached payload is stale when any record it embeds has been marked dirty.
//! Where the records live inside the payload depends on the endpoint's
//! [`PayloadShape`].

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use tracing::debug;

use super::DirtySet;

/// Response layouts the reconciler knows how to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
  /// A JSON array of records, each with a string `id`
  FlatList,
  /// `{ "data": [records], "nextPage": n }`
  Paginated,
  /// Nothing mutable inside; a cached copy is always fresh
  Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
  Fresh,
  Stale,
}

/// Decide whether `payload` can be served from cache.
///
/// Every embedded record id found in `dirty` is removed from it, and the
/// payload is reported stale. When nothing matches, `dirty` is left untouched.
/// Without a dirty set every payload is fresh.
///
/// Fails when the payload does not have the layout `shape` describes.
pub fn reconcile(
  shape: PayloadShape,
  payload: &Value,
  dirty: Option<&dyn DirtySet>,
) -> Result<Freshness> {
  let Some(dirty) = dirty else {
    return Ok(Freshness::Fresh);
  };

  let records = match shape {
    PayloadShape::Opaque => return Ok(Freshness::Fresh),
    PayloadShape::FlatList => payload
      .as_array()
      .ok_or_else(|| eyre!("Cached payload is not a list of records"))?,
    PayloadShape::Paginated => payload
      .get("data")
      .and_then(Value::as_array)
      .ok_or_else(|| eyre!("Cached payload has no paginated data list"))?,
  };

  let mut matched = Vec::new();
  for record in records {
    let id = record_id(record)?;
    if dirty.contains(id) {
      matched.push(id);
    }
  }

  if matched.is_empty() {
    return Ok(Freshness::Fresh);
  }

  for id in &matched {
    dirty.remove(id);
  }
  debug!(consumed = ?matched, "dirty records found in cached payload");

  Ok(Freshness::Stale)
}

fn record_id(record: &Value) -> Result<&str> {
  record
    .get("id")
    .and_then(Value::as_str)
    .ok_or_else(|| eyre!("Cached record has no string id"))
}
