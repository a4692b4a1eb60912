//! Request cache building blocks.
//!
//! This module is transport-agnostic and provides:
//! - A deterministic cache key per (endpoint, params)
//! - The store and dirty-set collaborator traits, with in-memory implementations
//! - Read-time reconciliation of cached payloads against dirty record ids
//!
//! Entries never expire on their own; they go away through explicit
//! invalidation or get replaced when a stale entry is re-fetched.

mod key;
mod reconcile;
mod store;

pub use key::{build_key, key_belongs_to};
pub use reconcile::{reconcile, Freshness, PayloadShape};
pub use store::{CacheStore, DirtySet, MemoryCacheStore, MemoryDirtySet};
