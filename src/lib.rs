//! Client-side request cache with explicit, lazy invalidation.
//!
//! Responses of a small registry of remote endpoints are memoized per
//! (endpoint, params). Mutations mark the ids of the records they touch as
//! dirty; a cached payload embedding a dirty record is re-fetched on its next
//! read, everything else is served from memory until invalidated.

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod console;
pub mod context;
pub mod fetch;
pub mod logging;
pub mod queries;
