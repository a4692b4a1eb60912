use color_eyre::Result;
use futures::future::BoxFuture;
use serde_json::Value;

use super::Endpoint;

/// Performs the remote call behind an endpoint.
///
/// Responses come back as raw JSON; callers decode them into the endpoint's
/// response type. Failures are returned as errors and never retried here.
/// Timeouts are the implementation's business.
pub trait Transport: Send + Sync {
  fn call(&self, endpoint: Endpoint, params: Option<Value>) -> BoxFuture<'_, Result<Value>>;
}
