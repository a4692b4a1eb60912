//! Loading flag and error surfacing around a single request.

use color_eyre::{Report, Result};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{error, warn};

/// Receives errors swallowed by [`RequestState::run`].
pub trait ErrorSink: Send + Sync {
  fn report(&self, error: &Report);
}

/// Sink that only logs.
#[derive(Debug, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
  fn report(&self, error: &Report) {
    error!(error = %error, "request failed");
  }
}

/// Sink that keeps the most recent error message for display.
#[derive(Debug, Default)]
pub struct LastError {
  message: Mutex<Option<String>>,
}

impl LastError {
  pub fn new() -> Self {
    Self::default()
  }

  /// Take the pending message, leaving none behind.
  pub fn take(&self) -> Option<String> {
    self
      .message
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take()
  }
}

impl ErrorSink for LastError {
  fn report(&self, error: &Report) {
    warn!(error = %error, "request failed");
    *self.message.lock().unwrap_or_else(PoisonError::into_inner) = Some(error.to_string());
  }
}

/// Tracks whether a request is in flight and turns failures into `None`.
///
/// The flag belongs to this wrapper (and its clones), not to the process:
/// two overlapping requests through the same wrapper share one flag.
#[derive(Clone)]
pub struct RequestState {
  loading: Arc<watch::Sender<bool>>,
  errors: Arc<dyn ErrorSink>,
}

impl RequestState {
  pub fn new(errors: Arc<dyn ErrorSink>) -> Self {
    let (loading, _) = watch::channel(false);
    Self {
      loading: Arc::new(loading),
      errors,
    }
  }

  pub fn loading(&self) -> bool {
    *self.loading.borrow()
  }

  /// Run `operation` with the loading flag raised.
  ///
  /// Errors are reported to the sink and yield `None`, so `None` means
  /// "failed, already reported".
  pub async fn run<T, Fut>(&self, operation: Fut) -> Option<T>
  where
    Fut: Future<Output = Result<T>>,
  {
    let _loading = LoadingGuard::raise(&self.loading);

    match operation.await {
      Ok(data) => Some(data),
      Err(error) => {
        self.errors.report(&error);
        None
      }
    }
  }
}

/// Lowers the loading flag when dropped, including when the request future
/// itself is dropped mid-flight.
struct LoadingGuard<'a> {
  flag: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
  fn raise(flag: &'a watch::Sender<bool>) -> Self {
    flag.send_replace(true);
    Self { flag }
  }
}

impl Drop for LoadingGuard<'_> {
  fn drop(&mut self) {
    self.flag.send_replace(false);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use color_eyre::eyre::eyre;
  use std::time::Duration;

  fn state() -> (RequestState, Arc<LastError>) {
    let errors = Arc::new(LastError::new());
    (RequestState::new(errors.clone()), errors)
  }

  #[tokio::test]
  async fn test_loading_raised_only_while_running() {
    let (state, errors) = state();
    assert!(!state.loading());

    let probe = state.clone();
    let seen = state
      .run(async move { Ok::<_, Report>(probe.loading()) })
      .await;

    assert_eq!(seen, Some(true));
    assert!(!state.loading());
    assert!(errors.take().is_none());
  }

  #[tokio::test]
  async fn test_failure_is_reported_and_swallowed() {
    let (state, errors) = state();

    let result: Option<u32> = state.run(async { Err(eyre!("network down")) }).await;

    assert!(result.is_none());
    assert!(!state.loading());
    assert_eq!(errors.take().as_deref(), Some("network down"));
    assert!(errors.take().is_none());
  }

  #[tokio::test]
  async fn test_dropped_request_lowers_flag() {
    let (state, _errors) = state();

    let pending = state.run(futures::future::pending::<Result<()>>());
    let outcome = tokio::time::timeout(Duration::from_millis(10), pending).await;

    assert!(outcome.is_err());
    assert!(!state.loading());
  }
}
