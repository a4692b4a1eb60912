//! Transport that talks to a JSON-over-HTTP backend.
//!
//! Every endpoint is a `POST <base_url>/<endpoint name>` whose body is the
//! request parameters (an empty object when there are none).

use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{Endpoint, Transport};

#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpTransport {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let mut base_url =
      Url::parse(base_url).map_err(|e| eyre!("Invalid base URL {}: {}", base_url, e))?;

    // Url::join replaces the last path segment unless the base ends in '/'
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base_url })
  }

  fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
    self
      .base_url
      .join(endpoint.as_str())
      .map_err(|e| eyre!("Failed to build URL for {}: {}", endpoint, e))
  }

  async fn post(&self, endpoint: Endpoint, params: Option<Value>) -> Result<Value> {
    let url = self.endpoint_url(endpoint)?;
    let body = params.unwrap_or_else(|| Value::Object(Default::default()));
    debug!(%url, "http request");

    let response = self
      .client
      .post(url)
      .json(&body)
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", endpoint, e))?;

    let status = response.status();
    let bytes = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read {} response: {}", endpoint, e))?;

    if !status.is_success() {
      return Err(eyre!(
        "{} returned {}: {}",
        endpoint,
        status,
        String::from_utf8_lossy(&bytes).trim()
      ));
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| eyre!("Failed to parse {} response: {}", endpoint, e))
  }
}

impl Transport for HttpTransport {
  fn call(&self, endpoint: Endpoint, params: Option<Value>) -> BoxFuture<'_, Result<Value>> {
    self.post(endpoint, params).boxed()
  }
}
