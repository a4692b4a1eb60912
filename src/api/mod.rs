//! Endpoint registry, response types, and the transports that reach them.

mod endpoint;
pub mod http;
pub mod mock;
mod transport;
pub mod types;

pub use endpoint::Endpoint;
pub use transport::Transport;

use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, TransportKind};
use self::http::HttpTransport;
use self::mock::MockTransport;

/// Build the transport selected by the configuration.
pub fn build_transport(config: &Config) -> Result<Arc<dyn Transport>> {
  match config.transport {
    TransportKind::Mock => Ok(Arc::new(MockTransport::from_config(&config.mock))),
    TransportKind::Http => {
      let base_url = config.base_url()?;
      let timeout = Duration::from_secs(config.http.timeout_secs);
      Ok(Arc::new(HttpTransport::new(&base_url, timeout)?))
    }
  }
}
