use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install a subscriber writing to a daily log file.
///
/// Logs go to a file so they never interleave with console output. The
/// returned guard flushes pending lines when dropped; keep it alive for the
/// lifetime of the program.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let dir = match &config.dir {
    Some(dir) => dir.clone(),
    None => default_dir()?,
  };

  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "txcache.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter =
    EnvFilter::try_from_env("TXCACHE_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialise logging: {}", e))?;

  Ok(guard)
}

fn default_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("txcache"))
}
