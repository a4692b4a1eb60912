use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Which transport serves requests
  pub transport: TransportKind,
  pub http: HttpConfig,
  pub mock: MockConfig,
  pub cache: CacheConfig,
  pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
  /// Built-in data set, no network
  #[default]
  Mock,
  /// JSON over HTTP against `http.base_url`
  Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
  pub base_url: Option<String>,
  pub timeout_secs: u64,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      base_url: None,
      timeout_secs: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockConfig {
  /// Simulated round-trip time per request
  pub latency_ms: u64,
  /// Transactions per page
  pub page_size: usize,
}

impl Default for MockConfig {
  fn default() -> Self {
    Self {
      latency_ms: 300,
      page_size: 5,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// When false no cache store is attached and every fetch hits the transport
  pub enabled: bool,
  /// When false no dirty set is attached and cached entries never go stale
  pub track_dirty: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      track_dirty: true,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Filter directive used when TXCACHE_LOG is unset
  pub level: String,
  /// Log directory (default: $XDG_DATA_HOME/txcache)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      dir: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./txcache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/txcache/config.yaml
  ///
  /// Falls back to defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("txcache.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("txcache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Base URL of the HTTP backend.
  ///
  /// TXCACHE_BASE_URL takes precedence over `http.base_url`.
  pub fn base_url(&self) -> Result<String> {
    std::env::var("TXCACHE_BASE_URL")
      .ok()
      .or_else(|| self.http.base_url.clone())
      .ok_or_else(|| {
        eyre!("HTTP transport needs a base URL. Set http.base_url or TXCACHE_BASE_URL.")
      })
  }
}
