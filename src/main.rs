use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

use txcache::config::Config;
use txcache::console::Console;
use txcache::context::SessionContext;
use txcache::{api, logging};

#[derive(Parser, Debug)]
#[command(name = "txcache")]
#[command(about = "Browse employees and transactions through a lazily invalidated request cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/txcache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Run without a cache store; every request goes to the transport
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;
  if args.no_cache {
    config.cache.enabled = false;
  }

  let _log_guard = logging::init(&config.log)?;
  info!(transport = ?config.transport, cache = ?config.cache, "starting");

  let transport = api::build_transport(&config)?;
  let context = SessionContext::from_config(&config.cache);

  let mut console = Console::new(context, transport, std::io::stdout());
  console.run(BufReader::new(tokio::io::stdin())).await?;

  Ok(())
}
