use clap::Parser;
use std::path::PathBuf;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "assetcache")]
#[command(about = "Inspect and maintain a two-tier asset cache directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/assetcache/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cache root, overriding the configuration
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Raise the log level (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = commands::resolve_config(cli.config, cli.cache_dir, cli.verbose)?;

    if let Err(e) = assetcache_utils::tracing::init(config.log_level) {
        eprintln!("Failed to initialize logging: {e}");
    }

    cli.command.execute(config).await
}
