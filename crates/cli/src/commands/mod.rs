use assetcache_cache::AssetCache;
use assetcache_config::{AssetCacheConfig, ConfigLoader, ConfigSource};
use clap::Subcommand;
use std::path::PathBuf;
use std::time::Duration;

mod asset;
mod maintenance;

/// How long a command waits for background writes before exiting
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up an asset and print its metadata
    Get {
        /// Asset id
        id: String,
        /// Write the payload to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Cache the contents of a file as an asset
    Put {
        /// Asset id
        id: String,
        /// File holding the payload
        file: PathBuf,
        /// Human readable name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Numeric asset type
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        asset_type: i8,
    },

    /// Remove an asset from the cache
    Expire {
        /// Asset id
        id: String,
    },

    /// Remove every cached asset
    Clear,

    /// Delete files idle longer than the configured file timeout
    Sweep,

    /// Show cache settings and disk usage
    Stats,

    /// Print the file an asset id maps to
    Path {
        /// Asset id
        id: String,
    },
}

impl Commands {
    pub async fn execute(self, config: AssetCacheConfig) -> eyre::Result<()> {
        match self {
            Commands::Path { id } => {
                println!(
                    "{}",
                    assetcache_cache::map_to_path(&config.cache_directory, &id).display()
                );
                Ok(())
            }
            command => {
                let cache = open_cache(config).await;
                let result = command.run(&cache).await;
                if !cache.shutdown(FLUSH_TIMEOUT).await {
                    tracing::warn!("Some cache writes did not finish before exit");
                }
                result
            }
        }
    }

    async fn run(self, cache: &AssetCache) -> eyre::Result<()> {
        match self {
            Commands::Get { id, output } => asset::get(cache, &id, output.as_deref()).await,
            Commands::Put {
                id,
                file,
                name,
                asset_type,
            } => asset::put(cache, id, &file, name, asset_type).await,
            Commands::Expire { id } => asset::expire(cache, &id).await,
            Commands::Clear => maintenance::clear(cache).await,
            Commands::Sweep => maintenance::sweep(cache).await,
            Commands::Stats => maintenance::stats(cache).await,
            Commands::Path { .. } => Ok(()),
        }
    }
}

/// Load configuration and apply command line overrides
pub fn resolve_config(
    file: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    verbose: u8,
) -> eyre::Result<AssetCacheConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(file) = file {
        loader = loader.file(file);
    }
    let mut config = loader.load()?;

    if let Some(dir) = cache_dir {
        config.cache_directory = dir;
        config.source = ConfigSource::CommandLine;
    }
    config.log_level = config.log_level.saturating_add(verbose).min(2);

    Ok(config)
}

/// A cache for one command: no background sweep, sweeps are explicit
async fn open_cache(mut config: AssetCacheConfig) -> AssetCache {
    config.file_cleanup_interval = 0.0;
    AssetCache::new(config).await
}
