//! Configuration loader with file and environment precedence

use crate::config::{AssetCacheConfig, ConfigSource};
use assetcache_core::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "ASSETCACHE_";

/// Layout of the TOML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    asset_cache: Option<AssetCacheConfig>,
}

/// Loads an [`AssetCacheConfig`] from defaults, a TOML file and the
/// environment
pub struct ConfigLoader {
    /// Explicit file; when unset the user config directory is probed
    file: Option<PathBuf>,
    /// Whether `ASSETCACHE_*` variables are consulted
    use_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader that probes the default file and reads the environment
    pub fn new() -> Self {
        Self {
            file: None,
            use_env: true,
        }
    }

    /// Load from this file instead of the default location; it must exist
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Enable or disable environment overrides
    pub fn env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    /// Resolve the configuration from the process environment
    pub fn load(self) -> Result<AssetCacheConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration with a custom environment lookup
    pub fn load_with<F>(self, lookup: F) -> Result<AssetCacheConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.file {
            Some(path) => Self::load_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_file(&path)?,
                _ => AssetCacheConfig::default(),
            },
        };

        if self.use_env && apply_env(&mut config, &lookup)? {
            config.source = ConfigSource::EnvironmentVariable(format!("{ENV_PREFIX}*"));
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn load_file(path: &Path) -> Result<AssetCacheConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read config file", e))?;

        let mut config = Self::parse(&content)
            .map_err(|e| Error::configuration(format!("{}: {e}", path.display())))?;
        config.source = ConfigSource::ConfigFile(path.to_path_buf());

        tracing::debug!("Loaded asset cache configuration from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text; a missing `[asset_cache]` table yields defaults
    pub fn parse(content: &str) -> Result<AssetCacheConfig> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| Error::Configuration {
            message: format!("invalid configuration: {e}"),
        })?;
        Ok(file.asset_cache.unwrap_or_default())
    }

    /// `$XDG_CONFIG_HOME/assetcache/config.toml` or the platform equivalent
    pub fn default_config_path() -> Option<PathBuf> {
        let config_dir = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()?,
        };
        Some(config_dir.join("assetcache").join("config.toml"))
    }
}

/// Apply `ASSETCACHE_*` overrides, returning whether any were present
fn apply_env<F>(config: &mut AssetCacheConfig, lookup: &F) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = false;

    if let Some(dir) = lookup("ASSETCACHE_DIRECTORY") {
        config.cache_directory = PathBuf::from(dir);
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_MEMORY_ENABLED") {
        config.memory_cache_enabled = parse_bool("ASSETCACHE_MEMORY_ENABLED", &value)?;
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_MEMORY_TIMEOUT") {
        config.memory_cache_timeout = parse_value("ASSETCACHE_MEMORY_TIMEOUT", &value)?;
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_FILE_TIMEOUT") {
        config.file_cache_timeout = parse_value("ASSETCACHE_FILE_TIMEOUT", &value)?;
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_CLEANUP_INTERVAL") {
        config.file_cleanup_interval = parse_value("ASSETCACHE_CLEANUP_INTERVAL", &value)?;
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_HIT_RATE_DISPLAY") {
        config.hit_rate_display = parse_value("ASSETCACHE_HIT_RATE_DISPLAY", &value)?;
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_LOG_LEVEL") {
        config.log_level = parse_value("ASSETCACHE_LOG_LEVEL", &value)?;
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_WAIT_ON_INPROGRESS") {
        config.wait_on_inprogress = parse_bool("ASSETCACHE_WAIT_ON_INPROGRESS", &value)?;
        applied = true;
    }
    if let Some(value) = lookup("ASSETCACHE_WAIT_TIMEOUT_MS") {
        config.wait_on_inprogress_timeout_ms = parse_value("ASSETCACHE_WAIT_TIMEOUT_MS", &value)?;
        applied = true;
    }

    Ok(applied)
}

fn parse_value<T>(variable: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        Error::configuration(format!("invalid value '{value}' for {variable}: {e}"))
    })
}

fn parse_bool(variable: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!(
            "invalid boolean '{value}' for {variable}"
        ))),
    }
}
