//! Asset cache settings

use assetcache_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Directory used when no cache root is configured
pub const DEFAULT_CACHE_DIRECTORY: &str = "assetcache";

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Built-in defaults only
    #[default]
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variables (possibly on top of a file)
    EnvironmentVariable(String),
    /// Command line arguments
    CommandLine,
}

/// Settings for the two-tier asset cache
///
/// Time spans are expressed in hours as floating point numbers so that
/// fractional values such as `0.5` (thirty minutes) are allowed. Zero or a
/// negative value disables the corresponding expiry or timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetCacheConfig {
    /// Root of the on-disk shard tree. May be shared by several instances.
    pub cache_directory: PathBuf,
    /// Keep a copy of hot assets in memory
    pub memory_cache_enabled: bool,
    /// Hours an asset stays in memory after insertion
    pub memory_cache_timeout: f64,
    /// Hours since last access before a file is swept from disk
    pub file_cache_timeout: f64,
    /// Hours between background sweeps
    pub file_cleanup_interval: f64,
    /// Emit a hit-rate report every this many requests
    pub hit_rate_display: u64,
    /// 0 errors only, 1 adds hit-rate reports, 2 adds read/write activity
    pub log_level: u8,
    /// Block reads on an in-flight write of the same asset
    pub wait_on_inprogress: bool,
    /// Upper bound for that wait, in milliseconds
    pub wait_on_inprogress_timeout_ms: u64,
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Default for AssetCacheConfig {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            memory_cache_enabled: true,
            memory_cache_timeout: 1.0,
            file_cache_timeout: 48.0,
            file_cleanup_interval: 48.0,
            hit_rate_display: 100,
            log_level: 1,
            wait_on_inprogress: false,
            wait_on_inprogress_timeout_ms: 3000,
            source: ConfigSource::Default,
        }
    }
}

impl AssetCacheConfig {
    /// Configuration rooted at `dir` with every other field defaulted
    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_directory: dir.into(),
            ..Self::default()
        }
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        for (name, hours) in [
            ("memory_cache_timeout", self.memory_cache_timeout),
            ("file_cache_timeout", self.file_cache_timeout),
            ("file_cleanup_interval", self.file_cleanup_interval),
        ] {
            if !hours.is_finite() {
                return Err(Error::configuration(format!(
                    "{name} must be a finite number of hours, got {hours}"
                )));
            }
        }

        if self.log_level > 2 {
            return Err(Error::configuration(format!(
                "log_level must be between 0 and 2, got {}",
                self.log_level
            )));
        }

        if self.cache_directory.as_os_str().is_empty() {
            return Err(Error::configuration("cache_directory must not be empty"));
        }

        Ok(())
    }

    /// Memory tier lifetime, `None` when entries never expire
    pub fn memory_expiration(&self) -> Option<Duration> {
        hours_to_duration(self.memory_cache_timeout)
    }

    /// Maximum file age on disk, `None` when files never expire
    pub fn file_expiration(&self) -> Option<Duration> {
        hours_to_duration(self.file_cache_timeout)
    }

    /// Sweep period, `None` when the background sweep is disabled
    pub fn cleanup_interval(&self) -> Option<Duration> {
        hours_to_duration(self.file_cleanup_interval)
    }

    /// Whether a background sweep should run at all
    pub fn sweep_enabled(&self) -> bool {
        self.file_expiration().is_some() && self.cleanup_interval().is_some()
    }

    /// Read wait bound when waiting on in-flight writes is enabled
    pub fn wait_timeout(&self) -> Option<Duration> {
        if self.wait_on_inprogress && self.wait_on_inprogress_timeout_ms > 0 {
            Some(Duration::from_millis(self.wait_on_inprogress_timeout_ms))
        } else {
            None
        }
    }
}

/// Convert fractional hours into a duration; non-positive means disabled
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    if hours.is_finite() && hours > 0.0 {
        Duration::try_from_secs_f64(hours * SECONDS_PER_HOUR).ok()
    } else {
        None
    }
}
