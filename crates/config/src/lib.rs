//! Configuration for the assetcache asset cache
//!
//! Settings are resolved with the precedence defaults < TOML file <
//! `ASSETCACHE_*` environment variables. Command line overrides are applied
//! by the caller on the returned [`AssetCacheConfig`].

pub mod config;
pub mod loader;


pub use config::{AssetCacheConfig, ConfigSource};
pub use loader::{ConfigLoader, ENV_PREFIX};
