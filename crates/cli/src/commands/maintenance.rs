//! Whole-cache maintenance commands

use assetcache_cache::AssetCache;
use eyre::bail;

pub async fn clear(cache: &AssetCache) -> eyre::Result<()> {
    if !cache.is_disk_enabled() {
        bail!(
            "cache directory {} is not usable",
            cache.config().cache_directory.display()
        );
    }
    cache.clear().await;
    println!("cleared {}", cache.config().cache_directory.display());
    Ok(())
}

pub async fn sweep(cache: &AssetCache) -> eyre::Result<()> {
    let Some(max_age) = cache.config().file_expiration() else {
        println!("files never expire (file_cache_timeout <= 0), nothing to sweep");
        return Ok(());
    };

    let report = cache.sweep().await;
    println!(
        "swept {} shards: {} files scanned, {} idle longer than {:.1}h removed, {} failures",
        report.shards,
        report.scanned,
        report.removed,
        max_age.as_secs_f64() / 3600.0,
        report.failed
    );
    if report.failed > 0 {
        bail!("{} entries could not be swept", report.failed);
    }
    Ok(())
}

pub async fn stats(cache: &AssetCache) -> eyre::Result<()> {
    let config = cache.config();

    println!("Asset cache");
    println!("  directory:        {}", config.cache_directory.display());
    println!("  config source:    {:?}", config.source);
    println!(
        "  memory tier:      {}",
        if config.memory_cache_enabled {
            format!("on, {} h", config.memory_cache_timeout)
        } else {
            "off".to_string()
        }
    );
    println!("  file timeout:     {} h", config.file_cache_timeout);
    println!("  sweep interval:   {} h", config.file_cleanup_interval);
    println!(
        "  wait on writes:   {}",
        match config.wait_timeout() {
            Some(timeout) => format!("up to {} ms", timeout.as_millis()),
            None => "no".to_string(),
        }
    );

    match cache.disk_usage().await {
        Some(usage) => {
            println!("  shards:           {}", usage.shards);
            println!("  files:            {}", usage.files);
            println!(
                "  size:             {:.2} MB",
                usage.bytes as f64 / 1_048_576.0
            );
        }
        None => println!("  disk tier:        unavailable"),
    }

    Ok(())
}
