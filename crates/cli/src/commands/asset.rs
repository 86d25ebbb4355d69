//! Commands acting on a single asset

use assetcache_cache::AssetCache;
use assetcache_core::Asset;
use eyre::{bail, WrapErr};
use std::path::Path;

use super::FLUSH_TIMEOUT;

pub async fn get(cache: &AssetCache, id: &str, output: Option<&Path>) -> eyre::Result<()> {
    let Some(asset) = cache.get(id).await else {
        bail!("asset {id} is not cached");
    };

    println!("id:          {}", asset.id);
    println!("name:        {}", asset.name);
    if !asset.description.is_empty() {
        println!("description: {}", asset.description);
    }
    println!("type:        {}", asset.asset_type);
    println!("local:       {}", asset.local);
    println!("temporary:   {}", asset.temporary);
    println!("created:     {}", asset.created_at.to_rfc3339());
    println!("size:        {} bytes", asset.size());

    if let Some(output) = output {
        tokio::fs::write(output, &asset.data)
            .await
            .wrap_err_with(|| format!("failed to write payload to {}", output.display()))?;
        println!("payload written to {}", output.display());
    }

    Ok(())
}

pub async fn put(
    cache: &AssetCache,
    id: String,
    file: &Path,
    name: Option<String>,
    asset_type: i8,
) -> eyre::Result<()> {
    if id.is_empty() {
        bail!("asset id must not be empty");
    }
    if !cache.is_disk_enabled() {
        bail!(
            "cache directory {} is not usable",
            cache.config().cache_directory.display()
        );
    }

    let data = tokio::fs::read(file)
        .await
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;
    let name = name.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let asset = Asset::builder(id).name(name).asset_type(asset_type).data(data).build();
    let id = asset.id.clone();
    cache.put(asset);

    if !cache.flush(FLUSH_TIMEOUT).await {
        bail!("timed out writing asset {id}");
    }
    let stats = cache.statistics();
    if stats.write_failures > 0 {
        bail!("failed to write asset {id}; see the log for details");
    }

    match cache.path_for(&id) {
        Some(path) if stats.touches > 0 => println!("{id} already cached at {}", path.display()),
        Some(path) => println!("{id} cached at {}", path.display()),
        None => println!("{id} cached"),
    }
    Ok(())
}

pub async fn expire(cache: &AssetCache, id: &str) -> eyre::Result<()> {
    if cache.expire(id).await {
        println!("{id} expired");
    } else {
        println!("{id} was not cached");
    }
    Ok(())
}
