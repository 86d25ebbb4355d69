use assetcache_cache::{Asset, AssetCache, AssetCacheConfig};
use assetcache_utils::{access_age, set_accessed};
use chrono::{TimeZone, Utc};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

mod common;
use common::{TestCache, FLUSH};

const HOUR: Duration = Duration::from_secs(3600);

fn brick() -> Asset {
    Asset::builder("deadbeef-1234")
        .name("brick texture")
        .description("a red brick")
        .asset_type(0)
        .temporary(false)
        .created_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        .data(vec![0xAB; 1024])
        .build()
}

#[tokio::test]
async fn test_round_trip_survives_restart() {
    let t = TestCache::new().await;
    let asset = brick();

    t.cache.put(asset.clone());
    assert!(t.cache.flush(FLUSH).await);

    let reopened = t.reopen().await;
    let found = reopened.get("deadbeef-1234").await.unwrap();
    assert_eq!(*found, asset);
    assert_eq!(reopened.statistics().disk_hits, 1);
}

#[tokio::test]
async fn test_mapped_path() {
    let t = TestCache::new().await;
    t.cache.put(brick());
    assert!(t.cache.flush(FLUSH).await);

    let expected = t.root.join("1234").join("deadbeef-1234");
    assert_eq!(t.cache.path_for("deadbeef-1234").unwrap(), expected);
    assert!(expected.is_file());
}

#[tokio::test]
async fn test_read_after_write_before_flush() {
    let t = TestCache::new().await;
    t.cache.put(brick());
    // Served from memory whether or not the disk write has landed
    assert_eq!(t.cache.get("deadbeef-1234").await.unwrap().data.len(), 1024);
    assert!(t.cache.flush(FLUSH).await);
}

#[tokio::test]
async fn test_unknown_key_misses() {
    let t = TestCache::new().await;
    assert!(t.cache.get("no-such-asset").await.is_none());

    let stats = t.cache.statistics();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.misses(), 1);
    assert_eq!(stats.inprogress_requests, 0);
}

#[tokio::test]
async fn test_recache_touches_instead_of_rewriting() {
    let t = TestCache::new().await;
    t.cache.put(brick());
    assert!(t.cache.flush(FLUSH).await);

    let path = t.cache.path_for("deadbeef-1234").unwrap();
    set_accessed(&path, SystemTime::now() - 10 * HOUR).unwrap();
    let bytes = fs::read(&path).unwrap();

    let mut changed = brick();
    changed.data = vec![0x00; 16];
    t.cache.put(changed);

    let stats = t.cache.statistics();
    assert_eq!(stats.writes_in_flight, 0);
    assert_eq!(stats.touches, 1);
    assert!(t.cache.flush(FLUSH).await);
    assert_eq!(t.cache.statistics().writes, 1);
    assert_eq!(fs::read(&path).unwrap(), bytes);
    assert!(access_age(&path, SystemTime::now()).unwrap() < HOUR);
}

#[tokio::test]
async fn test_corrupt_file_self_heals() {
    let t = TestCache::with(|config| config.memory_cache_enabled = false).await;
    let path = t.cache.path_for("deadbeef-1234").unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"truncated garbage").unwrap();

    assert!(t.cache.get("deadbeef-1234").await.is_none());
    assert!(!path.exists());
    assert_eq!(t.cache.statistics().corrupt_removed, 1);

    t.cache.put(brick());
    assert!(t.cache.flush(FLUSH).await);
    assert!(path.exists());
    assert_eq!(*t.cache.get("deadbeef-1234").await.unwrap(), brick());
}

#[tokio::test]
async fn test_sweep_removes_idle_files() {
    let t = TestCache::with(|config| config.file_cache_timeout = 1.0).await;
    for id in ["stale-asset-0001", "fresh-asset-0002"] {
        t.cache.put(Asset::new(id, vec![1, 2, 3]));
    }
    assert!(t.cache.flush(FLUSH).await);

    let stale = t.cache.path_for("stale-asset-0001").unwrap();
    let fresh = t.cache.path_for("fresh-asset-0002").unwrap();
    set_accessed(&stale, SystemTime::now() - 2 * HOUR).unwrap();

    let report = t.cache.sweep().await;
    assert_eq!(report.removed, 1);
    assert!(!stale.exists());
    assert!(fresh.exists());
    assert_eq!(t.cache.statistics().swept_files, 1);
}

#[tokio::test]
async fn test_sweep_with_files_that_never_expire() {
    let t = TestCache::with(|config| config.file_cache_timeout = 0.0).await;
    t.cache.put(brick());
    assert!(t.cache.flush(FLUSH).await);
    let path = t.cache.path_for("deadbeef-1234").unwrap();
    set_accessed(&path, SystemTime::now() - 1000 * HOUR).unwrap();

    assert_eq!(t.cache.sweep().await.removed, 0);
    assert!(path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_memory_without_timeout_survives_1000_hours() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the root should be keeps the cache memory-only
    let occupied = temp_dir.path().join("occupied");
    fs::write(&occupied, b"x").unwrap();
    let mut config = AssetCacheConfig::with_directory(&occupied);
    config.memory_cache_timeout = 0.0;
    let cache = AssetCache::new(config).await;

    cache.put(Asset::new("abc123", vec![1, 2, 3]));
    tokio::time::advance(1000 * HOUR).await;

    assert_eq!(cache.get("abc123").await.unwrap().data, vec![1, 2, 3]);
    assert_eq!(cache.statistics().memory_hits, 1);
}

#[tokio::test]
async fn test_unusable_root_degrades_to_memory_only() {
    let temp_dir = TempDir::new().unwrap();
    let occupied = temp_dir.path().join("occupied");
    fs::write(&occupied, b"x").unwrap();
    let cache = AssetCache::new(AssetCacheConfig::with_directory(&occupied)).await;

    assert!(!cache.is_disk_enabled());
    assert!(cache.path_for("deadbeef-1234").is_none());

    cache.put(brick());
    assert!(cache.flush(FLUSH).await);
    assert_eq!(*cache.get("deadbeef-1234").await.unwrap(), brick());
    assert_eq!(cache.statistics().writes, 0);
    assert!(cache.expire("deadbeef-1234").await);
    assert!(cache.get("deadbeef-1234").await.is_none());
}

#[tokio::test]
async fn test_memory_disabled_reads_from_disk() {
    let t = TestCache::with(|config| config.memory_cache_enabled = false).await;
    t.cache.put(brick());
    assert!(t.cache.flush(FLUSH).await);

    for _ in 0..3 {
        assert!(t.cache.get("deadbeef-1234").await.is_some());
    }
    let stats = t.cache.statistics();
    assert_eq!(stats.memory_hits, 0);
    assert_eq!(stats.disk_hits, 3);
    assert_eq!(stats.memory_entries, 0);
}

#[tokio::test]
async fn test_expire_removes_both_tiers() {
    let t = TestCache::new().await;
    t.cache.put(brick());
    assert!(t.cache.flush(FLUSH).await);
    let path = t.cache.path_for("deadbeef-1234").unwrap();

    assert!(t.cache.expire("deadbeef-1234").await);
    assert!(!path.exists());
    assert!(t.cache.get("deadbeef-1234").await.is_none());
    assert!(!t.cache.expire("deadbeef-1234").await);
    assert_eq!(t.cache.statistics().expirations, 1);
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let t = TestCache::new().await;
    let ids = ["aaaa-0001", "bbbb-0002", "cccc-0003"];
    for id in ids {
        t.cache.put(Asset::new(id, vec![1]));
    }
    assert!(t.cache.flush(FLUSH).await);

    t.cache.clear().await;

    for id in ids {
        assert!(t.cache.get(id).await.is_none());
    }
    assert!(t.root.is_dir());
    assert_eq!(fs::read_dir(&t.root).unwrap().count(), 0);
}

#[tokio::test]
async fn test_illegal_characters_and_short_keys() {
    let t = TestCache::new().await;
    for id in ["a/b\\c:d*e?f", "ab", ".."] {
        t.cache.put(Asset::new(id, id.as_bytes().to_vec()));
    }
    assert!(t.cache.flush(FLUSH).await);

    let reopened = t.reopen().await;
    for id in ["a/b\\c:d*e?f", "ab", ".."] {
        let path = reopened.path_for(id).unwrap();
        assert!(path.starts_with(&t.root));
        assert!(path.is_file(), "{} should be stored at {}", id, path.display());
        assert_eq!(reopened.get(id).await.unwrap().data, id.as_bytes());
    }
}

#[test]
fn test_with_runtime_from_sync_host() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let mut config = AssetCacheConfig::with_directory(temp_dir.path().join("assets"));
    config.file_cleanup_interval = 0.0;

    let cache = AssetCache::with_runtime(config, runtime.handle().clone());
    cache.put(brick());
    assert!(runtime.block_on(cache.flush(FLUSH)));

    let path = cache.path_for("deadbeef-1234").unwrap();
    assert!(path.is_file());
    let found = runtime.block_on(cache.get("deadbeef-1234")).unwrap();
    assert_eq!(found.name, "brick texture");
}

#[tokio::test]
async fn test_hit_rate_reporting_does_not_disturb_lookups() {
    let t = TestCache::with(|config| {
        config.hit_rate_display = 2;
        config.log_level = 2;
    })
    .await;
    t.cache.put(brick());
    for _ in 0..5 {
        assert!(t.cache.get("deadbeef-1234").await.is_some());
    }
    assert!(t.cache.flush(FLUSH).await);
    assert_eq!(t.cache.statistics().requests, 5);
    assert_eq!(t.cache.statistics().memory_hit_rate(), 100.0);
}
