//! Asset key to on-disk path mapping
//!
//! Keys are sanitized into valid file names and spread over shard
//! directories named after the last [`SHARD_LEN`] characters of the
//! sanitized key. The mapping is a pure function of the key, so no index is
//! needed to locate a file and millions of assets never end up in a single
//! directory listing.

use std::path::{Path, PathBuf};

/// Number of trailing key characters used as the shard directory name
pub const SHARD_LEN: usize = 4;

/// Replacement for characters that cannot appear in a file name
pub const REPLACEMENT: char = '_';

/// Characters rejected in file names on at least one supported platform
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn is_invalid(c: char) -> bool {
    c.is_ascii_control() || INVALID_CHARS.contains(&c)
}

/// Replace every character that is illegal in a path or file name with `_`
///
/// The result is the same on every platform so a cache directory can be
/// shared between hosts. The relative names `.` and `..` (and the empty key)
/// are rewritten so a key can never address a directory.
pub fn sanitize_key(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| if is_invalid(c) { REPLACEMENT } else { c })
        .collect();

    match sanitized.as_str() {
        "" | "." => REPLACEMENT.to_string(),
        ".." => format!("{REPLACEMENT}{REPLACEMENT}"),
        _ => sanitized,
    }
}

/// Shard directory name for an already sanitized key
///
/// Keys shorter than [`SHARD_LEN`] characters use the whole key.
pub fn shard_name(sanitized: &str) -> &str {
    match sanitized.char_indices().rev().nth(SHARD_LEN - 1) {
        Some((start, _)) => &sanitized[start..],
        None => sanitized,
    }
}

/// Map an asset key to `root/<shard>/<sanitized key>`
pub fn map_to_path(root: &Path, key: &str) -> PathBuf {
    let sanitized = sanitize_key(key);
    let shard = shard_name(&sanitized);
    root.join(shard).join(&sanitized)
}
