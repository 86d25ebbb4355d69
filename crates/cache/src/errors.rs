//! Typed outcomes for disk tier reads

use std::path::PathBuf;

/// Why a disk tier read produced no asset
///
/// Reads never surface these to cache callers; the facade matches on them to
/// decide between a plain miss, a self-healing delete, and an error log.
#[derive(Debug, thiserror::Error)]
pub enum DiskReadError {
    /// No file for this key
    #[error("asset not cached on disk")]
    NotFound,

    /// The file exists but does not decode to the requested asset. It has
    /// already been removed when this is returned.
    #[error("corrupt cache file '{path}': {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The file could not be read
    #[error("failed to read cache file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiskReadError {
    /// Whether this outcome is an ordinary miss rather than a fault
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
