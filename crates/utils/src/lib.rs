//! Shared utilities for assetcache
//!
//! Filesystem helpers used by the disk tier (atomic writes, access-time
//! bookkeeping) and the tracing subscriber setup shared by binaries.

pub mod atomic_file;
pub mod file_times;
pub mod tracing;

pub use atomic_file::*;
pub use file_times::*;
