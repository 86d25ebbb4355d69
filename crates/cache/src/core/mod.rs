//! Cache facade
//!
//! [`AssetCache`] ties the tiers together: lookups go memory, then disk,
//! and stores update memory synchronously before handing the disk write to
//! the blocking pool. A background task periodically sweeps idle files.

mod builder;
mod cleanup;
mod lifecycle;
mod operations;
mod types;

pub use types::AssetCache;

#[cfg(test)]
mod tests;
