//! Core domain types and errors for the `assetcache` workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: the workspace-wide `Error` enum and `Result` alias used by
//!   configuration loading, the filesystem helpers and the CLI.
//! - **`asset`**: the `Asset` record, the immutable unit that flows through
//!   both cache tiers.

pub mod asset;
pub mod errors;

pub use self::{
    asset::{Asset, AssetBuilder},
    errors::{Error, Result},
};
