//! Cache operations, implemented directly on [`AssetCache`](super::AssetCache)

mod clear;
mod get;
mod put;
mod remove;
