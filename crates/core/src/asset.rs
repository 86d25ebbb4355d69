//! The asset record cached by both tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, named binary blob (texture, sound, script bytecode, ...).
///
/// Assets are identified by an opaque string id. Once an asset with a given
/// id has been cached it is never partially updated; caching it again either
/// refreshes liveness or replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Opaque unique identifier, also the cache key
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Numeric asset kind as understood by the host
    pub asset_type: i8,
    /// Asset only exists in this region/instance
    pub local: bool,
    /// Asset is not meant to be persisted by the backing store
    pub temporary: bool,
    /// When the asset was created upstream
    pub created_at: DateTime<Utc>,
    /// Raw payload
    pub data: Vec<u8>,
}

impl Asset {
    /// Create an asset with the given id and payload and empty metadata
    pub fn new(id: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        AssetBuilder::new(id).data(data).build()
    }

    /// Start building an asset with metadata
    pub fn builder(id: impl Into<String>) -> AssetBuilder {
        AssetBuilder::new(id)
    }

    /// Payload size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Assets without an id cannot be addressed and are never cached
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// Builder for [`Asset`] records
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    asset: Asset,
}

impl AssetBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            asset: Asset {
                id: id.into(),
                name: String::new(),
                description: String::new(),
                asset_type: 0,
                local: false,
                temporary: false,
                created_at: Utc::now(),
                data: Vec::new(),
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.asset.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.asset.description = description.into();
        self
    }

    pub fn asset_type(mut self, asset_type: i8) -> Self {
        self.asset.asset_type = asset_type;
        self
    }

    pub fn local(mut self, local: bool) -> Self {
        self.asset.local = local;
        self
    }

    pub fn temporary(mut self, temporary: bool) -> Self {
        self.asset.temporary = temporary;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.asset.created_at = created_at;
        self
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.asset.data = data.into();
        self
    }

    pub fn build(self) -> Asset {
        self.asset
    }
}
