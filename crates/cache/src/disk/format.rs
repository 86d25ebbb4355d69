//! On-disk record format
//!
//! ```text
//! magic "ASC1" | version u16 | flags u16 | payload len u64 | crc32c u32 | payload
//! ```
//!
//! All integers are little endian. The payload is the bincode encoding of
//! the [`Asset`]. The checksum is verified before the payload is decoded so
//! garbage never reaches the decoder.

use assetcache_core::{Asset, Result};
use crc32c::crc32c;

/// Magic number identifying asset cache files
pub const MAGIC: [u8; 4] = *b"ASC1";

/// Current record format version
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed header preceding the payload
pub const HEADER_LEN: usize = 4 + 2 + 2 + 8 + 4;

/// Encode an asset into a complete file image
pub fn encode(asset: &Asset) -> Result<Vec<u8>> {
    let payload = bincode::serialize(asset)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&crc32c(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a file image, describing the first inconsistency found
pub fn decode(bytes: &[u8]) -> std::result::Result<Asset, String> {
    if bytes.len() < HEADER_LEN {
        return Err(format!(
            "file is {} bytes, shorter than the {HEADER_LEN} byte header",
            bytes.len()
        ));
    }

    let (header, payload) = bytes.split_at(HEADER_LEN);

    if header[0..4] != MAGIC {
        return Err(format!("invalid magic number {:02x?}", &header[0..4]));
    }

    let version = u16::from_le_bytes([header[4], header[5]]);
    if version == 0 || version > FORMAT_VERSION {
        return Err(format!("unsupported format version {version}"));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[8..16]);
    let expected_len = u64::from_le_bytes(len_bytes);
    if expected_len != payload.len() as u64 {
        return Err(format!(
            "payload length mismatch: header says {expected_len}, found {}",
            payload.len()
        ));
    }

    let expected_crc = u32::from_le_bytes([header[16], header[17], header[18], header[19]]);
    let actual_crc = crc32c(payload);
    if expected_crc != actual_crc {
        return Err(format!(
            "checksum mismatch: expected {expected_crc:08x}, got {actual_crc:08x}"
        ));
    }

    bincode::deserialize(payload).map_err(|e| format!("undecodable payload: {e}"))
}
