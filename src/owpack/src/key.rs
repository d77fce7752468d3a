//! Content keys, package keys and asset keys

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Content keys are MD5-sized
pub const CONTENT_KEY_SIZE: usize = 16;

/// Numeric identifier of a whole package
pub type PackageKey = u64;

/// Fixed-width key addressing one logical blob in the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey([u8; CONTENT_KEY_SIZE]);

impl ContentKey {
    pub const fn from_bytes(bytes: [u8; CONTENT_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CONTENT_KEY_SIZE] {
        &self.0
    }

    /// Upper-case hex, the normalized form used for query matching
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; CONTENT_KEY_SIZE];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|e| Error::InvalidKey(format!("'{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 64-bit record key carrying a type id and an index id
///
/// Layout:
/// - bits 0..48: index id
/// - bits 48..60: type id, stored bit-reversed and minus one
/// - bits 60..64: unused here
///
/// Only used to name extracted records, never for lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(pub u64);

impl AssetKey {
    const INDEX_MASK: u64 = 0xFFFF_FFFF_FFFF;
    const TYPE_SHIFT: u32 = 48;
    const TYPE_MASK: u64 = 0xFFF;

    /// Asset type (e.g. 0x004 for textures)
    pub fn type_id(&self) -> u16 {
        let raw = ((self.0 >> Self::TYPE_SHIFT) & Self::TYPE_MASK) as u16;
        (raw.reverse_bits() >> 4) + 1
    }

    /// Index of the asset within its type
    pub fn index_id(&self) -> u64 {
        self.0 & Self::INDEX_MASK
    }

    /// `{type}/{index}.{type}`, e.g. `004/00000000012A.004`
    pub fn file_name(&self) -> String {
        let type_id = self.type_id();
        format!("{:03X}/{:012X}.{:03X}", type_id, self.index_id(), type_id)
    }

    /// Inverse of `type_id`/`index_id`, used to build keys for a given type
    pub fn compose(type_id: u16, index_id: u64) -> Self {
        let stored = (type_id.wrapping_sub(1) & Self::TYPE_MASK as u16) << 4;
        let raw = stored.reverse_bits() as u64;
        Self((raw << Self::TYPE_SHIFT) | (index_id & Self::INDEX_MASK))
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}
