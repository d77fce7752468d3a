//! Package metadata model
//!
//! Descriptors arrive fully loaded from the storage layer (or from a
//! `packages.json` file for loose storage); this crate never parses the
//! package index binary layout.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::key::{AssetKey, ContentKey, PackageKey};
use crate::Result;

/// Content flags carried by a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    pub const NONE: Self = Self(0);
    /// Record payload lives inside the package's shared bundle
    pub const BUNDLE: Self = Self(0x4000_0000);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_bundled(self) -> bool {
        self.contains(Self::BUNDLE)
    }
}

impl fmt::Display for ContentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// One addressable unit inside a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Asset key used to name the output
    pub key: AssetKey,
    /// Content key of the standalone blob
    pub content_key: ContentKey,
    pub flags: ContentFlags,
    /// Byte offset into the bundle (bundled records only)
    #[serde(default)]
    pub offset: u32,
    pub size: u32,
}

impl PackageRecord {
    pub fn is_bundled(&self) -> bool {
        self.flags.is_bundled()
    }
}

/// Per-package index entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIndex {
    /// Content key of the shared bundle stream
    pub bundle_content_key: ContentKey,
}

/// A package with its index and ordered records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub package_key: PackageKey,
    pub index_content_key: ContentKey,
    pub index: PackageIndex,
    #[serde(default)]
    pub records: Vec<PackageRecord>,
}

impl PackageDescriptor {
    /// Load an ordered list of descriptors from a JSON metadata file
    pub fn load_all<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_json(&data)
    }

    /// Parse an ordered list of descriptors from JSON
    pub fn from_json(data: &[u8]) -> Result<Vec<Self>> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Number of records stored in the shared bundle
    pub fn bundled_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_bundled()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"[
        {
            "package_key": 4660,
            "index_content_key": "00000000000000000000000000000001",
            "index": { "bundle_content_key": "000000000000000000000000000000B1" },
            "records": [
                {
                    "key": 1688849860263978,
                    "content_key": "000000000000000000000000000000C1",
                    "flags": 1073741824,
                    "offset": 16,
                    "size": 32
                },
                {
                    "key": 42,
                    "content_key": "000000000000000000000000000000C2",
                    "flags": 0,
                    "size": 8
                }
            ]
        }
    ]"#;

    #[test]
    fn test_content_flags() {
        assert!(ContentFlags::BUNDLE.is_bundled());
        assert!(ContentFlags(0x4000_0008).is_bundled());
        assert!(!ContentFlags(0x8).is_bundled());
        assert!(!ContentFlags::NONE.is_bundled());
        assert_eq!(ContentFlags::BUNDLE.to_string(), "0x40000000");
    }

    #[test]
    fn test_descriptors_from_json() {
        let packages = PackageDescriptor::from_json(METADATA.as_bytes()).unwrap();
        assert_eq!(packages.len(), 1);

        let package = &packages[0];
        assert_eq!(package.package_key, 0x1234);
        assert_eq!(package.records.len(), 2);
        assert_eq!(package.bundled_count(), 1);

        let bundled = &package.records[0];
        assert!(bundled.is_bundled());
        assert_eq!(bundled.offset, 16);
        assert_eq!(bundled.size, 32);

        let standalone = &package.records[1];
        assert!(!standalone.is_bundled());
        assert_eq!(standalone.offset, 0);
    }

    #[test]
    fn test_descriptors_bad_json() {
        assert!(PackageDescriptor::from_json(b"{not json").is_err());
    }

    #[test]
    fn test_load_all_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packages.json");
        std::fs::write(&path, METADATA).unwrap();

        let packages = PackageDescriptor::load_all(&path).unwrap();
        assert_eq!(packages[0].index.bundle_content_key.to_hex(), "000000000000000000000000000000B1");
    }
}
