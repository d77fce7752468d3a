//! Byte sources
//!
//! A byte source maps a content key to an encoding entry and opens the blob
//! behind it as a readable, seekable stream. The real storage backend
//! (encoding tables, decompression, on-disk indexes) lives outside this
//! crate; the implementations here cover in-memory data and loose storage
//! directories.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binary::to_offset;
use crate::key::ContentKey;
use crate::package::PackageDescriptor;
use crate::{Error, Result};

/// Encoding table entry: content key to the physical key the blob is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingEntry {
    pub content_key: ContentKey,
    pub encoding_key: ContentKey,
    pub size: u64,
}

/// Trait for opening blobs by content key
pub trait ByteSource {
    type Stream: Read + Seek;

    /// Look up the encoding entry for a content key
    fn lookup(&self, key: &ContentKey) -> Option<EncodingEntry>;

    /// Open the blob behind an encoding entry
    fn open(&self, entry: &EncodingEntry) -> Result<Self::Stream>;

    /// Look up and open in one step
    fn open_key(&self, key: &ContentKey) -> Result<Self::Stream> {
        let entry = self.lookup(key).ok_or(Error::NotFound(*key))?;
        self.open(&entry)
    }
}

/// Read exactly `len` bytes starting at `offset`
///
/// The buffer grows with what the stream yields, so an oversized `len` from
/// metadata fails as short data instead of allocating up front.
pub fn read_range<R: Read + Seek>(stream: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    stream.seek(SeekFrom::Start(offset))?;
    let mut buffer = Vec::new();
    stream.by_ref().take(len as u64).read_to_end(&mut buffer)?;

    if buffer.len() != len {
        return Err(Error::DataTooShort {
            context: "blob range",
            offset: to_offset(offset, "blob range offset")?,
            needed: len,
            actual: buffer.len(),
        });
    }
    Ok(buffer)
}

/// In-memory byte source
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    encoding: HashMap<ContentKey, EncodingEntry>,
    blobs: HashMap<ContentKey, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob whose encoding key equals its content key
    pub fn insert(&mut self, content_key: ContentKey, data: Vec<u8>) {
        self.insert_encoded(content_key, content_key, data);
    }

    /// Store a blob under a distinct encoding key
    pub fn insert_encoded(
        &mut self,
        content_key: ContentKey,
        encoding_key: ContentKey,
        data: Vec<u8>,
    ) {
        self.encoding.insert(
            content_key,
            EncodingEntry {
                content_key,
                encoding_key,
                size: data.len() as u64,
            },
        );
        self.blobs.insert(encoding_key, data.into());
    }

    /// Register an encoding entry without a blob behind it
    pub fn insert_dangling(&mut self, content_key: ContentKey, encoding_key: ContentKey) {
        self.encoding.insert(
            content_key,
            EncodingEntry {
                content_key,
                encoding_key,
                size: 0,
            },
        );
    }

}

impl ByteSource for MemorySource {
    type Stream = Cursor<Arc<[u8]>>;

    fn lookup(&self, key: &ContentKey) -> Option<EncodingEntry> {
        self.encoding.get(key).copied()
    }

    fn open(&self, entry: &EncodingEntry) -> Result<Self::Stream> {
        self.blobs
            .get(&entry.encoding_key)
            .map(|data| Cursor::new(Arc::clone(data)))
            .ok_or_else(|| Error::BackingResourceUnavailable {
                key: entry.encoding_key,
                reason: "no blob stored under encoding key".to_string(),
            })
    }
}

/// Loose storage directory
///
/// Layout:
/// - `encoding.json`: array of [`EncodingEntry`]
/// - `packages.json`: array of [`PackageDescriptor`]
/// - `data/`: one file per blob, named by encoding key in hex (any case, any depth)
pub struct DirectorySource {
    root: PathBuf,
    encoding: HashMap<ContentKey, EncodingEntry>,
    files: HashMap<ContentKey, PathBuf>,
}

impl DirectorySource {
    pub const ENCODING_FILE: &'static str = "encoding.json";
    pub const PACKAGES_FILE: &'static str = "packages.json";
    pub const DATA_DIR: &'static str = "data";

    /// Open a storage root, loading its encoding table and indexing its blobs
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let table = std::fs::read(root.join(Self::ENCODING_FILE))?;
        let entries: Vec<EncodingEntry> = serde_json::from_slice(&table)?;
        let encoding: HashMap<ContentKey, EncodingEntry> =
            entries.into_iter().map(|e| (e.content_key, e)).collect();

        let mut files = HashMap::new();
        for entry in walkdir::WalkDir::new(root.join(Self::DATA_DIR))
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            match name.parse::<ContentKey>() {
                Ok(key) => {
                    files.insert(key, path.to_path_buf());
                }
                Err(_) => tracing::debug!(path = %path.display(), "Ignoring non-blob file"),
            }
        }

        tracing::debug!(
            root = %root.display(),
            entries = encoding.len(),
            blobs = files.len(),
            "Opened storage directory"
        );

        Ok(Self {
            root,
            encoding,
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load package metadata stored next to the encoding table
    pub fn packages(&self) -> Result<Vec<PackageDescriptor>> {
        PackageDescriptor::load_all(self.root.join(Self::PACKAGES_FILE))
    }

    /// Number of blob files found under `data/`
    pub fn blob_count(&self) -> usize {
        self.files.len()
    }
}

impl ByteSource for DirectorySource {
    type Stream = BufReader<File>;

    fn lookup(&self, key: &ContentKey) -> Option<EncodingEntry> {
        self.encoding.get(key).copied()
    }

    fn open(&self, entry: &EncodingEntry) -> Result<Self::Stream> {
        let path = self.files.get(&entry.encoding_key).ok_or_else(|| {
            Error::BackingResourceUnavailable {
                key: entry.encoding_key,
                reason: "blob file missing from data directory".to_string(),
            }
        })?;

        let file = File::open(path).map_err(|e| Error::BackingResourceUnavailable {
            key: entry.encoding_key,
            reason: format!("{}: {}", path.display(), e),
        })?;

        Ok(BufReader::new(file))
    }
}
