//! Package record extraction and asset decoding for content-addressed game storage
//!
//! The crate covers two steps of pulling assets out of a package store:
//!
//! 1. **Resolution and extraction.** A [`Query`] of package keys and index
//!    content keys is matched against loaded [`PackageDescriptor`]s, and each
//!    matched package's records are copied out of a [`ByteSource`], either from
//!    the package's shared bundle stream or from their own standalone blob.
//! 2. **Decoding.** Recovered buffers are decoded either as tagged chunks
//!    (see [`chunk`]) or as compact animation blobs (see [`animation`]).
//!
//! # Format Overview
//!
//! ## Chunk (`identifier` + `root` + fixed payload)
//!
//! - Bytes 0-3: chunk identifier (raw tag, e.g. `RPCE`)
//! - Bytes 4-7: root identifier naming the container (e.g. `TCFE`)
//! - Bytes 8-11: payload size (u32 LE)
//! - Bytes 12-15: reserved
//! - Bytes 16+: fixed-layout payload
//!
//! ## Animation
//!
//! - 80-byte header (duration, fps, bone count, table offsets)
//! - 32-byte info table at `info_table_offset` (per-family counts and stream offsets)
//! - Per family: a u16 bone index stream and an f32 value stream
//!
//! All offsets are relative to the start of the blob and all integers are
//! little-endian.

pub mod animation;
mod binary;
pub mod chunk;
pub mod extract;
mod key;
mod package;
pub mod query;
pub mod source;

pub use animation::{
    decode as decode_animation, Animation, AnimationHeader, AnimationInfoTable, BoneAnimation,
    ChannelKind, ChannelValue, Keyframe,
};
pub use chunk::{Chunk, ChunkHeader, ChunkKind, ChunkPayload, ChunkRegistry, Decoded, Tag};
pub use extract::{
    extract, extract_all, ExtractedRecord, Extraction, ExtractionReport, FailedPackage,
    SkippedRecord,
};
pub use key::{AssetKey, ContentKey, PackageKey, CONTENT_KEY_SIZE};
pub use package::{ContentFlags, PackageDescriptor, PackageIndex, PackageRecord};
pub use query::{resolve, MatchedBy, Query, Resolved};
pub use source::{read_range, ByteSource, DirectorySource, EncodingEntry, MemorySource};

/// Errors from resolution, extraction and decoding
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Data too short for {context}: need {needed} bytes at offset {offset}, got {actual}")]
    DataTooShort {
        context: &'static str,
        offset: usize,
        needed: usize,
        actual: usize,
    },

    #[error("Malformed {context}: {reason}")]
    Malformed {
        context: &'static str,
        reason: String,
    },

    #[error("Content key {0} not present in encoding table")]
    NotFound(ContentKey),

    #[error("Cannot open {key}: {reason}")]
    BackingResourceUnavailable { key: ContentKey, reason: String },

    #[error("Invalid query argument '{0}'")]
    InvalidQuery(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("No package metadata loaded")]
    NoPackages,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by a buffer whose layout disagrees with its length or header
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::DataTooShort { .. } | Error::Malformed { .. })
    }

    /// True when the byte source could not provide a blob
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::BackingResourceUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
