//! Tagged chunk decoding
//!
//! A chunk is a 16-byte header followed by a fixed-layout payload:
//!
//! - Bytes 0-3: chunk identifier
//! - Bytes 4-7: root identifier (the container format the chunk belongs to)
//! - Bytes 8-11: payload size (u32 LE)
//! - Bytes 12-15: reserved
//!
//! Identifiers are compared as raw bytes. Payload shapes are looked up in a
//! [`ChunkRegistry`] keyed by the identifier pair; unregistered pairs decode
//! to [`Decoded::NotRecognized`] without touching the payload.

mod effect;
mod registry;

use std::fmt;
use std::sync::OnceLock;

use serde::{Serialize, Serializer};

use crate::binary::Reader;
use crate::Result;

pub use effect::ParticleEffect;
pub use registry::{ChunkKind, ChunkRegistry, Chunks};

/// Four raw identifier bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic()) {
            self.0.iter().try_for_each(|&b| write!(f, "{}", b as char))
        } else {
            write!(f, "{}", hex::encode_upper(self.0))
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fixed chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkHeader {
    pub identifier: Tag,
    pub root: Tag,
    pub payload_size: u32,
    pub reserved: u32,
}

impl ChunkHeader {
    pub const SIZE: usize = 16;

    /// Parse the header at the start of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::at(data, 0, Self::SIZE, "chunk header")?;
        Ok(Self {
            identifier: Tag(reader.read_tag()?),
            root: Tag(reader.read_tag()?),
            payload_size: reader.read_u32()?,
            reserved: reader.read_u32()?,
        })
    }

    /// Header plus declared payload
    pub fn total_size(&self) -> usize {
        Self::SIZE + self.payload_size as usize
    }
}

/// Registered payload shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum ChunkPayload {
    ParticleEffect(ParticleEffect),
    /// A registered kind with a known size but no typed layout
    Raw(Vec<u8>),
}

/// A decoded chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub header: ChunkHeader,
    pub payload: ChunkPayload,
}

impl Chunk {
    pub fn identifier(&self) -> Tag {
        self.header.identifier
    }

    pub fn root(&self) -> Tag {
        self.header.root
    }
}

/// Outcome of decoding one chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Decoded {
    Chunk(Chunk),
    /// No decoder registered for the identifier pair
    NotRecognized(ChunkHeader),
}

impl Decoded {
    pub fn header(&self) -> &ChunkHeader {
        match self {
            Decoded::Chunk(chunk) => &chunk.header,
            Decoded::NotRecognized(header) => header,
        }
    }

    pub fn chunk(&self) -> Option<&Chunk> {
        match self {
            Decoded::Chunk(chunk) => Some(chunk),
            Decoded::NotRecognized(_) => None,
        }
    }
}

/// Registry with the built-in chunk kinds, built on first use
pub fn builtin() -> &'static ChunkRegistry {
    static REGISTRY: OnceLock<ChunkRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ChunkRegistry::with_builtin)
}

/// Decode one chunk with the built-in registry
pub fn decode(data: &[u8]) -> Result<Decoded> {
    builtin().decode(data)
}
