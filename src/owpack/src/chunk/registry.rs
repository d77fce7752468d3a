//! Chunk kind registry and chunk stream iteration

use std::collections::HashMap;
use std::fmt;

use super::effect::{ParticleEffect, EFFECT_ROOT};
use super::{Chunk, ChunkHeader, ChunkPayload, Decoded, Tag};
use crate::binary::slice_at;
use crate::{Error, Result};

/// Payload shape registered for one identifier pair
#[derive(Clone, Copy)]
pub struct ChunkKind {
    pub name: &'static str,
    /// Fixed payload size in bytes
    pub payload_size: usize,
    /// Decodes exactly `payload_size` bytes
    pub decode: fn(&[u8]) -> Result<ChunkPayload>,
}

impl ChunkKind {
    /// A kind with a known size and no typed layout
    pub fn raw(name: &'static str, payload_size: usize) -> Self {
        Self {
            name,
            payload_size,
            decode: |data| Ok(ChunkPayload::Raw(data.to_vec())),
        }
    }
}

impl fmt::Debug for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkKind")
            .field("name", &self.name)
            .field("payload_size", &self.payload_size)
            .finish_non_exhaustive()
    }
}

/// Identifier pair to payload shape
#[derive(Debug, Clone, Default)]
pub struct ChunkRegistry {
    kinds: HashMap<(Tag, Tag), ChunkKind>,
}

impl ChunkRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every kind this crate knows how to decode
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ParticleEffect::IDENTIFIER, EFFECT_ROOT, ParticleEffect::kind());
        registry
    }

    /// Register a kind, returning any kind it replaces
    pub fn register(&mut self, identifier: Tag, root: Tag, kind: ChunkKind) -> Option<ChunkKind> {
        self.kinds.insert((identifier, root), kind)
    }

    pub fn get(&self, identifier: Tag, root: Tag) -> Option<&ChunkKind> {
        self.kinds.get(&(identifier, root))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Decode the chunk at the start of `data`
    ///
    /// Unregistered identifier pairs are not an error; only the header is read.
    pub fn decode(&self, data: &[u8]) -> Result<Decoded> {
        let header = ChunkHeader::from_bytes(data)?;

        let Some(kind) = self.get(header.identifier, header.root) else {
            return Ok(Decoded::NotRecognized(header));
        };

        if (header.payload_size as usize) < kind.payload_size {
            return Err(Error::Malformed {
                context: "chunk payload",
                reason: format!(
                    "{} {}/{} declares {} bytes, layout needs {}",
                    kind.name, header.identifier, header.root, header.payload_size, kind.payload_size
                ),
            });
        }

        let payload = slice_at(data, ChunkHeader::SIZE, kind.payload_size, "chunk payload")?;
        Ok(Decoded::Chunk(Chunk {
            header,
            payload: (kind.decode)(payload)?,
        }))
    }

    /// Iterate consecutive chunks in `data`
    pub fn chunks<'a>(&'a self, data: &'a [u8]) -> Chunks<'a> {
        Chunks {
            registry: self,
            data,
            offset: 0,
            done: false,
        }
    }
}

/// Iterator over a buffer of back-to-back chunks
///
/// Yields `(offset, decoded)` pairs. Stops after the first error.
pub struct Chunks<'a> {
    registry: &'a ChunkRegistry,
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    fn next_chunk(&mut self) -> Result<(usize, Decoded)> {
        let start = self.offset;
        let rest = &self.data[start..];

        let header = ChunkHeader::from_bytes(rest)?;
        let chunk = slice_at(rest, 0, header.total_size(), "chunk")?;
        let decoded = self.registry.decode(chunk)?;

        self.offset += header.total_size();
        Ok((start, decoded))
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<(usize, Decoded)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }

        let item = self.next_chunk();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_bytes(identifier: &[u8; 4], root: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(identifier);
        data.extend_from_slice(root);
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    fn effect_payload(model_key: u64) -> Vec<u8> {
        let mut payload = vec![0u8; 32];
        payload.extend_from_slice(&model_key.to_le_bytes());
        payload
    }

    #[test]
    fn test_decode_registered_chunk() {
        let data = chunk_bytes(b"RPCE", b"TCFE", &effect_payload(0x0DEA_D000));
        let decoded = ChunkRegistry::with_builtin().decode(&data).unwrap();

        let chunk = decoded.chunk().expect("registered chunk");
        assert_eq!(chunk.identifier(), Tag::new(b"RPCE"));
        assert_eq!(chunk.root(), Tag::new(b"TCFE"));
        match &chunk.payload {
            ChunkPayload::ParticleEffect(effect) => assert_eq!(effect.model_key, 0x0DEA_D000),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_decode_unregistered_reads_header_only() {
        // Header claims a large payload that is not there
        let mut data = chunk_bytes(b"XXXX", b"TCFE", &[]);
        data[8..12].copy_from_slice(&4096u32.to_le_bytes());

        let decoded = ChunkRegistry::with_builtin().decode(&data).unwrap();
        assert!(matches!(decoded, Decoded::NotRecognized(h) if h.payload_size == 4096));
    }

    #[test]
    fn test_identifier_pair_must_match() {
        // Known identifier under a different root is a different kind
        let data = chunk_bytes(b"RPCE", b"LDOM", &effect_payload(1));
        let decoded = ChunkRegistry::with_builtin().decode(&data).unwrap();
        assert!(decoded.chunk().is_none());
    }

    #[test]
    fn test_decode_registered_short_payload_fails() {
        // Declared size matches layout, buffer is truncated
        let mut data = chunk_bytes(b"RPCE", b"TCFE", &effect_payload(1));
        data.truncate(ChunkHeader::SIZE + 20);
        let err = ChunkRegistry::with_builtin().decode(&data).unwrap_err();
        assert!(err.is_malformed());

        // Declared size smaller than layout
        let data = chunk_bytes(b"RPCE", b"TCFE", &[0u8; 8]);
        let err = ChunkRegistry::with_builtin().decode(&data).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_register_without_changing_decode() {
        let mut registry = ChunkRegistry::new();
        assert!(registry.is_empty());
        assert!(registry
            .register(Tag::new(b"TSET"), Tag::new(b"TOOR"), ChunkKind::raw("test", 4))
            .is_none());

        let data = chunk_bytes(b"TSET", b"TOOR", &[1, 2, 3, 4, 5]);
        let decoded = registry.decode(&data).unwrap();
        assert_eq!(
            decoded.chunk().map(|c| c.payload.clone()),
            Some(ChunkPayload::Raw(vec![1, 2, 3, 4]))
        );
    }

    #[test]
    fn test_chunks_iterates_and_skips_unknown() {
        let mut data = chunk_bytes(b"RPCE", b"TCFE", &effect_payload(7));
        data.extend(chunk_bytes(b"NKNU", b"TCFE", &[9u8; 12]));
        data.extend(chunk_bytes(b"RPCE", b"TCFE", &effect_payload(8)));

        let registry = ChunkRegistry::with_builtin();
        let items: Vec<_> = registry.chunks(&data).collect::<Result<_>>().unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].0, 0);
        assert_eq!(items[1].0, 56);
        assert_eq!(items[2].0, 56 + 28);
        assert!(matches!(items[1].1, Decoded::NotRecognized(_)));
        assert_eq!(
            items
                .iter()
                .filter_map(|(_, d)| d.chunk())
                .count(),
            2
        );
    }

    #[test]
    fn test_chunks_stops_on_truncated_chunk() {
        let mut data = chunk_bytes(b"NKNU", b"TCFE", &[0u8; 4]);
        let mut truncated = chunk_bytes(b"NKNU", b"TCFE", &[0u8; 16]);
        truncated.truncate(20);
        data.extend(truncated);

        let registry = ChunkRegistry::with_builtin();
        let items: Vec<_> = registry.chunks(&data).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].as_ref().is_err_and(|e| e.is_malformed()));
    }

    #[test]
    fn test_builtin_decode_function() {
        let data = chunk_bytes(b"RPCE", b"TCFE", &effect_payload(3));
        assert!(super::super::decode(&data).unwrap().chunk().is_some());
        assert_eq!(super::super::builtin().len(), 1);
    }
}
