//! Chunk dump command

use anyhow::{Context, Result};
use owpack::{chunk, Decoded};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ChunkEntry {
    offset: usize,
    #[serde(flatten)]
    decoded: Decoded,
}

/// Decode every chunk in `data` with the built-in registry
///
/// Decoding stops at the first malformed chunk; everything before it is kept.
fn decode_all(data: &[u8]) -> (Vec<ChunkEntry>, Option<owpack::Error>) {
    let mut entries = Vec::new();
    for item in chunk::builtin().chunks(data) {
        match item {
            Ok((offset, decoded)) => entries.push(ChunkEntry { offset, decoded }),
            Err(e) => return (entries, Some(e)),
        }
    }
    (entries, None)
}

pub fn handle(input: &Path, output: Option<&Path>) -> Result<()> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let (entries, error) = decode_all(&data);

    let mut unrecognized = 0;
    for entry in entries.iter().filter(|e| e.decoded.chunk().is_none()) {
        let header = entry.decoded.header();
        tracing::debug!(
            offset = entry.offset,
            identifier = %header.identifier,
            root = %header.root,
            size = header.payload_size,
            "No decoder registered"
        );
        unrecognized += 1;
    }
    tracing::info!(
        chunks = entries.len(),
        unrecognized,
        "Decoded {}",
        input.display()
    );

    super::write_json(&entries, output)?;

    if let Some(e) = error {
        return Err(e).with_context(|| format!("Chunk stream in {} is malformed", input.display()));
    }
    Ok(())
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

    #[test]
    fn test_decode_all_keeps_prefix_on_error() {
        let mut data = chunk_bytes(b"RPCE", b"TCFE", &[0u8; 40]);
        data.extend(chunk_bytes(b"NKNU", b"TCFE", &[1, 2]));
        data.extend_from_slice(b"RPCE");

        let (entries, error) = decode_all(&data);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].offset, 56);
        assert!(error.is_some_and(|e| e.is_malformed()));
    }

    #[test]
    fn test_entries_serialize_with_offset() {
        let data = chunk_bytes(b"NKNU", b"TCFE", &[]);
        let (entries, error) = decode_all(&data);
        assert!(error.is_none());

        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["offset"], 0);
        assert_eq!(json[0]["NotRecognized"]["identifier"], "NKNU");
    }

    #[test]
    fn test_handle_writes_json_and_fails_on_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("effect.bin");
        let output = dir.path().join("effect.json");

        let mut data = chunk_bytes(b"NKNU", b"TCFE", &[7u8; 4]);
        std::fs::write(&input, &data).unwrap();
        handle(&input, Some(&output)).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(json[0]["NotRecognized"]["payload_size"], 4);

        data.extend_from_slice(b"RPCE");
        std::fs::write(&input, &data).unwrap();
        assert!(handle(&input, Some(&output)).is_err());
    }
}
