//! Effect container chunks (`TCFE` root)

use serde::Serialize;

use super::{ChunkKind, ChunkPayload, Tag};
use crate::binary::Reader;
use crate::Result;

/// Root identifier of effect containers
pub const EFFECT_ROOT: Tag = Tag::new(b"TCFE");

/// Particle emitter referencing a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParticleEffect {
    pub unknown: [u64; 4],
    pub model_key: u64,
}

impl ParticleEffect {
    pub const IDENTIFIER: Tag = Tag::new(b"RPCE");
    pub const SIZE: usize = 40;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::at(data, 0, Self::SIZE, "RPCE payload")?;
        let mut unknown = [0u64; 4];
        for value in &mut unknown {
            *value = reader.read_u64()?;
        }
        Ok(Self {
            unknown,
            model_key: reader.read_u64()?,
        })
    }

    pub(super) fn kind() -> ChunkKind {
        ChunkKind {
            name: "particle effect",
            payload_size: Self::SIZE,
            decode: |data| Self::from_bytes(data).map(ChunkPayload::ParticleEffect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_effect_layout() {
        let mut data = Vec::new();
        for v in [1u64, 2, 3, 4, 0x0BAD_F00D] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let effect = ParticleEffect::from_bytes(&data).unwrap();
        assert_eq!(effect.unknown, [1, 2, 3, 4]);
        assert_eq!(effect.model_key, 0x0BAD_F00D);
    }

    #[test]
    fn test_particle_effect_short() {
        assert!(ParticleEffect::from_bytes(&[0u8; 39]).is_err());
    }
}
