//! Compact animation decoding
//!
//! # Layout
//! ```text
//! Header (80 bytes, offsets relative to blob start):
//! 0x00: counter u32
//! 0x04: duration f32          - clip length in seconds
//! 0x08: fps f32
//! 0x0C: bone_count u32
//! 0x10: unknown u64
//! 0x18: reference_key u64
//! 0x20: padding u64
//! 0x28: bone_list_offset u64  - bone_count × u32 bone ids
//! 0x30: info_table_offset u64
//! 0x38: end offsets 2 × u64
//! 0x48: zero u64
//!
//! Info table (32 bytes):
//! 0x00: scale, position, rotation counts 3 × u16, flags u16
//! 0x08: scale, position, rotation index stream offsets 3 × i32
//! 0x14: scale, position, rotation value stream offsets 3 × i32
//!
//! Streams, per family with a nonzero count:
//! index stream: count × u16 bone id
//! value stream: count × (3 × f32) for scale/position, count × (4 × f32) for rotation
//! ```
//!
//! Samples carry no timestamps. Each family stream stores one block of
//! `bone_count` samples per keyframe, so sample `i` belongs to frame
//! `i / bone_count`, at time `frame / fps`.

mod header;
mod types;


use std::collections::BTreeMap;

use byteorder::{ByteOrder, LE};
use serde::Serialize;

use crate::binary::{slice_at, to_offset};
use crate::{Error, Result};

pub use header::{AnimationHeader, AnimationInfoTable, FamilyLayout};
pub use types::{BoneAnimation, ChannelKind, ChannelValue, Keyframe, BONE_INDEX_SIZE};

/// A fully decoded animation blob
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub header: AnimationHeader,
    pub info: AnimationInfoTable,
    /// Bone ids from the bone list table
    pub bones: Vec<u32>,
    pub keyframes: Vec<Keyframe>,
}

impl Animation {
    /// Decode header, info table, bone list and keyframes
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = AnimationHeader::from_bytes(data)?;
        let info = AnimationInfoTable::from_bytes(data, header.info_table_offset()?)?;
        let bones = read_bone_list(data, &header)?;
        let keyframes = build_keyframes(data, &header, &info)?;

        Ok(Self {
            header,
            info,
            bones,
            keyframes,
        })
    }
}

/// Decode the keyframes of an animation blob
pub fn decode(data: &[u8]) -> Result<Vec<Keyframe>> {
    let header = AnimationHeader::from_bytes(data)?;
    let info = AnimationInfoTable::from_bytes(data, header.info_table_offset()?)?;
    build_keyframes(data, &header, &info)
}

fn read_bone_list(data: &[u8], header: &AnimationHeader) -> Result<Vec<u32>> {
    if header.bone_count == 0 {
        return Ok(Vec::new());
    }

    let len = (header.bone_count as usize)
        .checked_mul(4)
        .ok_or_else(|| Error::Malformed {
            context: "bone list",
            reason: format!("bone count {} overflows", header.bone_count),
        })?;
    let list = slice_at(data, header.bone_list_offset()?, len, "bone list")?;
    Ok(list.chunks_exact(4).map(LE::read_u32).collect())
}

/// Pair a family's index stream with its value stream
///
/// Families with a zero count are skipped without looking at their offsets.
fn read_family(
    data: &[u8],
    info: &AnimationInfoTable,
    kind: ChannelKind,
) -> Result<Vec<(u16, ChannelValue)>> {
    let layout = info.family(kind);
    if layout.count == 0 {
        return Ok(Vec::new());
    }

    let count = layout.count as usize;
    let indices = slice_at(
        data,
        to_offset(layout.index_offset, "index stream offset")?,
        count * BONE_INDEX_SIZE,
        "index stream",
    )?;
    let values = slice_at(
        data,
        to_offset(layout.value_offset, "value stream offset")?,
        count * kind.value_size(),
        "value stream",
    )?;

    Ok(indices
        .chunks_exact(BONE_INDEX_SIZE)
        .zip(values.chunks_exact(kind.value_size()))
        .map(|(index, value)| (LE::read_u16(index), ChannelValue::read(kind, value)))
        .collect())
}

fn build_keyframes(
    data: &[u8],
    header: &AnimationHeader,
    info: &AnimationInfoTable,
) -> Result<Vec<Keyframe>> {
    let mut families = Vec::with_capacity(ChannelKind::STREAM_ORDER.len());
    for kind in ChannelKind::STREAM_ORDER {
        families.push(read_family(data, info, kind)?);
    }

    let max_count = families.iter().map(Vec::len).max().unwrap_or(0);
    if max_count == 0 {
        return Ok(Vec::new());
    }

    if header.bone_count == 0 {
        return Err(Error::Malformed {
            context: "animation",
            reason: format!("{} samples but bone count is zero", max_count),
        });
    }
    if !header.fps.is_finite() || header.fps <= 0.0 {
        return Err(Error::Malformed {
            context: "animation",
            reason: format!("invalid frame rate {}", header.fps),
        });
    }

    let bone_count = header.bone_count as usize;
    let frame_count = max_count.div_ceil(bone_count);
    let mut frames: Vec<BTreeMap<u16, Vec<ChannelValue>>> = vec![BTreeMap::new(); frame_count];

    for samples in families {
        for (i, (bone_id, value)) in samples.into_iter().enumerate() {
            frames[i / bone_count].entry(bone_id).or_default().push(value);
        }
    }

    tracing::trace!(frames = frame_count, bones = bone_count, "Decoded animation");

    Ok(frames
        .into_iter()
        .enumerate()
        .map(|(frame, bones)| Keyframe {
            frame_position: frame as f32 / header.fps,
            bones: bones
                .into_iter()
                .map(|(bone_id, values)| BoneAnimation { bone_id, values })
                .collect(),
        })
        .collect())
}
