//! Animation header and info table

use serde::Serialize;

use super::types::ChannelKind;
use crate::binary::{to_offset, Reader};
use crate::Result;

/// Animation header (80 bytes, at the start of the blob)
///
/// Offsets are relative to the start of the blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnimationHeader {
    pub counter: u32,
    /// Clip length in seconds
    pub duration: f32,
    pub fps: f32,
    pub bone_count: u32,
    pub unknown: u64,
    /// Key of the asset the clip is bound to
    pub reference_key: u64,
    pub padding: u64,
    pub bone_list_offset: u64,
    pub info_table_offset: u64,
    pub end_offsets: [u64; 2],
    pub zero: u64,
}

impl AnimationHeader {
    pub const SIZE: usize = 80;

    /// Read header from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = Reader::at(data, 0, Self::SIZE, "animation header")?;
        Ok(Self {
            counter: r.read_u32()?,
            duration: r.read_f32()?,
            fps: r.read_f32()?,
            bone_count: r.read_u32()?,
            unknown: r.read_u64()?,
            reference_key: r.read_u64()?,
            padding: r.read_u64()?,
            bone_list_offset: r.read_u64()?,
            info_table_offset: r.read_u64()?,
            end_offsets: [r.read_u64()?, r.read_u64()?],
            zero: r.read_u64()?,
        })
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.counter.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.duration.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.fps.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.bone_count.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.unknown.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.reference_key.to_le_bytes());
        bytes[32..40].copy_from_slice(&self.padding.to_le_bytes());
        bytes[40..48].copy_from_slice(&self.bone_list_offset.to_le_bytes());
        bytes[48..56].copy_from_slice(&self.info_table_offset.to_le_bytes());
        bytes[56..64].copy_from_slice(&self.end_offsets[0].to_le_bytes());
        bytes[64..72].copy_from_slice(&self.end_offsets[1].to_le_bytes());
        bytes[72..80].copy_from_slice(&self.zero.to_le_bytes());
        bytes
    }

    pub fn info_table_offset(&self) -> Result<usize> {
        to_offset(self.info_table_offset, "info table offset")
    }

    pub fn bone_list_offset(&self) -> Result<usize> {
        to_offset(self.bone_list_offset, "bone list offset")
    }
}

/// Count and stream offsets for one channel family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FamilyLayout {
    pub count: u16,
    pub index_offset: i32,
    pub value_offset: i32,
}

/// Per-family sample counts and stream offsets (32 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnimationInfoTable {
    pub scale_count: u16,
    pub position_count: u16,
    pub rotation_count: u16,
    pub flags: u16,
    pub scale_indices_offset: i32,
    pub position_indices_offset: i32,
    pub rotation_indices_offset: i32,
    pub scale_data_offset: i32,
    pub position_data_offset: i32,
    pub rotation_data_offset: i32,
}

impl AnimationInfoTable {
    pub const SIZE: usize = 32;

    /// Read the table at `offset` within the blob
    pub fn from_bytes(data: &[u8], offset: usize) -> Result<Self> {
        let mut r = Reader::at(data, offset, Self::SIZE, "animation info table")?;
        Ok(Self {
            scale_count: r.read_u16()?,
            position_count: r.read_u16()?,
            rotation_count: r.read_u16()?,
            flags: r.read_u16()?,
            scale_indices_offset: r.read_i32()?,
            position_indices_offset: r.read_i32()?,
            rotation_indices_offset: r.read_i32()?,
            scale_data_offset: r.read_i32()?,
            position_data_offset: r.read_i32()?,
            rotation_data_offset: r.read_i32()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.scale_count.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.position_count.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.rotation_count.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.scale_indices_offset.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.position_indices_offset.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.rotation_indices_offset.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.scale_data_offset.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.position_data_offset.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.rotation_data_offset.to_le_bytes());
        bytes
    }

    pub fn family(&self, kind: ChannelKind) -> FamilyLayout {
        match kind {
            ChannelKind::Scale => FamilyLayout {
                count: self.scale_count,
                index_offset: self.scale_indices_offset,
                value_offset: self.scale_data_offset,
            },
            ChannelKind::Position => FamilyLayout {
                count: self.position_count,
                index_offset: self.position_indices_offset,
                value_offset: self.position_data_offset,
            },
            ChannelKind::Rotation => FamilyLayout {
                count: self.rotation_count,
                index_offset: self.rotation_indices_offset,
                value_offset: self.rotation_data_offset,
            },
        }
    }

    pub fn set_family(&mut self, kind: ChannelKind, layout: FamilyLayout) {
        let (count, index_offset, value_offset) = match kind {
            ChannelKind::Scale => (
                &mut self.scale_count,
                &mut self.scale_indices_offset,
                &mut self.scale_data_offset,
            ),
            ChannelKind::Position => (
                &mut self.position_count,
                &mut self.position_indices_offset,
                &mut self.position_data_offset,
            ),
            ChannelKind::Rotation => (
                &mut self.rotation_count,
                &mut self.rotation_indices_offset,
                &mut self.rotation_data_offset,
            ),
        };
        *count = layout.count;
        *index_offset = layout.index_offset;
        *value_offset = layout.value_offset;
    }

    /// Largest per-family sample count
    pub fn max_count(&self) -> u16 {
        self.scale_count
            .max(self.position_count)
            .max(self.rotation_count)
    }
}
