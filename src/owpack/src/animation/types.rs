//! Animation data types

use byteorder::{ByteOrder, LE};
use serde::Serialize;

/// Bone ids in index streams are u16
pub const BONE_INDEX_SIZE: usize = 2;

/// Channel family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Position,
    Scale,
    Rotation,
}

impl ChannelKind {
    /// Families in info-table order
    pub const STREAM_ORDER: [ChannelKind; 3] =
        [ChannelKind::Scale, ChannelKind::Position, ChannelKind::Rotation];

    /// f32 components per value
    pub const fn components(self) -> usize {
        match self {
            ChannelKind::Position | ChannelKind::Scale => 3,
            ChannelKind::Rotation => 4,
        }
    }

    /// Bytes per value in the value stream
    pub const fn value_size(self) -> usize {
        self.components() * 4
    }
}

/// One sampled channel value; the shape follows the channel kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "channel", content = "value", rename_all = "snake_case")]
pub enum ChannelValue {
    Position([f32; 3]),
    Scale([f32; 3]),
    /// Quaternion [x, y, z, w]
    Rotation([f32; 4]),
}

impl ChannelValue {
    /// Decode one value of `kind` from exactly `kind.value_size()` bytes
    pub(crate) fn read(kind: ChannelKind, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), kind.value_size());
        let f = |i: usize| LE::read_f32(&bytes[i * 4..]);
        match kind {
            ChannelKind::Position => ChannelValue::Position([f(0), f(1), f(2)]),
            ChannelKind::Scale => ChannelValue::Scale([f(0), f(1), f(2)]),
            ChannelKind::Rotation => ChannelValue::Rotation([f(0), f(1), f(2), f(3)]),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelValue::Position(_) => ChannelKind::Position,
            ChannelValue::Scale(_) => ChannelKind::Scale,
            ChannelValue::Rotation(_) => ChannelKind::Rotation,
        }
    }
}

/// One bone's channel values at a keyframe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoneAnimation {
    pub bone_id: u16,
    /// Never empty
    pub values: Vec<ChannelValue>,
}

impl BoneAnimation {
    pub fn get(&self, kind: ChannelKind) -> Option<&ChannelValue> {
        self.values.iter().find(|v| v.kind() == kind)
    }

    pub fn position(&self) -> Option<[f32; 3]> {
        match self.get(ChannelKind::Position) {
            Some(ChannelValue::Position(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn scale(&self) -> Option<[f32; 3]> {
        match self.get(ChannelKind::Scale) {
            Some(ChannelValue::Scale(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn rotation(&self) -> Option<[f32; 4]> {
        match self.get(ChannelKind::Rotation) {
            Some(ChannelValue::Rotation(v)) => Some(*v),
            _ => None,
        }
    }
}

/// One timeline sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyframe {
    /// Time in seconds (frame index / fps)
    pub frame_position: f32,
    /// Sorted by bone id
    pub bones: Vec<BoneAnimation>,
}

impl Keyframe {
    pub fn bone(&self, bone_id: u16) -> Option<&BoneAnimation> {
        self.bones
            .binary_search_by_key(&bone_id, |b| b.bone_id)
            .ok()
            .map(|i| &self.bones[i])
    }
}
