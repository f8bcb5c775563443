//! Geometry and keyframe types shared by the model and animation code

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Quat, Vec2, Vec3};
use std::fmt;
use std::io::{Read, Seek, Write};

use crate::error::{JklError, RecordLocation, Result};
use crate::io_ext::WriteExt;
use crate::reader::RecordReader;

/// Number of bone influence slots per vertex
pub const MAX_BONE_INFLUENCE: usize = 4;

/// Bone id of an unused influence slot or a pure transform node
pub const NO_BONE: i32 = -1;

/// A skinned vertex
///
/// Influence weights are stored as authored. They are not guaranteed to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    /// Influencing bone ids, [`NO_BONE`] for unused slots
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    pub weights: [f32; MAX_BONE_INFLUENCE],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            uv: Vec2::ZERO,
            tangent: Vec3::ZERO,
            bitangent: Vec3::ZERO,
            bone_ids: [NO_BONE; MAX_BONE_INFLUENCE],
            weights: [0.0; MAX_BONE_INFLUENCE],
        }
    }
}

impl Vertex {
    /// Size of a vertex record in bytes
    pub const SIZE: usize = 88;

    pub(crate) fn parse<R: Read + Seek>(reader: &mut RecordReader<'_, R>) -> Result<Self> {
        let position = reader.read_vec3("vertex position")?;
        let normal = reader.read_vec3("vertex normal")?;
        let uv = reader.read_vec2("vertex uv")?;
        let tangent = reader.read_vec3("vertex tangent")?;
        let bitangent = reader.read_vec3("vertex bitangent")?;

        let mut bone_ids = [NO_BONE; MAX_BONE_INFLUENCE];
        for id in &mut bone_ids {
            *id = reader.read_i32("vertex bone id")?;
        }

        let mut weights = [0.0; MAX_BONE_INFLUENCE];
        for weight in &mut weights {
            *weight = reader.read_f32("vertex weight")?;
        }

        Ok(Self {
            position,
            normal,
            uv,
            tangent,
            bitangent,
            bone_ids,
            weights,
        })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_vec3(self.position)?;
        writer.write_vec3(self.normal)?;
        writer.write_vec2(self.uv)?;
        writer.write_vec3(self.tangent)?;
        writer.write_vec3(self.bitangent)?;
        for id in self.bone_ids {
            writer.write_i32::<LittleEndian>(id)?;
        }
        for weight in self.weights {
            writer.write_f32::<LittleEndian>(weight)?;
        }
        Ok(())
    }

    /// Used influence slots as `(bone_id, weight)` pairs
    pub fn influences(&self) -> impl Iterator<Item = (i32, f32)> + '_ {
        self.bone_ids
            .iter()
            .zip(self.weights.iter())
            .filter(|(id, _)| **id != NO_BONE)
            .map(|(id, weight)| (*id, *weight))
    }

    /// Sum of all influence weights
    pub fn weight_sum(&self) -> f32 {
        self.influences().map(|(_, weight)| weight).sum()
    }
}

/// A mesh: an immutable vertex list and its triangle index list
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Smallest possible mesh record: the two counts
    pub(crate) const HEADER_SIZE: u64 = 8;

    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub(crate) fn parse<R: Read + Seek>(
        reader: &mut RecordReader<'_, R>,
        mesh: usize,
    ) -> Result<Self> {
        reader.at(RecordLocation::Mesh { mesh });

        // Both counts precede both tables, so the size check covers only what
        // each count can claim on its own.
        let vertex_count = reader.read_count("vertex count", Vertex::SIZE as u64)?;
        let index_count = reader.read_count("index count", 4)?;
        let needed = (vertex_count * Vertex::SIZE + index_count * 4) as u64;
        let remaining = reader.remaining()?;
        if needed > remaining {
            return Err(reader.error(format!(
                "vertex count {vertex_count} and index count {index_count} inconsistent with remaining bytes ({needed} needed, {remaining} left)"
            )));
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        for vertex in 0..vertex_count {
            reader.at(RecordLocation::Vertex { mesh, vertex });
            vertices.push(Vertex::parse(reader)?);
        }

        let mut indices = Vec::with_capacity(index_count);
        for index in 0..index_count {
            reader.at(RecordLocation::Index { mesh, index });
            let value = reader.read_u32("index")?;
            if value as usize >= vertex_count {
                return Err(JklError::format(
                    RecordLocation::Index { mesh, index },
                    format!("index {value} out of range for {vertex_count} vertices"),
                ));
            }
            indices.push(value);
        }

        Ok(Self { vertices, indices })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.vertices.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.indices.len() as i32)?;
        for vertex in &self.vertices {
            vertex.write(writer)?;
        }
        for index in &self.indices {
            writer.write_u32::<LittleEndian>(*index)?;
        }
        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A keyed value at a point in clip time (ticks)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Keyframe<T> {
    pub value: T,
    pub time: f32,
}

impl<T> Keyframe<T> {
    pub fn new(value: T, time: f32) -> Self {
        Self { value, time }
    }
}

pub type KeyPosition = Keyframe<Vec3>;
pub type KeyRotation = Keyframe<Quat>;
pub type KeyScale = Keyframe<Vec3>;

/// One of the three keyframe channels of a bone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Position,
    Rotation,
    Scale,
}

impl Channel {
    /// Smallest record size of one key in this channel
    pub(crate) fn key_size(self) -> u64 {
        match self {
            Self::Position | Self::Scale => 16,
            Self::Rotation => 20,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Rotation => write!(f, "rotation"),
            Self::Scale => write!(f, "scale"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_record_size() {
        let mut data = Vec::new();
        Vertex::default().write(&mut data).unwrap();
        assert_eq!(data.len(), Vertex::SIZE);
    }

    #[test]
    fn test_vertex_influences_skip_unused_slots() {
        let vertex = Vertex {
            bone_ids: [2, NO_BONE, 0, NO_BONE],
            weights: [0.25, 0.9, 0.5, 0.0],
            ..Default::default()
        };

        let influences: Vec<_> = vertex.influences().collect();
        assert_eq!(influences, vec![(2, 0.25), (0, 0.5)]);
        assert!((vertex.weight_sum() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Rotation.to_string(), "rotation");
        assert_eq!(Channel::Rotation.key_size(), 20);
    }
}
