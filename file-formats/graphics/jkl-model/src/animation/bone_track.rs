//! Per-bone keyframe channels and local transform evaluation

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Mat4, Quat, Vec3};
use std::io::{Read, Seek, Write};

use super::interpolation::{normalize_or_identity, sample_channel};
use crate::error::Result;
use crate::io_ext::WriteExt;
use crate::reader::RecordReader;
use crate::types::{Channel, KeyPosition, KeyRotation, KeyScale, Keyframe};

/// Keyframe channels and bind-pose offset of one bone
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTrack {
    /// Index into the final transform array
    pub bone_id: i32,
    pub positions: Vec<KeyPosition>,
    pub rotations: Vec<KeyRotation>,
    pub scales: Vec<KeyScale>,
    /// Local transform stored in the file; animation supersedes it
    pub rest_local: Mat4,
    /// Mesh space to bone space
    pub offset: Mat4,
    local_transform: Mat4,
}

impl BoneTrack {
    /// Smallest bone record: id, two matrices and three key counts
    pub(crate) const MIN_SIZE: u64 = 4 + 64 + 12 + 64;

    pub fn new(
        bone_id: i32,
        positions: Vec<KeyPosition>,
        rotations: Vec<KeyRotation>,
        scales: Vec<KeyScale>,
        offset: Mat4,
    ) -> Self {
        Self {
            bone_id,
            positions,
            rotations,
            scales,
            rest_local: Mat4::IDENTITY,
            offset,
            local_transform: Mat4::IDENTITY,
        }
    }

    /// Set the rest local transform carried through the file
    pub fn with_rest_local(mut self, rest_local: Mat4) -> Self {
        self.rest_local = rest_local;
        self
    }

    pub(crate) fn parse<R: Read + Seek>(reader: &mut RecordReader<'_, R>) -> Result<Self> {
        let bone_id = reader.read_i32("bone id")?;
        let rest_local = reader.read_mat4("bone rest transform")?;

        let position_count =
            reader.read_count("position key count", Channel::Position.key_size())?;
        let rotation_count =
            reader.read_count("rotation key count", Channel::Rotation.key_size())?;
        let scale_count = reader.read_count("scale key count", Channel::Scale.key_size())?;

        let mut positions = Vec::with_capacity(position_count);
        for _ in 0..position_count {
            let value = reader.read_vec3("position key")?;
            let time = reader.read_f32("position key time")?;
            positions.push(Keyframe::new(value, time));
        }

        let mut rotations = Vec::with_capacity(rotation_count);
        for _ in 0..rotation_count {
            let value = reader.read_quat("rotation key")?;
            let time = reader.read_f32("rotation key time")?;
            rotations.push(Keyframe::new(value, time));
        }

        let mut scales = Vec::with_capacity(scale_count);
        for _ in 0..scale_count {
            let value = reader.read_vec3("scale key")?;
            let time = reader.read_f32("scale key time")?;
            scales.push(Keyframe::new(value, time));
        }

        let offset = reader.read_mat4("bone offset")?;

        Ok(Self {
            bone_id,
            positions,
            rotations,
            scales,
            rest_local,
            offset,
            local_transform: Mat4::IDENTITY,
        })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.bone_id)?;
        writer.write_mat4(&self.rest_local)?;
        writer.write_i32::<LittleEndian>(self.positions.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.rotations.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.scales.len() as i32)?;

        for key in &self.positions {
            writer.write_vec3(key.value)?;
            writer.write_f32::<LittleEndian>(key.time)?;
        }
        for key in &self.rotations {
            writer.write_quat(key.value)?;
            writer.write_f32::<LittleEndian>(key.time)?;
        }
        for key in &self.scales {
            writer.write_vec3(key.value)?;
            writer.write_f32::<LittleEndian>(key.time)?;
        }

        writer.write_mat4(&self.offset)?;
        Ok(())
    }

    pub fn sample_position(&self, time: f32) -> Vec3 {
        sample_channel(&self.positions, time, Vec3::ZERO)
    }

    /// Sampled rotation, always unit length
    pub fn sample_rotation(&self, time: f32) -> Quat {
        normalize_or_identity(sample_channel(&self.rotations, time, Quat::IDENTITY))
    }

    pub fn sample_scale(&self, time: f32) -> Vec3 {
        sample_channel(&self.scales, time, Vec3::ONE)
    }

    /// Local transform at `time`: translation * rotation * scale
    pub fn sample(&self, time: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.sample_scale(time),
            self.sample_rotation(time),
            self.sample_position(time),
        )
    }

    /// Recompute the current local transform
    pub fn update(&mut self, time: f32) {
        self.local_transform = self.sample(time);
    }

    /// Local transform from the most recent [`BoneTrack::update`]
    pub fn local_transform(&self) -> Mat4 {
        self.local_transform
    }

    /// Key counts as (position, rotation, scale)
    pub fn key_counts(&self) -> (usize, usize, usize) {
        (self.positions.len(), self.rotations.len(), self.scales.len())
    }

    /// Timestamps of one channel
    pub fn key_times(&self, channel: Channel) -> Vec<f32> {
        match channel {
            Channel::Position => self.positions.iter().map(|k| k.time).collect(),
            Channel::Rotation => self.rotations.iter().map(|k| k.time).collect(),
            Channel::Scale => self.scales.iter().map(|k| k.time).collect(),
        }
    }
}
