use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::animation::{AnimationClip, AnimationPlayer, BoneTrack, HierarchyNode, SkeletonHierarchy};
use crate::error::{JklError, RecordLocation, Result};
use crate::reader::RecordReader;
use crate::types::{Mesh, NO_BONE};

/// A parsed JKL skinned model: meshes plus one animation clip
///
/// The file has no header, magic or version. Records follow each other in
/// fixed order: the mesh table, the clip header, the bone records and the
/// node records.
#[derive(Debug, Clone)]
pub struct JklModel {
    meshes: Vec<Mesh>,
    clip: AnimationClip,
    trailing_bytes: u64,
}

impl JklModel {
    /// Assemble a model, checking indices against each mesh's vertices and
    /// vertex bone references against the clip
    pub fn new(meshes: Vec<Mesh>, clip: AnimationClip) -> Result<Self> {
        check_mesh_indices(&meshes)?;
        check_vertex_bones(&meshes, clip.bone_count())?;
        Ok(Self {
            meshes,
            clip,
            trailing_bytes: 0,
        })
    }

    /// Parse a model from a reader positioned at the first byte of the file
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut reader = RecordReader::new(reader, RecordLocation::MeshTable)?;

        let mesh_count = reader.read_count("mesh count", Mesh::HEADER_SIZE)?;
        let mut meshes = Vec::with_capacity(mesh_count);
        for mesh in 0..mesh_count {
            meshes.push(Mesh::parse(&mut reader, mesh)?);
        }
        debug!("Parsed {} meshes", meshes.len());

        reader.at(RecordLocation::ClipHeader);
        let duration = reader.read_f32("duration")?;
        let ticks_per_second = reader.read_i32("ticks per second")?;
        let bone_count = reader.read_count("bone count", BoneTrack::MIN_SIZE)?;
        let node_count = reader.read_count("node count", HierarchyNode::MIN_SIZE)?;

        let mut bones = Vec::with_capacity(bone_count);
        for bone in 0..bone_count {
            reader.at(RecordLocation::Bone { bone });
            bones.push(BoneTrack::parse(&mut reader)?);
        }

        let mut nodes = Vec::with_capacity(node_count);
        for node in 0..node_count {
            nodes.push(HierarchyNode::parse(&mut reader, node)?);
        }
        debug!("Parsed {} bones and {} nodes", bones.len(), nodes.len());

        let trailing_bytes = reader.remaining()?;
        if trailing_bytes > 0 {
            warn!("{} trailing bytes after the node table", trailing_bytes);
        }

        let hierarchy = SkeletonHierarchy::new(nodes)?;
        let clip = AnimationClip::new(duration, ticks_per_second, hierarchy, bones)?;
        check_vertex_bones(&meshes, clip.bone_count())?;

        Ok(Self {
            meshes,
            clip,
            trailing_bytes,
        })
    }

    /// Load a model from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::parse(&mut reader)
    }

    /// Parse a model from an in-memory buffer
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(&mut Cursor::new(data))
    }

    /// Write the model in the same record order the parser reads
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.meshes.len() as i32)?;
        for mesh in &self.meshes {
            mesh.write(writer)?;
        }

        let hierarchy = self.clip.hierarchy();
        writer.write_f32::<LittleEndian>(self.clip.duration())?;
        writer.write_i32::<LittleEndian>(self.clip.ticks_per_second())?;
        writer.write_i32::<LittleEndian>(self.clip.bone_count() as i32)?;
        writer.write_i32::<LittleEndian>(hierarchy.len() as i32)?;

        for bone in self.clip.bones() {
            bone.write(writer)?;
        }
        for node in hierarchy.nodes() {
            node.write(writer)?;
        }

        Ok(())
    }

    /// Save the model to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write(&mut data)?;
        Ok(data)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn clip_mut(&mut self) -> &mut AnimationClip {
        &mut self.clip
    }

    /// Bytes left in the stream after the last node record
    pub fn trailing_bytes(&self) -> u64 {
        self.trailing_bytes
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len()).sum()
    }

    pub fn into_parts(self) -> (Vec<Mesh>, AnimationClip) {
        (self.meshes, self.clip)
    }

    /// Split off a stopped player bound to this model's clip
    pub fn into_player(self) -> (Vec<Mesh>, AnimationPlayer) {
        (self.meshes, AnimationPlayer::new(self.clip))
    }
}

fn check_mesh_indices(meshes: &[Mesh]) -> Result<()> {
    for (mesh_index, mesh) in meshes.iter().enumerate() {
        let vertex_count = mesh.vertices.len();
        let out_of_range = mesh
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &value)| value as usize >= vertex_count);
        if let Some((index, value)) = out_of_range {
            return Err(JklError::format(
                RecordLocation::Index {
                    mesh: mesh_index,
                    index,
                },
                format!("index {value} out of range for {vertex_count} vertices"),
            ));
        }
    }
    Ok(())
}

fn check_vertex_bones(meshes: &[Mesh], bone_count: usize) -> Result<()> {
    for (mesh_index, mesh) in meshes.iter().enumerate() {
        for (vertex_index, vertex) in mesh.vertices.iter().enumerate() {
            let missing = vertex
                .bone_ids
                .iter()
                .find(|&&id| id != NO_BONE && (id < 0 || id as usize >= bone_count));
            if let Some(&bone_id) = missing {
                return Err(JklError::MissingBone {
                    location: RecordLocation::Vertex {
                        mesh: mesh_index,
                        vertex: vertex_index,
                    },
                    bone_id,
                });
            }
        }
    }
    Ok(())
}
