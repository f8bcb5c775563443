//! Skinned model: GPU upload plus per-frame bone matrix submission

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use jkl_model::{AnimationPlayer, JklModel, LeafBonePolicy, Vertex};
use log::debug;
use std::mem::{offset_of, size_of};
use std::path::Path;

use crate::collaborators::{
    AttributeKind, GeometryHandle, GeometryUpload, GeometryUploader, Renderer, UniformSink,
    VertexAttribute,
};
use crate::error::Result;

/// Uniform array receiving the final bone matrices
pub const BONES_UNIFORM: &str = "gBones";
/// Uniform receiving the model matrix
pub const MODEL_UNIFORM: &str = "model";

/// Interleaved skinned vertex as laid out in the vertex buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub bone_ids: [i32; 4],
    pub weights: [f32; 4],
}

impl GpuVertex {
    pub const STRIDE: usize = size_of::<Self>();

    pub const ATTRIBUTES: [VertexAttribute; 7] = [
        VertexAttribute {
            location: 0,
            kind: AttributeKind::Float,
            components: 3,
            offset: offset_of!(GpuVertex, position),
        },
        VertexAttribute {
            location: 1,
            kind: AttributeKind::Float,
            components: 3,
            offset: offset_of!(GpuVertex, normal),
        },
        VertexAttribute {
            location: 2,
            kind: AttributeKind::Float,
            components: 2,
            offset: offset_of!(GpuVertex, uv),
        },
        VertexAttribute {
            location: 3,
            kind: AttributeKind::Float,
            components: 3,
            offset: offset_of!(GpuVertex, tangent),
        },
        VertexAttribute {
            location: 4,
            kind: AttributeKind::Float,
            components: 3,
            offset: offset_of!(GpuVertex, bitangent),
        },
        VertexAttribute {
            location: 5,
            kind: AttributeKind::Int,
            components: 4,
            offset: offset_of!(GpuVertex, bone_ids),
        },
        VertexAttribute {
            location: 6,
            kind: AttributeKind::Float,
            components: 4,
            offset: offset_of!(GpuVertex, weights),
        },
    ];
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            uv: v.uv.to_array(),
            tangent: v.tangent.to_array(),
            bitangent: v.bitangent.to_array(),
            bone_ids: v.bone_ids,
            weights: v.weights,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct UploadedMesh {
    handle: GeometryHandle,
    index_count: usize,
}

/// An animated model whose meshes live on the GPU
#[derive(Debug)]
pub struct SkinnedModel {
    meshes: Vec<UploadedMesh>,
    player: AnimationPlayer,
}

impl SkinnedModel {
    /// Load a `.jkl` file and upload every mesh
    pub fn load(
        path: impl AsRef<Path>,
        geometry: &mut dyn GeometryUploader,
        policy: LeafBonePolicy,
    ) -> Result<Self> {
        let path = path.as_ref();
        let model = JklModel::load(path)?;
        debug!("Loaded {}", path.display());
        Self::from_model(model, geometry, policy)
    }

    /// Upload an already parsed model
    pub fn from_model(
        model: JklModel,
        geometry: &mut dyn GeometryUploader,
        policy: LeafBonePolicy,
    ) -> Result<Self> {
        let (meshes, clip) = model.into_parts();

        let mut uploaded = Vec::with_capacity(meshes.len());
        for mesh in &meshes {
            let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
            let upload = GeometryUpload {
                vertex_data: bytemuck::cast_slice(&vertices),
                stride: GpuVertex::STRIDE,
                attributes: &GpuVertex::ATTRIBUTES,
                indices: Some(mesh.indices.as_slice()),
            };
            match geometry.upload(&upload) {
                Ok(handle) => uploaded.push(UploadedMesh {
                    handle,
                    index_count: mesh.indices.len(),
                }),
                Err(e) => {
                    // Leave nothing half-uploaded behind
                    for done in &uploaded {
                        geometry.release(done.handle);
                    }
                    return Err(e);
                }
            }
        }
        debug!("Uploaded {} meshes", uploaded.len());

        Ok(Self {
            meshes: uploaded,
            player: AnimationPlayer::new(clip.with_leaf_policy(policy)),
        })
    }

    /// Start the clip from the beginning
    pub fn play(&mut self) {
        self.player.play();
    }

    /// Advance the animation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.player.update(dt);
    }

    /// Send the current bone matrices to [`BONES_UNIFORM`]
    pub fn upload_pose(&self, uniforms: &mut dyn UniformSink) {
        uniforms.set_mat4_array(BONES_UNIFORM, self.player.final_bone_matrices());
    }

    /// Draw every mesh with an identity model matrix
    pub fn draw(&self, uniforms: &mut dyn UniformSink, renderer: &mut dyn Renderer) {
        uniforms.set_mat4(MODEL_UNIFORM, &Mat4::IDENTITY);
        for mesh in &self.meshes {
            renderer.draw_indexed(mesh.handle, mesh.index_count);
        }
    }

    /// Return the GPU buffers; the model cannot be drawn afterwards
    pub fn release(self, geometry: &mut dyn GeometryUploader) -> AnimationPlayer {
        for mesh in &self.meshes {
            geometry.release(mesh.handle);
        }
        self.player
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut AnimationPlayer {
        &mut self.player
    }

    pub fn mesh_handles(&self) -> Vec<GeometryHandle> {
        self.meshes.iter().map(|m| m.handle).collect()
    }
}
