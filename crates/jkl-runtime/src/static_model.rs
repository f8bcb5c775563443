//! Non-animated meshes drawn with a transform

use glam::{Mat4, Vec3};
use jkl_model::static_mesh::{StaticMesh, StaticVertex, model_matrix};
use log::debug;
use std::mem::size_of;
use std::path::Path;

use crate::collaborators::{
    AttributeKind, GeometryHandle, GeometryUpload, GeometryUploader, Renderer, UniformSink,
    VertexAttribute,
};
use crate::error::Result;
use crate::skinned::MODEL_UNIFORM;

const FLOAT: usize = size_of::<f32>();

/// Position, colour, normal, UV
pub const STATIC_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        location: 0,
        kind: AttributeKind::Float,
        components: 3,
        offset: 0,
    },
    VertexAttribute {
        location: 1,
        kind: AttributeKind::Float,
        components: 3,
        offset: 3 * FLOAT,
    },
    VertexAttribute {
        location: 2,
        kind: AttributeKind::Float,
        components: 3,
        offset: 6 * FLOAT,
    },
    VertexAttribute {
        location: 3,
        kind: AttributeKind::Float,
        components: 2,
        offset: 9 * FLOAT,
    },
];

/// Bytes per flattened static vertex
pub const STATIC_STRIDE: usize = StaticVertex::FLOATS * FLOAT;

/// A static mesh uploaded as a non-indexed triangle list
#[derive(Debug, Clone)]
pub struct StaticModel {
    handle: GeometryHandle,
    vertex_count: usize,
    pub position: Vec3,
    pub scale: Vec3,
    /// Euler angles in degrees, applied X then Y then Z
    pub rotation: Vec3,
}

impl StaticModel {
    pub fn load(path: impl AsRef<Path>, geometry: &mut dyn GeometryUploader) -> Result<Self> {
        let path = path.as_ref();
        let mesh = StaticMesh::load(path)?;
        debug!(
            "Loaded static mesh {} ({} triangles)",
            path.display(),
            mesh.triangles.len()
        );
        Self::from_mesh(&mesh, geometry)
    }

    pub fn from_mesh(mesh: &StaticMesh, geometry: &mut dyn GeometryUploader) -> Result<Self> {
        let floats = mesh.flatten_floats()?;
        let upload = GeometryUpload {
            vertex_data: bytemuck::cast_slice(&floats),
            stride: STATIC_STRIDE,
            attributes: &STATIC_ATTRIBUTES,
            indices: None,
        };
        let vertex_count = upload.vertex_count();
        let handle = geometry.upload(&upload)?;

        Ok(Self {
            handle,
            vertex_count,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        })
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub fn set_rotation(&mut self, degrees: Vec3) {
        self.rotation = degrees;
    }

    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(self.position, self.scale, self.rotation)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn handle(&self) -> GeometryHandle {
        self.handle
    }

    pub fn draw(&self, uniforms: &mut dyn UniformSink, renderer: &mut dyn Renderer) {
        uniforms.set_mat4(MODEL_UNIFORM, &self.model_matrix());
        renderer.draw_arrays(self.handle, self.vertex_count);
    }

    pub fn release(self, geometry: &mut dyn GeometryUploader) {
        geometry.release(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_layout() {
        assert_eq!(STATIC_STRIDE, 44);
        let offsets: Vec<usize> = STATIC_ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 36]);
    }
}
