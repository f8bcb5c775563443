//! Interfaces the host implements: windowing, uniforms, GPU buffers, textures
//!
//! The runtime never talks to a graphics API directly. Everything it needs
//! from the outside world goes through these traits, so the whole frame
//! loop runs unchanged against the headless implementations in
//! [`crate::headless`].

use glam::{Mat4, Vec3};
use std::path::Path;

use crate::error::Result;
use crate::input::DirectionKeys;

/// Opaque handle to uploaded vertex (and optional index) data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u32);

/// Opaque handle to a loaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Component type of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Float,
    /// Passed to the shader as integers, not normalized floats
    Int,
}

/// One attribute of an interleaved vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub kind: AttributeKind,
    pub components: u32,
    /// Byte offset inside one vertex
    pub offset: usize,
}

/// Interleaved vertex data handed to a [`GeometryUploader`]
#[derive(Debug, Clone, Copy)]
pub struct GeometryUpload<'a> {
    pub vertex_data: &'a [u8],
    /// Bytes per vertex
    pub stride: usize,
    pub attributes: &'a [VertexAttribute],
    /// Triangle list indices, `None` for non-indexed draws
    pub indices: Option<&'a [u32]>,
}

impl GeometryUpload<'_> {
    pub fn vertex_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.vertex_data.len() / self.stride
        }
    }
}

/// Receives named shader uniforms
pub trait UniformSink {
    fn set_int(&mut self, name: &str, value: i32);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_mat4(&mut self, name: &str, value: &Mat4);
    /// Upload `name[0]..name[len-1]`
    fn set_mat4_array(&mut self, name: &str, values: &[Mat4]);
}

/// Creates and destroys GPU vertex/index buffers
pub trait GeometryUploader {
    fn upload(&mut self, geometry: &GeometryUpload<'_>) -> Result<GeometryHandle>;
    fn release(&mut self, handle: GeometryHandle);
}

/// Loads textures from disk
pub trait TextureLoader {
    fn load(&mut self, path: &Path) -> Result<TextureHandle>;
}

/// Issues draw calls against the current target
pub trait Renderer {
    fn clear(&mut self, color: [f32; 4]);
    fn draw_indexed(&mut self, geometry: GeometryHandle, index_count: usize);
    fn draw_arrays(&mut self, geometry: GeometryHandle, vertex_count: usize);
}

/// Window, clock and input
pub trait Platform {
    fn should_close(&self) -> bool;
    /// Seconds since the platform started
    fn elapsed_seconds(&self) -> f64;
    fn poll_input(&mut self) -> DirectionKeys;
    /// Swap buffers and pump window events
    fn present(&mut self);
}

/// Every collaborator the frame loop needs, borrowed for one run
pub struct Collaborators<'a> {
    pub platform: &'a mut dyn Platform,
    pub uniforms: &'a mut dyn UniformSink,
    pub geometry: &'a mut dyn GeometryUploader,
    pub textures: &'a mut dyn TextureLoader,
    pub renderer: &'a mut dyn Renderer,
}
