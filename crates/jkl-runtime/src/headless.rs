//! In-memory collaborators for running the frame loop without a window
//!
//! Used by the CLI `play` command and by tests. Everything is recorded so a
//! caller can inspect what a scene would have sent to the GPU.

use glam::{Mat4, Vec3};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::collaborators::{
    GeometryHandle, GeometryUpload, GeometryUploader, Platform, Renderer, TextureHandle,
    TextureLoader, UniformSink,
};
use crate::error::{Result, RuntimeError};
use crate::input::DirectionKeys;

/// A platform that closes after a fixed number of frames on a fixed clock
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    frame_limit: u64,
    frame_time: f64,
    presented: u64,
    script: Vec<DirectionKeys>,
}

impl HeadlessPlatform {
    pub fn new(frame_limit: u64, frame_time: f64) -> Self {
        Self {
            frame_limit,
            frame_time,
            presented: 0,
            script: Vec::new(),
        }
    }

    /// Keys returned for each frame; frames past the end see no keys
    pub fn with_input_script(mut self, script: Vec<DirectionKeys>) -> Self {
        self.script = script;
        self
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Platform for HeadlessPlatform {
    fn should_close(&self) -> bool {
        self.presented >= self.frame_limit
    }

    fn elapsed_seconds(&self) -> f64 {
        self.presented as f64 * self.frame_time
    }

    fn poll_input(&mut self) -> DirectionKeys {
        usize::try_from(self.presented)
            .ok()
            .and_then(|i| self.script.get(i).copied())
            .unwrap_or(DirectionKeys::NONE)
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

/// Keeps the last value written to each uniform
#[derive(Debug, Clone, Default)]
pub struct RecordingUniforms {
    pub ints: HashMap<String, i32>,
    pub floats: HashMap<String, f32>,
    pub vec3s: HashMap<String, Vec3>,
    pub mat4s: HashMap<String, Mat4>,
    pub mat4_arrays: HashMap<String, Vec<Mat4>>,
    /// Number of `set_mat4_array` calls, per uniform
    pub array_uploads: HashMap<String, usize>,
}

impl RecordingUniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mat4_array(&self, name: &str) -> Option<&[Mat4]> {
        self.mat4_arrays.get(name).map(Vec::as_slice)
    }

    pub fn array_upload_count(&self, name: &str) -> usize {
        self.array_uploads.get(name).copied().unwrap_or(0)
    }
}

impl UniformSink for RecordingUniforms {
    fn set_int(&mut self, name: &str, value: i32) {
        self.ints.insert(name.to_string(), value);
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.vec3s.insert(name.to_string(), value);
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.mat4s.insert(name.to_string(), *value);
    }

    fn set_mat4_array(&mut self, name: &str, values: &[Mat4]) {
        self.mat4_arrays.insert(name.to_string(), values.to_vec());
        *self.array_uploads.entry(name.to_string()).or_default() += 1;
    }
}

/// A recorded draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Indexed {
        geometry: GeometryHandle,
        index_count: usize,
    },
    Arrays {
        geometry: GeometryHandle,
        vertex_count: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub clears: usize,
    pub last_clear: Option<[f32; 4]>,
    pub draws: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, color: [f32; 4]) {
        self.clears += 1;
        self.last_clear = Some(color);
    }

    fn draw_indexed(&mut self, geometry: GeometryHandle, index_count: usize) {
        self.draws.push(DrawCall::Indexed {
            geometry,
            index_count,
        });
    }

    fn draw_arrays(&mut self, geometry: GeometryHandle, vertex_count: usize) {
        self.draws.push(DrawCall::Arrays {
            geometry,
            vertex_count,
        });
    }
}

/// Geometry as it would sit in GPU buffers
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGeometry {
    pub vertex_data: Vec<u8>,
    pub stride: usize,
    pub indices: Option<Vec<u32>>,
}

/// Geometry storage keyed by handle
#[derive(Debug, Clone, Default)]
pub struct MemoryGeometry {
    next_id: u32,
    buffers: HashMap<GeometryHandle, StoredGeometry>,
    /// Uploads allowed before `upload` starts failing
    budget: Option<usize>,
}

impl MemoryGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every upload after the first `budget`
    pub fn with_upload_budget(budget: usize) -> Self {
        Self {
            budget: Some(budget),
            ..Self::default()
        }
    }

    pub fn get(&self, handle: GeometryHandle) -> Option<&StoredGeometry> {
        self.buffers.get(&handle)
    }

    /// Buffers not yet released
    pub fn live(&self) -> usize {
        self.buffers.len()
    }
}

impl GeometryUploader for MemoryGeometry {
    fn upload(&mut self, geometry: &GeometryUpload<'_>) -> Result<GeometryHandle> {
        if let Some(budget) = self.budget.as_mut() {
            if *budget == 0 {
                return Err(RuntimeError::collaborator(
                    "geometry uploader",
                    "out of buffer memory",
                ));
            }
            *budget -= 1;
        }

        let handle = GeometryHandle(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            handle,
            StoredGeometry {
                vertex_data: geometry.vertex_data.to_vec(),
                stride: geometry.stride,
                indices: geometry.indices.map(<[u32]>::to_vec),
            },
        );
        debug!(
            "Stored {} vertices as {handle:?}",
            geometry.vertex_count()
        );
        Ok(handle)
    }

    fn release(&mut self, handle: GeometryHandle) {
        if self.buffers.remove(&handle).is_none() {
            warn!("Release of unknown geometry {handle:?}");
        }
    }
}

/// Hands out texture handles without decoding anything
#[derive(Debug, Clone, Default)]
pub struct StubTextures {
    pub loaded: Vec<PathBuf>,
}

impl TextureLoader for StubTextures {
    fn load(&mut self, path: &Path) -> Result<TextureHandle> {
        let id = u32::try_from(self.loaded.len())
            .map_err(|_| RuntimeError::collaborator("texture loader", "too many textures"))?;
        self.loaded.push(path.to_path_buf());
        Ok(TextureHandle(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_platform_closes_after_limit() {
        let mut platform = HeadlessPlatform::new(2, 0.5);
        assert!(!platform.should_close());
        platform.present();
        assert_eq!(platform.elapsed_seconds(), 0.5);
        platform.present();
        assert!(platform.should_close());
    }

    #[test]
    fn test_input_script_runs_out() {
        let up = DirectionKeys {
            up: true,
            ..DirectionKeys::NONE
        };
        let mut platform = HeadlessPlatform::new(3, 0.1).with_input_script(vec![up]);
        assert_eq!(platform.poll_input(), up);
        platform.present();
        assert_eq!(platform.poll_input(), DirectionKeys::NONE);
    }

    #[test]
    fn test_memory_geometry_budget() {
        let mut geometry = MemoryGeometry::with_upload_budget(1);
        let upload = GeometryUpload {
            vertex_data: &[0; 8],
            stride: 4,
            attributes: &[],
            indices: None,
        };
        let handle = geometry.upload(&upload).unwrap();
        assert_eq!(geometry.get(handle).unwrap().vertex_data.len(), 8);
        assert!(geometry.upload(&upload).is_err());

        geometry.release(handle);
        assert_eq!(geometry.live(), 0);
    }
}
