//! Per-call state handed to scenes in place of globals

use crate::collaborators::{GeometryUploader, Renderer, TextureLoader, UniformSink};
use crate::config::EngineConfig;
use crate::input::{DirectionKeys, InputDirection};

/// Available to [`crate::Scene::init`] for loading assets
pub struct InitContext<'a> {
    pub config: &'a EngineConfig,
    pub geometry: &'a mut dyn GeometryUploader,
    pub textures: &'a mut dyn TextureLoader,
    pub uniforms: &'a mut dyn UniformSink,
}

/// Available to [`crate::Scene::frame`] once per frame
pub struct FrameContext<'a> {
    pub config: &'a EngineConfig,
    /// Zero-based frame number
    pub frame: u64,
    /// Platform time at the start of this frame, in seconds
    pub elapsed: f64,
    pub keys: DirectionKeys,
    pub direction: InputDirection,
    pub uniforms: &'a mut dyn UniformSink,
    pub renderer: &'a mut dyn Renderer,
    pub geometry: &'a mut dyn GeometryUploader,
}
