//! Frame loop and renderer-facing layer for JKL models.
//!
//! The runtime owns no window and no graphics API. A host supplies the
//! [`collaborators`] (platform, uniforms, geometry, textures, renderer) and a
//! [`Scene`]; [`Engine::run`] then drives the scene once per frame until the
//! platform asks to close. [`SkinnedModel`] and [`StaticModel`] handle the
//! upload and per-frame uniforms for the two mesh kinds.
//!
//! # Example
//!
//! ```rust
//! use jkl_runtime::headless::{
//!     HeadlessPlatform, MemoryGeometry, RecordingRenderer, RecordingUniforms, StubTextures,
//! };
//! use jkl_runtime::{Collaborators, Engine, EngineConfig, NoopScene};
//!
//! # fn main() -> jkl_runtime::Result<()> {
//! let engine = Engine::new(EngineConfig::default())?;
//! let mut platform = HeadlessPlatform::new(3, 1.0 / 60.0);
//! let mut uniforms = RecordingUniforms::new();
//! let mut geometry = MemoryGeometry::new();
//! let mut textures = StubTextures::default();
//! let mut renderer = RecordingRenderer::new();
//!
//! let summary = engine.run(
//!     &mut NoopScene,
//!     Collaborators {
//!         platform: &mut platform,
//!         uniforms: &mut uniforms,
//!         geometry: &mut geometry,
//!         textures: &mut textures,
//!         renderer: &mut renderer,
//!     },
//! )?;
//! assert_eq!(summary.frames, 3);
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod headless;
pub mod input;
pub mod scene;
pub mod skinned;
pub mod static_model;

pub use collaborators::{
    AttributeKind, Collaborators, GeometryHandle, GeometryUpload, GeometryUploader, Platform,
    Renderer, TextureHandle, TextureLoader, UniformSink, VertexAttribute,
};
pub use config::EngineConfig;
pub use context::{FrameContext, InitContext};
pub use engine::{Engine, FpsCounter, RunSummary};
pub use error::{Result, RuntimeError};
pub use input::{DirectionKeys, InputDirection};
pub use scene::{NoopScene, Scene};
pub use skinned::{BONES_UNIFORM, GpuVertex, MODEL_UNIFORM, SkinnedModel};
pub use static_model::StaticModel;
