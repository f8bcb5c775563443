//! Reader, writer and skeletal animation runtime for JKL skinned models.
//!
//! A `.jkl` file is a flat little-endian record stream: meshes with skinned
//! vertices, then one animation clip made of bone keyframe channels and a
//! node hierarchy. [`JklModel`] decodes and encodes it; the [`animation`]
//! module turns the clip into per-frame skinning matrices.
//!
//! # Example
//!
//! ```rust,no_run
//! use jkl_model::JklModel;
//!
//! # fn main() -> jkl_model::Result<()> {
//! let model = JklModel::load("character.jkl")?;
//! println!(
//!     "{} meshes, {} bones, {} ticks",
//!     model.meshes().len(),
//!     model.clip().bone_count(),
//!     model.clip().duration()
//! );
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod error;
pub mod io_ext;
pub mod model;
pub mod reader;
pub mod static_mesh;
pub mod types;
pub mod validation;

pub use animation::{
    AnimationClip, AnimationPlayer, BoneTrack, HierarchyNode, LeafBonePolicy, PlaybackState,
    SkeletonHierarchy,
};
pub use error::{JklError, RecordLocation, Result};
pub use model::JklModel;
pub use static_mesh::{StaticMesh, StaticVertex};
pub use types::{KeyPosition, KeyRotation, KeyScale, Keyframe, MAX_BONE_INFLUENCE, Mesh, NO_BONE, Vertex};
pub use validation::{ValidationWarning, lint_model, validate_strict};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
