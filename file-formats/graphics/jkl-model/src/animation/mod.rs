//! JKL skeletal animation
//!
//! This module turns the bone and hierarchy records of a JKL file into
//! per-frame skinning matrices:
//! - Keyframe lookup with clamping at both ends of a channel
//! - Linear position/scale and spherical rotation interpolation
//! - An arena-based skeleton walked depth-first without recursion
//! - A looping player that owns its clip
//!
//! # Example
//!
//! ```rust,no_run
//! use jkl_model::JklModel;
//! use jkl_model::animation::AnimationPlayer;
//!
//! # fn main() -> jkl_model::Result<()> {
//! let model = JklModel::load("character.jkl")?;
//! let (_meshes, clip) = model.into_parts();
//!
//! let mut player = AnimationPlayer::new(clip);
//! player.play();
//! player.update(1.0 / 60.0);
//!
//! let bones = player.final_bone_matrices();
//! # let _ = bones;
//! # Ok(())
//! # }
//! ```

mod bone_track;
mod clip;
mod hierarchy;
mod interpolation;
mod player;

pub use bone_track::BoneTrack;
pub use clip::{AnimationClip, LeafBonePolicy};
pub use hierarchy::{HierarchyNode, Preorder, SkeletonHierarchy};
pub use interpolation::{
    Interpolate, find_keyframe_index, interpolation_factor, normalize_or_identity, sample_channel,
};
pub use player::{AnimationPlayer, PlaybackState};
