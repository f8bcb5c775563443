//! Lint checks for JKL models
//!
//! Structural corruption is rejected while parsing. The checks here flag
//! data that loads and plays but probably is not what the author intended.

use std::fmt;

use crate::animation::LeafBonePolicy;
use crate::error::{JklError, Result};
use crate::model::JklModel;
use crate::types::Channel;

/// Allowed deviation of a vertex weight sum from 1
const WEIGHT_TOLERANCE: f32 = 1e-3;

/// A non-fatal finding about a loaded model
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// A channel has a key earlier than the one before it
    NonMonotonicKeys {
        bone_id: i32,
        channel: Channel,
        key: usize,
    },
    /// A skinned vertex whose weights do not sum to 1
    UnnormalizedWeights {
        mesh: usize,
        vertex: usize,
        sum: f32,
    },
    /// A bone on a leaf node never receives a final transform
    ExcludedLeafBone { node: usize, bone_id: i32 },
    /// A bone that no hierarchy node references
    UnusedBone { bone_id: i32 },
    /// A node the walk from the root never reaches
    UnreachableNode { node: usize },
    /// Bytes after the node table
    TrailingBytes { count: u64 },
    /// The clip never advances
    ZeroTicksPerSecond,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonMonotonicKeys {
                bone_id,
                channel,
                key,
            } => write!(
                f,
                "bone {bone_id}: {channel} key #{key} is earlier than the key before it"
            ),
            Self::UnnormalizedWeights { mesh, vertex, sum } => write!(
                f,
                "mesh #{mesh} vertex #{vertex}: bone weights sum to {sum:.4}"
            ),
            Self::ExcludedLeafBone { node, bone_id } => write!(
                f,
                "node #{node}: leaf bone {bone_id} is excluded from the final transforms"
            ),
            Self::UnusedBone { bone_id } => {
                write!(f, "bone {bone_id} is not referenced by any node")
            }
            Self::UnreachableNode { node } => {
                write!(f, "node #{node} is not reachable from the root")
            }
            Self::TrailingBytes { count } => {
                write!(f, "{count} trailing bytes after the node table")
            }
            Self::ZeroTicksPerSecond => write!(f, "ticks per second is 0; the clip never advances"),
        }
    }
}

/// Run every lint check over a model
pub fn lint_model(model: &JklModel) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    lint_keyframes(model, &mut warnings);
    lint_weights(model, &mut warnings);
    lint_hierarchy(model, &mut warnings);

    if model.trailing_bytes() > 0 {
        warnings.push(ValidationWarning::TrailingBytes {
            count: model.trailing_bytes(),
        });
    }
    if model.clip().ticks_per_second() == 0 {
        warnings.push(ValidationWarning::ZeroTicksPerSecond);
    }

    warnings
}

/// Fail with [`JklError::Validation`] if any lint check reports a warning
pub fn validate_strict(model: &JklModel) -> Result<()> {
    let warnings = lint_model(model);
    if warnings.is_empty() {
        return Ok(());
    }

    let details: Vec<String> = warnings.iter().map(ToString::to_string).collect();
    Err(JklError::Validation(format!(
        "{} warning(s): {}",
        warnings.len(),
        details.join("; ")
    )))
}

fn lint_keyframes(model: &JklModel, warnings: &mut Vec<ValidationWarning>) {
    for bone in model.clip().bones() {
        for channel in [Channel::Position, Channel::Rotation, Channel::Scale] {
            let times = bone.key_times(channel);
            if let Some(key) = times.windows(2).position(|pair| pair[1] < pair[0]) {
                warnings.push(ValidationWarning::NonMonotonicKeys {
                    bone_id: bone.bone_id,
                    channel,
                    key: key + 1,
                });
            }
        }
    }
}

fn lint_weights(model: &JklModel, warnings: &mut Vec<ValidationWarning>) {
    for (mesh_index, mesh) in model.meshes().iter().enumerate() {
        for (vertex_index, vertex) in mesh.vertices.iter().enumerate() {
            if vertex.influences().next().is_none() {
                continue;
            }
            let sum = vertex.weight_sum();
            if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                warnings.push(ValidationWarning::UnnormalizedWeights {
                    mesh: mesh_index,
                    vertex: vertex_index,
                    sum,
                });
            }
        }
    }
}

fn lint_hierarchy(model: &JklModel, warnings: &mut Vec<ValidationWarning>) {
    let clip = model.clip();
    let hierarchy = clip.hierarchy();

    let mut referenced = vec![false; clip.bone_count()];
    for (index, node) in hierarchy.nodes().iter().enumerate() {
        let Some(bone_id) = node.bone() else {
            continue;
        };
        if let Some(seen) = referenced.get_mut(bone_id as usize) {
            *seen = true;
        }
        if node.is_leaf() && clip.leaf_policy() == LeafBonePolicy::Exclude {
            warnings.push(ValidationWarning::ExcludedLeafBone {
                node: index,
                bone_id,
            });
        }
    }

    for bone in clip.bones() {
        if !referenced
            .get(bone.bone_id as usize)
            .copied()
            .unwrap_or(false)
        {
            warnings.push(ValidationWarning::UnusedBone {
                bone_id: bone.bone_id,
            });
        }
    }

    for node in hierarchy.unreachable_nodes() {
        warnings.push(ValidationWarning::UnreachableNode { node });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationClip, BoneTrack, HierarchyNode, SkeletonHierarchy};
    use crate::types::{Keyframe, Mesh, NO_BONE, Vertex};
    use glam::{Mat4, Vec3};

    fn clean_model() -> JklModel {
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(0, Mat4::IDENTITY, vec![1]),
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bone = BoneTrack::new(
            0,
            vec![Keyframe::new(Vec3::ZERO, 0.0), Keyframe::new(Vec3::X, 1.0)],
            vec![],
            vec![],
            Mat4::IDENTITY,
        );
        let clip = AnimationClip::new(1.0, 24, hierarchy, vec![bone]).unwrap();
        let vertex = Vertex {
            bone_ids: [0, NO_BONE, NO_BONE, NO_BONE],
            weights: [1.0, 0.0, 0.0, 0.0],
            ..Default::default()
        };
        JklModel::new(vec![Mesh::new(vec![vertex; 3], vec![0, 1, 2])], clip).unwrap()
    }

    #[test]
    fn test_clean_model_has_no_warnings() {
        let model = clean_model();
        assert!(lint_model(&model).is_empty());
        assert!(validate_strict(&model).is_ok());
    }

    #[test]
    fn test_non_monotonic_keys() {
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(0, Mat4::IDENTITY, vec![1]),
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bone = BoneTrack::new(
            0,
            vec![],
            vec![],
            vec![
                Keyframe::new(Vec3::ONE, 2.0),
                Keyframe::new(Vec3::ONE, 1.0),
            ],
            Mat4::IDENTITY,
        );
        let clip = AnimationClip::new(2.0, 24, hierarchy, vec![bone]).unwrap();
        let model = JklModel::new(vec![], clip).unwrap();

        let warnings = lint_model(&model);
        assert_eq!(
            warnings,
            vec![ValidationWarning::NonMonotonicKeys {
                bone_id: 0,
                channel: Channel::Scale,
                key: 1,
            }]
        );
    }

    #[test]
    fn test_leaf_and_unused_bones() {
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![1]),
            HierarchyNode::new(1, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bones = vec![
            BoneTrack::new(0, vec![], vec![], vec![], Mat4::IDENTITY),
            BoneTrack::new(1, vec![], vec![], vec![], Mat4::IDENTITY),
        ];
        let clip = AnimationClip::new(1.0, 24, hierarchy, bones).unwrap();
        let model = JklModel::new(vec![], clip).unwrap();

        let warnings = lint_model(&model);
        assert!(warnings.contains(&ValidationWarning::ExcludedLeafBone {
            node: 1,
            bone_id: 1
        }));
        assert!(warnings.contains(&ValidationWarning::UnusedBone { bone_id: 0 }));

        let err = validate_strict(&model).unwrap_err();
        assert!(err.to_string().contains("2 warning(s)"));
    }

    #[test]
    fn test_unnormalized_weights() {
        let model = clean_model();
        let (mut meshes, clip) = model.into_parts();
        meshes[0].vertices[1].weights = [0.5, 0.0, 0.0, 0.0];
        let model = JklModel::new(meshes, clip).unwrap();

        let warnings = lint_model(&model);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ValidationWarning::UnnormalizedWeights {
                mesh: 0,
                vertex: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_ticks_per_second() {
        let clip = AnimationClip::new(1.0, 0, SkeletonHierarchy::default(), vec![]).unwrap();
        let model = JklModel::new(vec![], clip).unwrap();
        assert_eq!(lint_model(&model), vec![ValidationWarning::ZeroTicksPerSecond]);
    }
}
