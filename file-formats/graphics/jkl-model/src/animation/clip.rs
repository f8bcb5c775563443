//! Animation clip: skeleton, bone tracks and the final skinning matrices

use glam::Mat4;
use log::{debug, trace, warn};

use super::bone_track::BoneTrack;
use super::hierarchy::SkeletonHierarchy;
use crate::error::{JklError, RecordLocation, Result};
use crate::types::NO_BONE;

/// Whether bones on leaf nodes receive a final transform
///
/// Leaf bones are excluded by default, so their slots keep whatever they last
/// held (identity unless a policy change wrote them).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LeafBonePolicy {
    #[default]
    Exclude,
    Include,
}

/// An animation with its skeleton and per-bone channels
#[derive(Debug, Clone)]
pub struct AnimationClip {
    duration: f32,
    ticks_per_second: i32,
    hierarchy: SkeletonHierarchy,
    bones: Vec<BoneTrack>,
    /// bone id -> index into `bones`
    bone_slots: Vec<usize>,
    final_transforms: Vec<Mat4>,
    leaf_policy: LeafBonePolicy,
}

impl AnimationClip {
    /// Build a clip, checking every bone reference up front
    ///
    /// Bone ids must be unique and lie in `0..bones.len()`. Every bone id a
    /// node references must be present in the bone table.
    pub fn new(
        duration: f32,
        ticks_per_second: i32,
        hierarchy: SkeletonHierarchy,
        bones: Vec<BoneTrack>,
    ) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(JklError::format(
                RecordLocation::ClipHeader,
                format!("invalid duration {duration}"),
            ));
        }
        if ticks_per_second < 0 {
            return Err(JklError::format(
                RecordLocation::ClipHeader,
                format!("negative ticks per second {ticks_per_second}"),
            ));
        }
        if ticks_per_second == 0 {
            warn!("Clip has zero ticks per second; playback will never advance");
        }

        let mut bone_slots: Vec<Option<usize>> = vec![None; bones.len()];
        for (slot, bone) in bones.iter().enumerate() {
            let location = RecordLocation::Bone { bone: slot };
            if bone.bone_id < 0 || bone.bone_id as usize >= bones.len() {
                return Err(JklError::format(
                    location,
                    format!(
                        "bone id {} outside 0..{}",
                        bone.bone_id,
                        bones.len()
                    ),
                ));
            }
            let entry = &mut bone_slots[bone.bone_id as usize];
            if let Some(first) = entry {
                return Err(JklError::format(
                    location,
                    format!("duplicate bone id {} (first at bone record #{first})", bone.bone_id),
                ));
            }
            *entry = Some(slot);
        }
        // Ids are unique and in range, so every slot is filled
        let bone_slots: Vec<usize> = bone_slots.into_iter().flatten().collect();

        for (index, node) in hierarchy.nodes().iter().enumerate() {
            if node.bone_id != NO_BONE
                && (node.bone_id < 0 || node.bone_id as usize >= bone_slots.len())
            {
                return Err(JklError::MissingBone {
                    location: RecordLocation::Node { node: index },
                    bone_id: node.bone_id,
                });
            }
        }

        debug!(
            "Animation clip: duration {} ticks at {} ticks/s, {} bones, {} nodes",
            duration,
            ticks_per_second,
            bones.len(),
            hierarchy.len()
        );

        let final_transforms = vec![Mat4::IDENTITY; bones.len()];
        Ok(Self {
            duration,
            ticks_per_second,
            hierarchy,
            bones,
            bone_slots,
            final_transforms,
            leaf_policy: LeafBonePolicy::default(),
        })
    }

    /// Builder-style leaf policy override
    pub fn with_leaf_policy(mut self, policy: LeafBonePolicy) -> Self {
        self.leaf_policy = policy;
        self
    }

    /// Clip length in ticks
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn ticks_per_second(&self) -> i32 {
        self.ticks_per_second
    }

    /// Clip length in seconds, `None` when the clip never advances
    pub fn duration_seconds(&self) -> Option<f32> {
        (self.ticks_per_second > 0).then(|| self.duration / self.ticks_per_second as f32)
    }

    pub fn hierarchy(&self) -> &SkeletonHierarchy {
        &self.hierarchy
    }

    /// Bone tracks in file order
    pub fn bones(&self) -> &[BoneTrack] {
        &self.bones
    }

    /// Look up a bone track by bone id
    pub fn bone(&self, bone_id: i32) -> Option<&BoneTrack> {
        let slot = *self.bone_slots.get(usize::try_from(bone_id).ok()?)?;
        self.bones.get(slot)
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn leaf_policy(&self) -> LeafBonePolicy {
        self.leaf_policy
    }

    pub fn set_leaf_policy(&mut self, policy: LeafBonePolicy) {
        self.leaf_policy = policy;
    }

    /// Final skinning matrices indexed by bone id
    pub fn final_transforms(&self) -> &[Mat4] {
        &self.final_transforms
    }

    /// Walk the hierarchy at `time` and rewrite the final transforms
    ///
    /// Returns the number of nodes visited.
    pub fn evaluate_pose(&mut self, time: f32) -> usize {
        let nodes = self.hierarchy.nodes();
        if nodes.is_empty() {
            return 0;
        }

        let mut visited = 0;
        let mut stack = vec![(0usize, Mat4::IDENTITY)];

        while let Some((index, parent)) = stack.pop() {
            let Some(node) = nodes.get(index) else {
                continue;
            };
            visited += 1;

            let slot = usize::try_from(node.bone_id)
                .ok()
                .and_then(|id| self.bone_slots.get(id).copied());

            let local = match slot.and_then(|s| self.bones.get_mut(s)) {
                Some(bone) => {
                    bone.update(time);
                    bone.local_transform()
                }
                None => node.rest_transform,
            };
            let global = parent * local;

            if let Some(bone) = slot.and_then(|s| self.bones.get(s)) {
                let write = !node.is_leaf() || self.leaf_policy == LeafBonePolicy::Include;
                if write {
                    if let Some(target) = self.final_transforms.get_mut(bone.bone_id as usize) {
                        *target = global * bone.offset;
                    }
                }
            }

            stack.extend(node.children.iter().rev().map(|&child| (child, global)));
        }

        trace!("Evaluated pose at {time} ticks over {visited} nodes");
        visited
    }

    /// Reset every final transform to identity
    pub fn reset_pose(&mut self) {
        self.final_transforms.fill(Mat4::IDENTITY);
    }

    pub fn into_parts(self) -> (f32, i32, SkeletonHierarchy, Vec<BoneTrack>) {
        (
            self.duration,
            self.ticks_per_second,
            self.hierarchy,
            self.bones,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::hierarchy::HierarchyNode;
    use crate::types::Keyframe;
    use glam::Vec3;

    fn translating_bone(id: i32, to: Vec3) -> BoneTrack {
        BoneTrack::new(
            id,
            vec![Keyframe::new(Vec3::ZERO, 0.0), Keyframe::new(to, 1.0)],
            vec![],
            vec![],
            Mat4::IDENTITY,
        )
    }

    #[test]
    fn test_parent_chain_composes() {
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(0, Mat4::IDENTITY, vec![1]),
            HierarchyNode::new(1, Mat4::IDENTITY, vec![2]),
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bones = vec![
            translating_bone(0, Vec3::new(2.0, 0.0, 0.0)),
            translating_bone(1, Vec3::new(0.0, 4.0, 0.0)),
        ];
        let mut clip = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap();

        assert_eq!(clip.evaluate_pose(0.5), 3);

        let root = clip.final_transforms()[0].transform_point3(Vec3::ZERO);
        assert!((root - Vec3::new(1.0, 0.0, 0.0)).length() < 0.001);

        let child = clip.final_transforms()[1].transform_point3(Vec3::ZERO);
        assert!((child - Vec3::new(1.0, 2.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_pure_transform_node_uses_rest_transform() {
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(
                NO_BONE,
                Mat4::from_translation(Vec3::new(0.0, 0.0, 7.0)),
                vec![1],
            ),
            HierarchyNode::new(0, Mat4::IDENTITY, vec![2]),
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bones = vec![BoneTrack::new(0, vec![], vec![], vec![], Mat4::IDENTITY)];
        let mut clip = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap();
        clip.evaluate_pose(0.0);

        let origin = clip.final_transforms()[0].transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, 7.0)).length() < 0.001);
    }

    #[test]
    fn test_leaf_policy_include_writes_leaf_bone() {
        let hierarchy = SkeletonHierarchy::new(vec![HierarchyNode::new(
            0,
            Mat4::IDENTITY,
            vec![],
        )])
        .unwrap();
        let bones = vec![translating_bone(0, Vec3::X)];

        let mut clip = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap();
        clip.evaluate_pose(1.0);
        assert_eq!(clip.final_transforms()[0], Mat4::IDENTITY);

        clip.set_leaf_policy(LeafBonePolicy::Include);
        clip.evaluate_pose(1.0);
        let origin = clip.final_transforms()[0].transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::X).length() < 0.001);
    }

    #[test]
    fn test_offset_applied_after_global() {
        let offset = Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0));
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(0, Mat4::IDENTITY, vec![1]),
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bones = vec![BoneTrack::new(
            0,
            vec![Keyframe::new(Vec3::new(3.0, 0.0, 0.0), 0.0)],
            vec![],
            vec![],
            offset,
        )];
        let mut clip = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap();
        clip.evaluate_pose(0.0);

        let origin = clip.final_transforms()[0].transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(2.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_bone_id_out_of_range() {
        let hierarchy = SkeletonHierarchy::new(vec![]).unwrap();
        let bones = vec![BoneTrack::new(4, vec![], vec![], vec![], Mat4::IDENTITY)];
        let err = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap_err();
        assert!(matches!(
            err,
            JklError::Format {
                location: RecordLocation::Bone { bone: 0 },
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_bone_id() {
        let hierarchy = SkeletonHierarchy::new(vec![]).unwrap();
        let bones = vec![
            BoneTrack::new(1, vec![], vec![], vec![], Mat4::IDENTITY),
            BoneTrack::new(1, vec![], vec![], vec![], Mat4::IDENTITY),
        ];
        let err = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap_err();
        assert!(err.to_string().contains("duplicate bone id 1"));
    }

    #[test]
    fn test_node_references_missing_bone() {
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![1]),
            HierarchyNode::new(3, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bones = vec![BoneTrack::new(0, vec![], vec![], vec![], Mat4::IDENTITY)];
        let err = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap_err();
        assert!(matches!(
            err,
            JklError::MissingBone {
                location: RecordLocation::Node { node: 1 },
                bone_id: 3
            }
        ));
    }

    #[test]
    fn test_invalid_header_values() {
        let err = AnimationClip::new(f32::NAN, 1, SkeletonHierarchy::default(), vec![]).unwrap_err();
        assert!(err.to_string().contains("invalid duration"));

        let err = AnimationClip::new(1.0, -5, SkeletonHierarchy::default(), vec![]).unwrap_err();
        assert!(err.to_string().contains("negative ticks per second"));
    }

    #[test]
    fn test_bone_lookup_by_id() {
        let hierarchy = SkeletonHierarchy::new(vec![]).unwrap();
        let bones = vec![
            BoneTrack::new(1, vec![], vec![], vec![], Mat4::IDENTITY),
            BoneTrack::new(0, vec![], vec![], vec![], Mat4::IDENTITY),
        ];
        let clip = AnimationClip::new(1.0, 1, hierarchy, bones).unwrap();
        assert_eq!(clip.bone(1).map(|b| b.bone_id), Some(1));
        assert_eq!(clip.bone(0).map(|b| b.bone_id), Some(0));
        assert!(clip.bone(2).is_none());
        assert!(clip.bone(-1).is_none());
    }
}
