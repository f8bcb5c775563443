//! Shared fixtures for jkl-model integration tests
#![allow(dead_code)]

use glam::{Mat4, Quat, Vec2, Vec3};
use jkl_model::{
    AnimationClip, BoneTrack, HierarchyNode, JklModel, Keyframe, Mesh, NO_BONE,
    SkeletonHierarchy, Vertex,
};

/// Hand-assembles raw little-endian streams
#[derive(Default)]
pub struct Stream {
    pub bytes: Vec<u8>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(mut self, value: f32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn pad(mut self, len: usize) -> Self {
        self.bytes.resize(self.bytes.len() + len, 0);
        self
    }

    pub fn mat4(mut self, value: Mat4) -> Self {
        for v in value.to_cols_array() {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    /// A node record
    pub fn node(self, bone_id: i32, children: &[i32]) -> Self {
        let mut stream = self.i32(bone_id).mat4(Mat4::IDENTITY).i32(children.len() as i32);
        for &child in children {
            stream = stream.i32(child);
        }
        stream
    }

    /// A bone record with no keys and identity matrices
    pub fn bare_bone(self, bone_id: i32) -> Self {
        self.i32(bone_id)
            .mat4(Mat4::IDENTITY)
            .i32(0)
            .i32(0)
            .i32(0)
            .mat4(Mat4::IDENTITY)
    }

    /// An empty mesh table followed by a clip header
    pub fn clip_header(duration: f32, tps: i32, bones: i32, nodes: i32) -> Self {
        Self::new().i32(0).f32(duration).i32(tps).i32(bones).i32(nodes)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Root pure node with one child bound to bone 0 moving from the origin to
/// (1, 0, 0) over one tick
pub fn two_node_clip() -> AnimationClip {
    let hierarchy = SkeletonHierarchy::new(vec![
        HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![1]),
        HierarchyNode::new(0, Mat4::IDENTITY, vec![]),
    ])
    .unwrap();
    let bone = BoneTrack::new(
        0,
        vec![
            Keyframe::new(Vec3::ZERO, 0.0),
            Keyframe::new(Vec3::new(1.0, 0.0, 0.0), 1.0),
        ],
        vec![Keyframe::new(Quat::IDENTITY, 0.0)],
        vec![Keyframe::new(Vec3::ONE, 0.0)],
        Mat4::IDENTITY,
    );
    AnimationClip::new(1.0, 1, hierarchy, vec![bone]).unwrap()
}

fn vertex(position: Vec3, bones: [i32; 4], weights: [f32; 4]) -> Vertex {
    Vertex {
        position,
        normal: Vec3::Z,
        uv: Vec2::new(position.x, position.y),
        tangent: Vec3::X,
        bitangent: Vec3::Y,
        bone_ids: bones,
        weights,
    }
}

/// A quad skinned to a three-bone arm under a pure transform root
pub fn arm_model() -> JklModel {
    let vertices = vec![
        vertex(Vec3::new(0.0, 0.0, 0.0), [0, -1, -1, -1], [1.0, 0.0, 0.0, 0.0]),
        vertex(Vec3::new(1.0, 0.0, 0.0), [0, 1, -1, -1], [0.5, 0.5, 0.0, 0.0]),
        vertex(Vec3::new(1.0, 1.0, 0.0), [1, 2, -1, -1], [0.25, 0.75, 0.0, 0.0]),
        vertex(Vec3::new(0.0, 1.0, 0.0), [2, -1, -1, -1], [1.0, 0.0, 0.0, 0.0]),
    ];
    let mesh = Mesh::new(vertices, vec![0, 1, 2, 0, 2, 3]);

    let hierarchy = SkeletonHierarchy::new(vec![
        HierarchyNode::new(NO_BONE, Mat4::from_translation(Vec3::Y), vec![1]),
        HierarchyNode::new(0, Mat4::IDENTITY, vec![2]),
        HierarchyNode::new(1, Mat4::IDENTITY, vec![3]),
        HierarchyNode::new(2, Mat4::IDENTITY, vec![]),
    ])
    .unwrap();

    let bones = vec![
        BoneTrack::new(
            0,
            vec![Keyframe::new(Vec3::ZERO, 0.0)],
            vec![
                Keyframe::new(Quat::IDENTITY, 0.0),
                Keyframe::new(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), 30.0),
            ],
            vec![Keyframe::new(Vec3::ONE, 0.0)],
            Mat4::IDENTITY,
        )
        .with_rest_local(Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0))),
        BoneTrack::new(
            1,
            vec![
                Keyframe::new(Vec3::new(1.0, 0.0, 0.0), 0.0),
                Keyframe::new(Vec3::new(2.0, 0.0, 0.0), 15.0),
                Keyframe::new(Vec3::new(1.0, 0.0, 0.0), 30.0),
            ],
            vec![Keyframe::new(Quat::IDENTITY, 0.0)],
            vec![],
            Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0)),
        ),
        BoneTrack::new(
            2,
            vec![Keyframe::new(Vec3::new(1.0, 0.0, 0.0), 0.0)],
            vec![],
            vec![
                Keyframe::new(Vec3::ONE, 0.0),
                Keyframe::new(Vec3::splat(2.0), 30.0),
            ],
            Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0)),
        ),
    ];

    let clip = AnimationClip::new(30.0, 30, hierarchy, bones).unwrap();
    JklModel::new(vec![mesh], clip).unwrap()
}
