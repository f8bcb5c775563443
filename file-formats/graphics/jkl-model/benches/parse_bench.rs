use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Mat4, Quat, Vec3};
use jkl_model::{
    AnimationClip, AnimationPlayer, BoneTrack, HierarchyNode, JklModel, Keyframe, Mesh,
    SkeletonHierarchy, Vertex,
};
use std::hint::black_box;

const BONES: usize = 64;
const KEYS: usize = 48;

/// A single chain of bones, each with a full set of keys
fn create_test_model() -> JklModel {
    let nodes = (0..BONES)
        .map(|i| {
            let children = if i + 1 < BONES { vec![i + 1] } else { vec![] };
            HierarchyNode::new(i as i32, Mat4::IDENTITY, children)
        })
        .collect();
    let hierarchy = SkeletonHierarchy::new(nodes).unwrap();

    let bones = (0..BONES)
        .map(|i| {
            let times = (0..KEYS).map(|k| k as f32 * 10.0);
            BoneTrack::new(
                i as i32,
                times
                    .clone()
                    .map(|t| Keyframe::new(Vec3::new(t * 0.01, 0.1, 0.0), t))
                    .collect(),
                times
                    .clone()
                    .map(|t| Keyframe::new(Quat::from_rotation_y(t * 0.001), t))
                    .collect(),
                times.map(|t| Keyframe::new(Vec3::ONE, t)).collect(),
                Mat4::IDENTITY,
            )
        })
        .collect();

    let vertices = (0..4096)
        .map(|i| Vertex {
            position: Vec3::new(i as f32, 0.0, 0.0),
            bone_ids: [(i % BONES) as i32, -1, -1, -1],
            weights: [1.0, 0.0, 0.0, 0.0],
            ..Default::default()
        })
        .collect();
    let indices = (0..4096 * 3).map(|i| (i % 4096) as u32).collect();

    let clip = AnimationClip::new(KEYS as f32 * 10.0, 30, hierarchy, bones).unwrap();
    JklModel::new(vec![Mesh::new(vertices, indices)], clip).unwrap()
}

fn bench_model_parse(c: &mut Criterion) {
    let data = create_test_model().to_bytes().unwrap();

    c.bench_function("parse_model", |b| {
        b.iter(|| JklModel::from_bytes(black_box(&data)).unwrap())
    });
}

fn bench_pose_evaluation(c: &mut Criterion) {
    let (_, clip) = create_test_model().into_parts();
    let mut player = AnimationPlayer::new(clip);
    player.play();

    c.bench_function("update_pose", |b| {
        b.iter(|| {
            player.update(black_box(1.0 / 60.0));
            black_box(player.final_bone_matrices());
        })
    });
}

criterion_group!(benches, bench_model_parse, bench_pose_evaluation);
criterion_main!(benches);
