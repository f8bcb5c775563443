//! Playback state for a single looping clip

use glam::Mat4;
use log::trace;

use super::clip::AnimationClip;

/// Playback state of an [`AnimationPlayer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Advances clip time and evaluates the pose once per frame
///
/// The player owns its clip. Playback always loops.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: AnimationClip,
    current_time: f32,
    state: PlaybackState,
}

impl AnimationPlayer {
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            current_time: 0.0,
            state: PlaybackState::Stopped,
        }
    }

    /// Start (or restart) playback from time 0
    pub fn play(&mut self) {
        self.current_time = 0.0;
        self.state = PlaybackState::Playing;
    }

    /// Stop playback, keeping the current time and pose
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    /// Advance by `dt` seconds and evaluate the pose
    ///
    /// Does nothing while stopped or when `dt` is not finite. Returns the
    /// number of hierarchy nodes visited.
    pub fn update(&mut self, dt: f32) -> usize {
        if self.state == PlaybackState::Stopped || !dt.is_finite() {
            return 0;
        }

        let duration = self.clip.duration();
        let advanced = self.current_time + self.clip.ticks_per_second() as f32 * dt;
        self.current_time = if duration > 0.0 {
            let wrapped = advanced.rem_euclid(duration);
            // rem_euclid can round up to `duration` for tiny negative inputs
            if wrapped >= duration || !wrapped.is_finite() {
                0.0
            } else {
                wrapped
            }
        } else {
            0.0
        };

        trace!("Animation time {} / {}", self.current_time, duration);
        self.clip.evaluate_pose(self.current_time)
    }

    /// Skinning matrices from the last update, indexed by bone id
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        self.clip.final_transforms()
    }

    /// Current time in ticks, always in `[0, duration)`
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn clip_mut(&mut self) -> &mut AnimationClip {
        &mut self.clip
    }

    /// Bind a different clip, returning the previous one
    ///
    /// Time restarts at 0. The playback state is kept.
    pub fn set_clip(&mut self, clip: AnimationClip) -> AnimationClip {
        self.current_time = 0.0;
        std::mem::replace(&mut self.clip, clip)
    }

    pub fn into_clip(self) -> AnimationClip {
        self.clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneTrack, HierarchyNode, SkeletonHierarchy};
    use crate::types::{Keyframe, NO_BONE};
    use glam::Vec3;

    fn clip(duration: f32, ticks_per_second: i32) -> AnimationClip {
        let hierarchy = SkeletonHierarchy::new(vec![
            HierarchyNode::new(0, Mat4::IDENTITY, vec![1]),
            HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![]),
        ])
        .unwrap();
        let bone = BoneTrack::new(
            0,
            vec![
                Keyframe::new(Vec3::ZERO, 0.0),
                Keyframe::new(Vec3::new(duration, 0.0, 0.0), duration),
            ],
            vec![],
            vec![],
            Mat4::IDENTITY,
        );
        AnimationClip::new(duration, ticks_per_second, hierarchy, vec![bone]).unwrap()
    }

    #[test]
    fn test_initial_state_is_stopped() {
        let player = AnimationPlayer::new(clip(10.0, 1));
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_update_while_stopped_is_noop() {
        let mut player = AnimationPlayer::new(clip(10.0, 1));
        assert_eq!(player.update(1.0), 0);
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(player.final_bone_matrices()[0], Mat4::IDENTITY);
    }

    #[test]
    fn test_update_advances_and_evaluates() {
        let mut player = AnimationPlayer::new(clip(10.0, 2));
        player.play();
        assert_eq!(player.update(1.5), 2);
        assert!((player.current_time() - 3.0).abs() < 0.001);

        let origin = player.final_bone_matrices()[0].transform_point3(Vec3::ZERO);
        assert!((origin.x - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_looping_wraps_time() {
        let mut player = AnimationPlayer::new(clip(10.0, 1));
        player.play();

        for _ in 0..7 {
            player.update(1.5);
            let time = player.current_time();
            assert!((0.0..10.0).contains(&time), "time {time} escaped the clip");
        }
        // 7 * 1.5 = 10.5 wraps to 0.5
        assert!((player.current_time() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_negative_dt_wraps_into_range() {
        let mut player = AnimationPlayer::new(clip(10.0, 1));
        player.play();
        player.update(-2.0);
        assert!((player.current_time() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_duration_stays_at_zero() {
        let mut player = AnimationPlayer::new(clip(0.0, 30));
        player.play();
        player.update(1.0);
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_non_finite_dt_skipped() {
        let mut player = AnimationPlayer::new(clip(10.0, 1));
        player.play();
        player.update(2.0);
        assert_eq!(player.update(f32::NAN), 0);
        assert!((player.current_time() - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_play_restarts() {
        let mut player = AnimationPlayer::new(clip(10.0, 1));
        player.play();
        player.update(4.0);
        player.play();
        assert_eq!(player.current_time(), 0.0);
        assert!(player.is_playing());
    }

    #[test]
    fn test_set_clip_returns_previous() {
        let mut player = AnimationPlayer::new(clip(10.0, 1));
        player.play();
        player.update(3.0);

        let previous = player.set_clip(clip(4.0, 1));
        assert_eq!(previous.duration(), 10.0);
        assert_eq!(player.clip().duration(), 4.0);
        assert_eq!(player.current_time(), 0.0);
        assert!(player.is_playing());
    }
}
