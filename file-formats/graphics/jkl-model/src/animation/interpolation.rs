//! Keyframe lookup and interpolation for bone channels

use glam::{Quat, Vec3};

use crate::types::Keyframe;

/// Values that can be blended between two keyframes
pub trait Interpolate: Copy {
    /// Blend from `self` toward `other` by `t` in `[0, 1]`
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        let from = normalize_or_identity(*self);
        let to = normalize_or_identity(*other);
        normalize_or_identity(from.slerp(to, t))
    }
}

/// Normalize a quaternion, falling back to identity for zero or non-finite length
pub fn normalize_or_identity(q: Quat) -> Quat {
    let length = q.length();
    if length > f32::EPSILON && length.is_finite() {
        q * (1.0 / length)
    } else {
        Quat::IDENTITY
    }
}

/// Find the earlier keyframe of the pair bracketing `time`
///
/// Scans forward from the first pair and returns the first `i` with
/// `time < keys[i + 1].time`. Returns `None` when there are fewer than two
/// keys, when `time` precedes the first key, or when `time` is at or past the
/// last key.
pub fn find_keyframe_index<T>(keys: &[Keyframe<T>], time: f32) -> Option<usize> {
    let first = keys.first()?;
    if keys.len() < 2 || time.is_nan() || time < first.time {
        return None;
    }

    keys.windows(2).position(|pair| time < pair[1].time)
}

/// Fraction of the way `time` lies between two keyframe timestamps
///
/// Zero-length spans yield 0.
pub fn interpolation_factor(start: f32, end: f32, time: f32) -> f32 {
    let span = end - start;
    if span > 0.0 {
        ((time - start) / span).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Sample a channel at `time`, clamping outside the keyed range
///
/// An empty channel yields `identity`.
pub fn sample_channel<T: Interpolate>(keys: &[Keyframe<T>], time: f32, identity: T) -> T {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return identity;
    };

    if keys.len() == 1 || time < first.time {
        return first.value;
    }

    match find_keyframe_index(keys, time) {
        Some(index) => {
            let from = &keys[index];
            let to = &keys[index + 1];
            let t = interpolation_factor(from.time, to.time, time);
            from.value.interpolate(&to.value, t)
        }
        None => last.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn position_keys() -> Vec<Keyframe<Vec3>> {
        vec![
            Keyframe::new(Vec3::ZERO, 0.0),
            Keyframe::new(Vec3::new(10.0, 0.0, 0.0), 10.0),
            Keyframe::new(Vec3::new(10.0, 20.0, 0.0), 20.0),
        ]
    }

    #[test]
    fn test_find_keyframe_index_too_few_keys() {
        let empty: Vec<Keyframe<Vec3>> = vec![];
        assert_eq!(find_keyframe_index(&empty, 0.0), None);

        let single = vec![Keyframe::new(Vec3::ONE, 5.0)];
        assert_eq!(find_keyframe_index(&single, 5.0), None);
    }

    #[test_case(0.0 => Some(0); "at first key")]
    #[test_case(9.999 => Some(0); "just before second key")]
    #[test_case(10.0 => Some(1); "at second key")]
    #[test_case(15.0 => Some(1); "between second and third")]
    #[test_case(20.0 => None; "at last key")]
    #[test_case(25.0 => None; "past last key")]
    #[test_case(-1.0 => None; "before first key")]
    fn test_find_keyframe_index(time: f32) -> Option<usize> {
        find_keyframe_index(&position_keys(), time)
    }

    #[test]
    fn test_find_keyframe_index_nan() {
        assert_eq!(find_keyframe_index(&position_keys(), f32::NAN), None);
    }

    #[test]
    fn test_interpolation_factor() {
        assert_eq!(interpolation_factor(0.0, 10.0, 0.0), 0.0);
        assert!((interpolation_factor(0.0, 10.0, 2.5) - 0.25).abs() < 0.001);
        assert_eq!(interpolation_factor(5.0, 5.0, 5.0), 0.0);
    }

    #[test]
    fn test_sample_channel_exact_and_between() {
        let keys = position_keys();

        assert_eq!(sample_channel(&keys, 10.0, Vec3::ZERO), Vec3::new(10.0, 0.0, 0.0));

        let mid = sample_channel(&keys, 5.0, Vec3::ZERO);
        assert!((mid.x - 5.0).abs() < 0.001);

        let mid = sample_channel(&keys, 15.0, Vec3::ZERO);
        assert!((mid.x - 10.0).abs() < 0.001);
        assert!((mid.y - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_channel_clamps() {
        let keys = position_keys();

        assert_eq!(sample_channel(&keys, -5.0, Vec3::ONE), Vec3::ZERO);
        assert_eq!(sample_channel(&keys, 20.0, Vec3::ONE), Vec3::new(10.0, 20.0, 0.0));
        assert_eq!(sample_channel(&keys, 1000.0, Vec3::ONE), Vec3::new(10.0, 20.0, 0.0));
    }

    #[test]
    fn test_sample_channel_empty_uses_identity() {
        let keys: Vec<Keyframe<Vec3>> = vec![];
        assert_eq!(sample_channel(&keys, 3.0, Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn test_sample_channel_duplicate_timestamps() {
        let keys = vec![
            Keyframe::new(Vec3::ZERO, 0.0),
            Keyframe::new(Vec3::X, 5.0),
            Keyframe::new(Vec3::Y, 5.0),
            Keyframe::new(Vec3::Z, 10.0),
        ];

        // The zero-length pair is skipped by the scan
        let value = sample_channel(&keys, 5.0, Vec3::ZERO);
        assert!((value - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_slerp_same_rotation_is_normalized() {
        let q = Quat::from_xyzw(0.0, 0.0, 2.0, 2.0);
        let expected = normalize_or_identity(q);

        for t in [0.0, 0.3, 0.5, 1.0] {
            let result = q.interpolate(&q, t);
            assert!(result.abs_diff_eq(expected, 0.0001));
            assert!((result.length() - 1.0).abs() < 0.0001);
        }
    }

    #[test]
    fn test_slerp_halfway() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let result = from.interpolate(&to, 0.5);
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
        assert!(result.abs_diff_eq(expected, 0.0001));
    }

    #[test]
    fn test_normalize_zero_quaternion() {
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        assert_eq!(normalize_or_identity(zero), Quat::IDENTITY);
    }
}
