//! Keyframe curves and their evaluation

use crate::math::{Quat, Vec2, Vec4, cubic_bezier};

/// Quaternion component driven by a rotation curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuatAxis {
    W,
    X,
    Y,
    Z,
}

impl QuatAxis {
    /// Map an exporter array index (0=w, 1=x, 2=y, 3=z) to an axis
    pub fn from_array_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::W),
            1 => Some(Self::X),
            2 => Some(Self::Y),
            3 => Some(Self::Z),
            _ => None,
        }
    }

    /// Replace this component of a quaternion
    pub fn set(self, q: Quat, value: f32) -> Quat {
        let mut v = Vec4::from(q);
        match self {
            Self::X => v.x = value,
            Self::Y => v.y = value,
            Self::Z => v.z = value,
            Self::W => v.w = value,
        }
        Quat::from_vec4(v)
    }
}

/// What a curve animates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveTarget {
    /// One component of the bone rotation quaternion
    Rotation(QuatAxis),
    /// Any other channel (location, scale, ...); kept but never applied
    Other { kind: String, index: usize },
}

/// A single curve keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Key time in frames
    pub time: f32,
    /// Key value
    pub value: f32,
    /// Incoming Bezier handle as (time, value) offset from the key
    pub in_handle: Vec2,
    /// Outgoing Bezier handle as (time, value) offset from the key
    pub out_handle: Vec2,
}

impl Keyframe {
    /// Create a keyframe with explicit handle offsets
    pub fn new(time: f32, value: f32, in_handle: Vec2, out_handle: Vec2) -> Self {
        Self {
            time,
            value,
            in_handle,
            out_handle,
        }
    }

    /// Create a keyframe with flat zero-length handles
    pub fn linear(time: f32, value: f32) -> Self {
        Self::new(time, value, Vec2::ZERO, Vec2::ZERO)
    }

    /// Create a keyframe from absolute handle positions
    pub fn from_absolute_handles(time: f32, value: f32, left: Vec2, right: Vec2) -> Self {
        let key = Vec2::new(time, value);
        Self::new(time, value, left - key, right - key)
    }

    fn point(&self) -> Vec2 {
        Vec2::new(self.time, self.value)
    }
}

/// Time-ordered keyframes driving one channel
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// Animated channel
    pub target: CurveTarget,
    keys: Vec<Keyframe>,
}

impl Curve {
    /// Create a curve, ordering keys by time
    pub fn new(target: CurveTarget, mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { target, keys }
    }

    /// Get keys in time order
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Check if the curve drives a rotation component
    pub fn is_rotation(&self) -> bool {
        matches!(self.target, CurveTarget::Rotation(_))
    }
}

/// Find the index of the keyframe at or before the given time
///
/// Returns None if the track has no keyframes or the time precedes the
/// first key. For interpolation this is the earlier key of the bracketing
/// pair (`keys[index].time <= time < keys[index + 1].time`).
pub fn find_key_index(keys: &[Keyframe], time: f32) -> Option<usize> {
    keys.partition_point(|k| k.time <= time).checked_sub(1)
}

/// Evaluate a curve at the given time
///
/// Times before the first key yield the first value, times at or after the
/// last key yield the last value. Between keys the value follows a cubic
/// Bezier through the two keys and their facing handles, sampled at the
/// normalized time between them. Returns None for a curve without keys.
pub fn evaluate_curve(curve: &Curve, time: f32) -> Option<f32> {
    let keys = curve.keys();
    let first = keys.first()?;

    let Some(index) = find_key_index(keys, time) else {
        return Some(first.value);
    };

    let Some(next) = keys.get(index + 1) else {
        return Some(keys[index].value);
    };
    let prev = &keys[index];

    // next.time > prev.time since keys are sorted and prev.time <= time < next.time
    let t = (time - prev.time) / (next.time - prev.time);
    let p0 = prev.point();
    let p1 = p0 + prev.out_handle;
    let p3 = next.point();
    let p2 = p3 + next.in_handle;

    Some(cubic_bezier(t, p0, p1, p2, p3).y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn eased() -> Curve {
        Curve::new(
            CurveTarget::Rotation(QuatAxis::W),
            vec![
                Keyframe::new(0.0, 1.0, Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)),
                Keyframe::new(10.0, 0.0, Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)),
                Keyframe::new(20.0, 0.5, Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)),
            ],
        )
    }

    #[test]
    fn test_find_key_index_empty() {
        assert_eq!(find_key_index(&[], 0.0), None);
    }

    #[test]
    fn test_find_key_index_multiple() {
        let curve = eased();
        let keys = curve.keys();

        assert_eq!(find_key_index(keys, -1.0), None);
        assert_eq!(find_key_index(keys, 0.0), Some(0));
        assert_eq!(find_key_index(keys, 5.0), Some(0));
        assert_eq!(find_key_index(keys, 10.0), Some(1));
        assert_eq!(find_key_index(keys, 15.0), Some(1));
        assert_eq!(find_key_index(keys, 20.0), Some(2));
        assert_eq!(find_key_index(keys, 99.0), Some(2));
    }

    #[test]
    fn test_evaluate_empty_curve() {
        let curve = Curve::new(CurveTarget::Rotation(QuatAxis::X), Vec::new());
        assert_eq!(evaluate_curve(&curve, 0.0), None);
    }

    #[test_case(-100.0, 1.0 ; "before first key")]
    #[test_case(0.0, 1.0 ; "at first key")]
    #[test_case(10.0, 0.0 ; "at interior key")]
    #[test_case(20.0, 0.5 ; "at last key")]
    #[test_case(35.0, 0.5 ; "after last key")]
    fn test_evaluate_boundaries(time: f32, expected: f32) {
        let value = evaluate_curve(&eased(), time).unwrap();
        assert!((value - expected).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_flat_handles_midpoint() {
        // Flat handles make the value component symmetric around the midpoint
        let value = evaluate_curve(&eased(), 5.0).unwrap();
        assert!((value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_eases_in() {
        let value = evaluate_curve(&eased(), 1.0).unwrap();
        let linear = 0.9;
        // Bezier easing stays closer to the start value than a straight line
        assert!(value > linear);
        assert!(value < 1.0);
    }

    #[test]
    fn test_evaluate_uses_handle_values() {
        let curve = Curve::new(
            CurveTarget::Rotation(QuatAxis::Z),
            vec![
                Keyframe::new(0.0, 0.0, Vec2::ZERO, Vec2::new(1.0, 3.0)),
                Keyframe::new(4.0, 0.0, Vec2::new(-1.0, 3.0), Vec2::ZERO),
            ],
        );
        // y(0.5) = 3 * 0.25 * 0.5 * 3 + 3 * 0.5 * 0.25 * 3 = 2.25
        let value = evaluate_curve(&curve, 2.0).unwrap();
        assert!((value - 2.25).abs() < 1e-6);
    }

    #[test]
    fn test_keys_sorted_on_construction() {
        let curve = Curve::new(
            CurveTarget::Rotation(QuatAxis::Y),
            vec![Keyframe::linear(5.0, 2.0), Keyframe::linear(1.0, 1.0)],
        );
        assert_eq!(curve.keys()[0].time, 1.0);
        assert_eq!(evaluate_curve(&curve, 0.0), Some(1.0));
    }

    #[test]
    fn test_absolute_handles() {
        let key = Keyframe::from_absolute_handles(
            10.0,
            2.0,
            Vec2::new(8.0, 1.0),
            Vec2::new(12.0, 3.0),
        );
        assert_eq!(key.in_handle, Vec2::new(-2.0, -1.0));
        assert_eq!(key.out_handle, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_quat_axis_mapping() {
        assert_eq!(QuatAxis::from_array_index(0), Some(QuatAxis::W));
        assert_eq!(QuatAxis::from_array_index(3), Some(QuatAxis::Z));
        assert_eq!(QuatAxis::from_array_index(4), None);

        let q = QuatAxis::Z.set(Quat::IDENTITY, 0.5);
        assert_eq!(q.z, 0.5);
        assert_eq!(q.w, 1.0);
        let q = QuatAxis::W.set(q, -1.0);
        assert_eq!(q.w, -1.0);
        assert_eq!(q.z, 0.5);
    }
}
