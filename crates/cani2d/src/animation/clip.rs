//! Named animation clips

use super::curve::{Curve, CurveTarget, evaluate_curve};
use crate::skeleton::PoseTree;

/// A curve bound to a bone
#[derive(Debug, Clone, PartialEq)]
pub struct BoneCurve {
    /// Index of the animated bone
    pub bone: usize,
    /// Keyframe data
    pub curve: Curve,
}

/// A named animation: a frame length and the curves driving each bone
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// Clip length in frames
    pub length: f32,
    curves: Vec<BoneCurve>,
}

impl AnimationClip {
    /// Create a clip
    pub fn new(name: impl Into<String>, length: f32, curves: Vec<BoneCurve>) -> Self {
        Self {
            name: name.into(),
            length,
            curves,
        }
    }

    /// Get all curves
    pub fn curves(&self) -> &[BoneCurve] {
        &self.curves
    }

    /// Count curves that affect bone rotations
    pub fn rotation_curve_count(&self) -> usize {
        self.curves.iter().filter(|c| c.curve.is_rotation()).count()
    }

    /// Write curve values for `frame` into the pose rotations
    ///
    /// Curves on channels other than rotation, curves without keys and
    /// curves naming bones outside the pose tree leave the pose untouched.
    pub fn apply(&self, frame: f32, poses: &mut PoseTree) {
        for BoneCurve { bone, curve } in &self.curves {
            let CurveTarget::Rotation(axis) = curve.target else {
                continue;
            };
            let Some(value) = evaluate_curve(curve, frame) else {
                continue;
            };
            if let Some(pose) = poses.pose_mut(*bone) {
                pose.rotation = axis.set(pose.rotation, value);
            }
        }
    }
}
