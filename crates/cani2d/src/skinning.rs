//! Linear blend skinning anchored at bone heads
//!
//! Each weighted vertex is moved by every bone that influences it: the
//! vertex offset from the bone's rest head is transformed by the bone's
//! skinning matrix and re-attached to the bone's current head, then the
//! results are blended by weight. Vertices without meaningful weight keep
//! their rest position.
//!
//! # Example
//!
//! ```rust
//! use cani2d::math::{Vec2, planar_rotation};
//! use cani2d::skeleton::{BoneDef, PoseTree, Skeleton};
//! use cani2d::skinning::{SkinWeights, SkinningOptions, VertexInfluence, skin};
//!
//! let skeleton = Skeleton::new(vec![BoneDef::root("root", Vec2::ZERO)])?;
//! let weights = SkinWeights::normalize(
//!     vec![VertexInfluence::single(0)],
//!     skeleton.len(),
//!     &SkinningOptions::default(),
//! );
//!
//! let mut poses = PoseTree::new(&skeleton);
//! poses.pose_mut(0).unwrap().rotation = planar_rotation(std::f32::consts::PI);
//! poses.rebuild(&skeleton);
//!
//! let deformed = skin(&[Vec2::new(1.0, 0.0)], &poses, &skeleton, &weights);
//! assert!(deformed[0].abs_diff_eq(Vec2::new(-1.0, 0.0), 1e-5));
//! # Ok::<(), cani2d::error::Cani2dError>(())
//! ```

use crate::error::StructuralError;
use crate::math::Vec2;
use crate::skeleton::{PoseTree, Skeleton};

/// Options for controlling the skinning behavior
#[derive(Debug, Clone)]
pub struct SkinningOptions {
    /// Vertices whose raw weights sum to no more than this are left unskinned
    pub weight_threshold: f32,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            weight_threshold: 1e-6,
        }
    }
}

/// Bones influencing one vertex, as parallel index and weight lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexInfluence {
    /// Influencing bone indices
    pub bones: Vec<usize>,
    /// Weight of each influencing bone
    pub weights: Vec<f32>,
}

impl VertexInfluence {
    /// Create an influence set with a single full-weight bone
    pub fn single(bone: usize) -> Self {
        Self {
            bones: vec![bone],
            weights: vec![1.0],
        }
    }

    /// Add a bone influence
    pub fn push(&mut self, bone: usize, weight: f32) {
        self.bones.push(bone);
        self.weights.push(weight);
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Iterate over (bone, weight) pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.bones.iter().copied().zip(self.weights.iter().copied())
    }

    /// Check if no bone influences this vertex
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// Normalized per-vertex bone weights for a mesh
#[derive(Debug, Clone, Default)]
pub struct SkinWeights {
    influences: Vec<VertexInfluence>,
    weighted: Vec<bool>,
}

impl SkinWeights {
    /// Validate and normalize raw influences
    ///
    /// Influences on bones past `bone_count` are dropped with a warning.
    /// Vertices whose remaining weights sum above the threshold are scaled to
    /// sum to 1.0; the others are marked unweighted and keep their rest
    /// position during skinning.
    pub fn normalize(
        mut influences: Vec<VertexInfluence>,
        bone_count: usize,
        options: &SkinningOptions,
    ) -> Self {
        let mut weighted = Vec::with_capacity(influences.len());

        for (vertex, influence) in influences.iter_mut().enumerate() {
            if influence.bones.len() != influence.weights.len() {
                let len = influence.bones.len().min(influence.weights.len());
                influence.bones.truncate(len);
                influence.weights.truncate(len);
            }

            if influence.bones.iter().any(|&bone| bone >= bone_count) {
                let mut kept = VertexInfluence::default();
                for (bone, weight) in influence.iter() {
                    if bone < bone_count {
                        kept.push(bone, weight);
                    } else {
                        log::warn!(
                            "{}",
                            StructuralError::InfluenceOutOfRange {
                                vertex,
                                bone,
                                count: bone_count,
                            }
                        );
                    }
                }
                *influence = kept;
            }

            let total = influence.total_weight();
            if total > options.weight_threshold {
                for weight in &mut influence.weights {
                    *weight /= total;
                }
                weighted.push(true);
            } else {
                weighted.push(false);
            }
        }

        Self {
            influences,
            weighted,
        }
    }

    /// Get number of vertices covered
    pub fn len(&self) -> usize {
        self.influences.len()
    }

    /// Check if no vertices are covered
    pub fn is_empty(&self) -> bool {
        self.influences.is_empty()
    }

    /// Get the normalized influences of a vertex
    pub fn influence(&self, vertex: usize) -> Option<&VertexInfluence> {
        self.influences.get(vertex)
    }

    /// Check if a vertex takes part in skinning
    pub fn is_weighted(&self, vertex: usize) -> bool {
        self.weighted.get(vertex).copied().unwrap_or(false)
    }

    /// Count vertices that take part in skinning
    pub fn weighted_count(&self) -> usize {
        self.weighted.iter().filter(|&&w| w).count()
    }
}

/// Deform rest positions into `out` using the current poses
///
/// `poses` must have been rebuilt for the current frame. Vertices beyond the
/// shorter of `rest` and `out` are left alone.
pub fn skin_vertices(
    rest: &[Vec2],
    poses: &PoseTree,
    skeleton: &Skeleton,
    weights: &SkinWeights,
    out: &mut [Vec2],
) {
    for (vertex, (target, &position)) in out.iter_mut().zip(rest).enumerate() {
        *target = position;

        if !weights.is_weighted(vertex) {
            continue;
        }
        let Some(influence) = weights.influence(vertex) else {
            continue;
        };

        let mut blended = Vec2::ZERO;
        for (bone, weight) in influence.iter() {
            let (Some(pose), Some(rest_bone)) = (poses.pose(bone), skeleton.bone(bone)) else {
                continue;
            };
            let matrix = pose.skinning();
            let head = matrix.transform_point2(rest_bone.head);
            blended += (head + matrix.transform_vector2(position - rest_bone.head)) * weight;
        }
        *target = blended;
    }
}

/// Deform rest positions using the current poses
pub fn skin(
    rest: &[Vec2],
    poses: &PoseTree,
    skeleton: &Skeleton,
    weights: &SkinWeights,
) -> Vec<Vec2> {
    let mut out = rest.to_vec();
    skin_vertices(rest, poses, skeleton, weights, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::planar_rotation;
    use crate::skeleton::BoneDef;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

    fn two_bones() -> Skeleton {
        Skeleton::new(vec![
            BoneDef::root("upper", Vec2::new(2.0, 1.0)),
            BoneDef::child("lower", 0, Vec2::new(4.0, 0.0)),
        ])
        .unwrap()
    }

    fn influence(pairs: &[(usize, f32)]) -> VertexInfluence {
        let mut influence = VertexInfluence::default();
        for &(bone, weight) in pairs {
            influence.push(bone, weight);
        }
        influence
    }

    #[test]
    fn test_weights_normalized() {
        let weights = SkinWeights::normalize(
            vec![
                influence(&[(0, 0.2), (1, 0.6)]),
                influence(&[(1, 3.0)]),
                influence(&[]),
            ],
            2,
            &SkinningOptions::default(),
        );

        for vertex in 0..2 {
            let total = weights.influence(vertex).unwrap().total_weight();
            assert!((total - 1.0).abs() < 1e-6);
            assert!(weights.is_weighted(vertex));
        }
        assert!(!weights.is_weighted(2));
        assert_eq!(weights.weighted_count(), 2);
    }

    #[test]
    fn test_weights_below_threshold_unweighted() {
        let weights = SkinWeights::normalize(
            vec![influence(&[(0, 1e-9)])],
            1,
            &SkinningOptions::default(),
        );
        assert!(!weights.is_weighted(0));
    }

    #[test]
    fn test_weights_drop_unknown_bones() {
        let weights = SkinWeights::normalize(
            vec![influence(&[(0, 0.5), (5, 0.5)])],
            1,
            &SkinningOptions::default(),
        );
        let kept = weights.influence(0).unwrap();
        assert_eq!(kept.bones, vec![0]);
        assert!((kept.weights[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rest_pose_reproduces_rest_positions() {
        let skeleton = two_bones();
        let mut poses = PoseTree::new(&skeleton);
        poses.rebuild(&skeleton);
        let rest = vec![Vec2::new(0.0, 0.0), Vec2::new(7.0, 3.0), Vec2::new(-4.0, 9.0)];
        let weights = SkinWeights::normalize(
            vec![
                influence(&[(0, 1.0)]),
                influence(&[(0, 0.3), (1, 0.7)]),
                influence(&[(1, 1.0)]),
            ],
            2,
            &SkinningOptions::default(),
        );

        let deformed = skin(&rest, &poses, &skeleton, &weights);
        for (a, b) in deformed.iter().zip(&rest) {
            assert!(a.abs_diff_eq(*b, 1e-5));
        }
    }

    #[test]
    fn test_rigid_single_influence_follows_bone() {
        let skeleton = two_bones();
        let mut poses = PoseTree::new(&skeleton);
        poses.pose_mut(1).unwrap().rotation = planar_rotation(FRAC_PI_3);
        poses.rebuild(&skeleton);

        let lower_head = Vec2::new(6.0, 1.0);
        let rest = Vec2::new(9.0, 2.0);
        let weights = SkinWeights::normalize(vec![VertexInfluence::single(1)], 2, &SkinningOptions::default());

        let deformed = skin(&[rest], &poses, &skeleton, &weights);
        let expected = lower_head + Vec2::from_angle(FRAC_PI_3).rotate(rest - lower_head);
        assert!(deformed[0].abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_child_follows_parent_rotation() {
        let skeleton = two_bones();
        let mut poses = PoseTree::new(&skeleton);
        poses.pose_mut(0).unwrap().rotation = planar_rotation(FRAC_PI_2);
        poses.rebuild(&skeleton);

        let weights = SkinWeights::normalize(vec![VertexInfluence::single(1)], 2, &SkinningOptions::default());
        // Vertex on the lower bone's head swings around the upper head (2, 1)
        let deformed = skin(&[Vec2::new(6.0, 1.0)], &poses, &skeleton, &weights);
        assert!(deformed[0].abs_diff_eq(Vec2::new(2.0, 5.0), 1e-5));
    }

    #[test]
    fn test_blend_two_bones() {
        let skeleton = two_bones();
        let mut poses = PoseTree::new(&skeleton);
        poses.pose_mut(0).unwrap().translation = Vec2::new(0.0, 2.0);
        poses.rebuild(&skeleton);

        // Root translation moves both bones, so any blend moves by the same amount
        let weights = SkinWeights::normalize(
            vec![influence(&[(0, 1.0), (1, 1.0)])],
            2,
            &SkinningOptions::default(),
        );
        let deformed = skin(&[Vec2::new(3.0, 3.0)], &poses, &skeleton, &weights);
        assert!(deformed[0].abs_diff_eq(Vec2::new(3.0, 5.0), 1e-5));
    }

    #[test]
    fn test_unweighted_vertex_keeps_rest_position() {
        // Unweighted vertices stay at rest instead of collapsing to the origin
        let skeleton = two_bones();
        let mut poses = PoseTree::new(&skeleton);
        poses.pose_mut(0).unwrap().rotation = planar_rotation(FRAC_PI_2);
        poses.rebuild(&skeleton);

        let weights = SkinWeights::normalize(vec![influence(&[])], 2, &SkinningOptions::default());
        let mut out = vec![Vec2::new(100.0, 100.0)];
        skin_vertices(&[Vec2::new(5.0, 5.0)], &poses, &skeleton, &weights, &mut out);
        assert_eq!(out[0], Vec2::new(5.0, 5.0));
    }
}
