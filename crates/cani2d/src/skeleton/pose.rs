//! Per-instance bone poses and hierarchy transform computation
//!
//! Poses are rebuilt top-down every frame: a bone's global matrix is its
//! parent's global matrix times its own local matrix, so parents must be
//! finished before their children. The traversal starts at every root and
//! recurses into children, passing the freshly computed global matrix along.

use super::bone::Skeleton;
use crate::math::{Mat3, Quat, Vec2, transform_matrix};

/// Rotation every pose starts from and resets to
///
/// Exported rotation curves carry a negated w channel, so the rest
/// orientation is `w = -1`. It is the same rotation as identity, but curves
/// that key only x, y or z combine with this w and turn the right way.
pub const REST_ROTATION: Quat = Quat::from_xyzw(0.0, 0.0, 0.0, -1.0);

/// Runtime transform state of one bone
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Rotation (not necessarily unit length, normalized when used)
    pub rotation: Quat,
    /// Translation offset from the rest head, in parent space
    pub translation: Vec2,
    /// Scale
    pub scale: Vec2,
    /// Inverse of the rest global matrix, fixed at construction
    inverse_bind: Mat3,
    /// Local matrix for the current frame
    local: Mat3,
    /// Global matrix for the current frame
    global: Mat3,
    /// Global matrix times inverse bind matrix for the current frame
    skinning: Mat3,
}

impl Pose {
    fn rest(rest_global: Mat3) -> Self {
        Self {
            rotation: REST_ROTATION,
            translation: Vec2::ZERO,
            scale: Vec2::ONE,
            inverse_bind: rest_global.inverse(),
            local: Mat3::IDENTITY,
            global: rest_global,
            skinning: Mat3::IDENTITY,
        }
    }

    /// Get the inverse bind matrix
    pub fn inverse_bind(&self) -> Mat3 {
        self.inverse_bind
    }

    /// Get the local matrix computed by the last rebuild
    pub fn local(&self) -> Mat3 {
        self.local
    }

    /// Get the global matrix computed by the last rebuild
    pub fn global(&self) -> Mat3 {
        self.global
    }

    /// Get the skinning matrix computed by the last rebuild
    ///
    /// Maps a rest-pose point in mesh space to its deformed position.
    pub fn skinning(&self) -> Mat3 {
        self.skinning
    }

    /// Get the bone head position for the current frame
    pub fn head(&self) -> Vec2 {
        self.global.z_axis.truncate()
    }

    /// Reset rotation, translation and scale to the rest pose
    pub fn reset(&mut self) {
        self.rotation = REST_ROTATION;
        self.translation = Vec2::ZERO;
        self.scale = Vec2::ONE;
    }
}

/// Hook invoked after each bone's matrices are rebuilt
///
/// Nothing observes pose rebuilds unless a hook is passed to
/// [`PoseTree::rebuild_with`].
pub trait PoseObserver {
    /// Called once per bone, parents before children
    fn pose_built(&mut self, bone: usize, pose: &Pose);
}

/// Observer writing every rebuilt pose to the `trace` log level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPoseObserver;

impl PoseObserver for LogPoseObserver {
    fn pose_built(&mut self, bone: usize, pose: &Pose) {
        log::trace!(
            "bone {bone}: rotation {:?} head {:?} skinning {:?}",
            pose.rotation,
            pose.head(),
            pose.skinning
        );
    }
}

struct NoObserver;

impl PoseObserver for NoObserver {
    #[inline]
    fn pose_built(&mut self, _bone: usize, _pose: &Pose) {}
}

/// Pose state for every bone of a skeleton
#[derive(Debug, Clone, Default)]
pub struct PoseTree {
    poses: Vec<Pose>,
}

impl PoseTree {
    /// Create rest poses for a skeleton
    ///
    /// The rest global matrix of each bone is the product of the translations
    /// to its rest head along the parent chain; its inverse becomes the
    /// bind matrix and is never recomputed.
    pub fn new(skeleton: &Skeleton) -> Self {
        let mut rest_globals: Vec<Mat3> = Vec::with_capacity(skeleton.len());

        for bone in skeleton.bones() {
            let local = Mat3::from_translation(bone.local_head);
            let global = match bone.parent {
                Some(parent) => rest_globals[parent] * local,
                None => local,
            };
            rest_globals.push(global);
        }

        let poses = rest_globals.into_iter().map(Pose::rest).collect();
        Self { poses }
    }

    /// Get number of poses
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Check if there are no poses
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Get all poses in bone order
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Get the pose of a bone
    pub fn pose(&self, bone: usize) -> Option<&Pose> {
        self.poses.get(bone)
    }

    /// Get the pose of a bone for modification
    ///
    /// Changes take effect at the next rebuild.
    pub fn pose_mut(&mut self, bone: usize) -> Option<&mut Pose> {
        self.poses.get_mut(bone)
    }

    /// Reset every pose to rest
    pub fn reset(&mut self) {
        for pose in &mut self.poses {
            pose.reset();
        }
    }

    /// Rebuild local, global and skinning matrices for all bones
    pub fn rebuild(&mut self, skeleton: &Skeleton) {
        self.rebuild_with(skeleton, &mut NoObserver);
    }

    /// Rebuild all matrices, reporting each bone to `observer`
    pub fn rebuild_with<O: PoseObserver + ?Sized>(&mut self, skeleton: &Skeleton, observer: &mut O) {
        for &root in skeleton.roots() {
            self.build_pose(skeleton, root, Mat3::IDENTITY, observer);
        }
    }

    fn build_pose<O: PoseObserver + ?Sized>(
        &mut self,
        skeleton: &Skeleton,
        index: usize,
        parent_global: Mat3,
        observer: &mut O,
    ) {
        let (Some(bone), Some(pose)) = (skeleton.bone(index), self.poses.get_mut(index)) else {
            return;
        };

        pose.local = transform_matrix(
            bone.local_head + pose.translation,
            pose.rotation,
            pose.scale,
        );
        pose.global = parent_global * pose.local;
        pose.skinning = pose.global * pose.inverse_bind;

        let global = pose.global;
        observer.pose_built(index, pose);

        for &child in &bone.children {
            self.build_pose(skeleton, child, global, observer);
        }
    }
}
