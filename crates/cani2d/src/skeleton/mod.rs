//! Bone hierarchy and per-instance pose evaluation
//!
//! A [`Skeleton`] holds the immutable rest configuration shared by every
//! animation instance built from one mesh. Each instance owns a [`PoseTree`]
//! with the mutable rotation/translation/scale of every bone and the matrices
//! derived from them for the current frame.

mod bone;
mod pose;

pub use bone::{Bone, BoneDef, Skeleton};
pub use pose::{LogPoseObserver, Pose, PoseObserver, PoseTree, REST_ROTATION};
