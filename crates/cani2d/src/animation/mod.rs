//! Keyframed animation clips and playback state
//!
//! This module provides:
//! - Rotation curves with cubic Bezier easing between keyframes
//! - Animation clips grouping curves per bone
//! - Playback transport state (frame, fps, looping)
//!
//! # Example
//!
//! ```rust
//! use cani2d::animation::{Curve, CurveTarget, Keyframe, QuatAxis, evaluate_curve};
//!
//! let curve = Curve::new(
//!     CurveTarget::Rotation(QuatAxis::Z),
//!     vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(10.0, 1.0)],
//! );
//!
//! assert_eq!(evaluate_curve(&curve, -5.0), Some(0.0));
//! assert_eq!(evaluate_curve(&curve, 20.0), Some(1.0));
//! ```

mod clip;
mod curve;
mod state;

pub use clip::{AnimationClip, BoneCurve};
pub use curve::{Curve, CurveTarget, Keyframe, QuatAxis, evaluate_curve, find_key_index};
pub use state::{DEFAULT_FPS, PlaybackState};
