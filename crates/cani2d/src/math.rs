//! Vector, matrix and quaternion kernel for 2D skeletal animation
//!
//! Bone transforms are homogeneous 3x3 matrices ([`Mat3`], column-major, like
//! OpenGL/WebGL) acting on 2D points. Rotations are stored as quaternions and
//! only their XY-plane block is used, so a bone rotated by an arbitrary
//! quaternion still maps the drawing plane onto itself. Draw-time texture
//! mapping uses [`Affine2`], the six-coefficient form a canvas transform takes.

pub use glam::{Affine2, Mat3, Quat, Vec2, Vec3, Vec4};

/// Normalize a quaternion, falling back to identity for a zero-length input
///
/// Curves write quaternion components independently, so the stored rotation
/// is usually not unit length.
pub fn normalize_rotation(q: Quat) -> Quat {
    Vec4::from(q)
        .try_normalize()
        .map_or(Quat::IDENTITY, Quat::from_vec4)
}

/// Create the 2D rotation matrix of a quaternion
///
/// The quaternion is normalized first; the result is the upper-left 2x2 block
/// of the equivalent 3D rotation with no translation.
pub fn rotation_matrix(q: Quat) -> Mat3 {
    let m = Mat3::from_quat(normalize_rotation(q));
    Mat3::from_cols(
        Vec3::new(m.x_axis.x, m.x_axis.y, 0.0),
        Vec3::new(m.y_axis.x, m.y_axis.y, 0.0),
        Vec3::Z,
    )
}

/// Create a transformation matrix from translation, rotation and scale
///
/// Points are scaled first, then rotated, then translated: `T * R * S`.
pub fn transform_matrix(translation: Vec2, rotation: Quat, scale: Vec2) -> Mat3 {
    Mat3::from_translation(translation) * rotation_matrix(rotation) * Mat3::from_scale(scale)
}

/// Quaternion rotating the drawing plane by `angle` radians
pub fn planar_rotation(angle: f32) -> Quat {
    Quat::from_rotation_z(angle)
}

/// Evaluate a cubic Bezier curve with control points `p0..p3` at parameter `t`
pub fn cubic_bezier(t: f32, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    let ct = 1.0 - t;
    let ct2 = ct * ct;
    let t2 = t * t;

    p0 * (ct2 * ct) + p1 * (3.0 * ct2 * t) + p2 * (3.0 * ct * t2) + p3 * (t2 * t)
}
