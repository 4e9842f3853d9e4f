//! Drawing surface capability and the per-triangle texture mapping

use image::RgbaImage;

use crate::atlas::TextureTile;
use crate::math::{Affine2, Vec2};

/// Determinant magnitude below which a UV triangle is treated as collinear
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// A 2D target the renderer draws into
///
/// Implementations keep a stack of clip state. Every draw the renderer issues
/// is bracketed by [`save_state`](Self::save_state) and
/// [`restore_state`](Self::restore_state), so clip polygons set in between
/// must not leak past the matching restore.
pub trait DrawingSurface {
    /// Push the current clip state
    fn save_state(&mut self);

    /// Pop back to the most recently saved clip state
    ///
    /// Restoring with nothing saved leaves the state unchanged.
    fn restore_state(&mut self);

    /// Intersect the clip region with a polygon
    fn clip_to_polygon(&mut self, points: &[Vec2]);

    /// Make an axis-aligned rectangle fully transparent
    fn clear_region(&mut self, origin: Vec2, size: Vec2);

    /// Draw `image` stretched over the rectangle `origin..origin + size`,
    /// mapped through `transform`
    fn draw_transformed_image(
        &mut self,
        image: &RgbaImage,
        origin: Vec2,
        size: Vec2,
        transform: &Affine2,
    );
}

/// Solve the affine map taking three UV corners onto three screen corners
///
/// The result maps `(s, t)` to `(a·s + b·t + c, d·s + e·t + f)`. Returns
/// `None` when the UV corners are collinear.
pub fn solve_triangle_affine(uv: [Vec2; 3], screen: [Vec2; 3]) -> Option<Affine2> {
    // Solved in f64, tile UVs are small differences of texture coordinates
    let [s0, s1, s2] = uv.map(|p| f64::from(p.x));
    let [t0, t1, t2] = uv.map(|p| f64::from(p.y));
    let [x0, x1, x2] = screen.map(|p| f64::from(p.x));
    let [y0, y1, y2] = screen.map(|p| f64::from(p.y));

    let delta = s0 * t1 + t0 * s2 + s1 * t2 - t1 * s2 - t0 * s1 - s0 * t2;
    if delta.abs() < DEGENERATE_EPSILON {
        return None;
    }

    let linear_s = |v0: f64, v1: f64, v2: f64| {
        (v0 * t1 + t0 * v2 + v1 * t2 - t1 * v2 - t0 * v1 - v0 * t2) / delta
    };
    let linear_t = |v0: f64, v1: f64, v2: f64| {
        (s0 * v1 + v0 * s2 + s1 * v2 - v1 * s2 - v0 * s1 - s0 * v2) / delta
    };
    let offset = |v0: f64, v1: f64, v2: f64| {
        (s0 * t1 * v2 + t0 * v1 * s2 + v0 * s1 * t2
            - v0 * t1 * s2
            - t0 * s1 * v2
            - s0 * v1 * t2)
            / delta
    };

    let a = linear_s(x0, x1, x2);
    let b = linear_t(x0, x1, x2);
    let c = offset(x0, x1, x2);
    let d = linear_s(y0, y1, y2);
    let e = linear_t(y0, y1, y2);
    let f = offset(y0, y1, y2);

    let coefficients = [a, d, b, e, c, f].map(|v| v as f32);
    if coefficients.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Affine2::from_cols_array(&coefficients))
}

/// Draw one atlas tile onto its current screen triangle
///
/// Returns `false` without touching the surface when no affine map exists.
pub fn draw_triangle(
    tile: &TextureTile,
    screen: [Vec2; 3],
    surface: &mut dyn DrawingSurface,
) -> bool {
    let Some(transform) = solve_triangle_affine(tile.uv(), screen) else {
        return false;
    };

    surface.save_state();
    surface.draw_transformed_image(tile.image(), Vec2::ZERO, tile.size(), &transform);
    surface.restore_state();
    true
}
