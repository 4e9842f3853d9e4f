//! Software drawing surface over an RGBA image
//!
//! [`Canvas`] implements [`DrawingSurface`] with nearest-neighbour sampling
//! and source-over blending. Drawing happens in user space. An optional view
//! transform maps user space onto device pixels, which is how a mesh is
//! scaled and positioned inside an output image.

use image::{Rgba, RgbaImage};

use crate::math::{Affine2, Vec2};
use crate::surface::DrawingSurface;

/// Clip state saved and restored by the surface stack
#[derive(Debug, Clone, Default)]
struct CanvasState {
    /// Device-space polygons, a pixel must lie inside all of them
    clips: Vec<Vec<Vec2>>,
}

/// RGBA render target
#[derive(Debug, Clone)]
pub struct Canvas {
    target: RgbaImage,
    view: Affine2,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl Canvas {
    /// Create a transparent canvas with an identity view
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    /// Draw on top of an existing image
    pub fn from_image(target: RgbaImage) -> Self {
        Self {
            target,
            view: Affine2::IDENTITY,
            state: CanvasState::default(),
            stack: Vec::new(),
        }
    }

    /// Set the user-to-device transform
    ///
    /// Clip polygons already set keep the device position they had.
    pub fn set_view(&mut self, view: Affine2) {
        self.view = view;
    }

    /// Builder form of [`set_view`](Self::set_view)
    pub fn with_view(mut self, view: Affine2) -> Self {
        self.view = view;
        self
    }

    /// Get the user-to-device transform
    pub fn view(&self) -> Affine2 {
        self.view
    }

    /// Get canvas width in pixels
    pub fn width(&self) -> u32 {
        self.target.width()
    }

    /// Get canvas height in pixels
    pub fn height(&self) -> u32 {
        self.target.height()
    }

    /// Fill the whole canvas with one color, ignoring view and clip
    pub fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.target.pixels_mut() {
            *pixel = color;
        }
    }

    /// Get the rendered image
    pub fn image(&self) -> &RgbaImage {
        &self.target
    }

    /// Take the rendered image
    pub fn into_image(self) -> RgbaImage {
        self.target
    }

    fn clipped(&self, point: Vec2) -> bool {
        self.state
            .clips
            .iter()
            .any(|polygon| !point_in_polygon(point, polygon))
    }

    /// Device pixel range covered by the bounding box of `points`
    fn pixel_bounds(&self, points: &[Vec2]) -> Option<(u32, u32, u32, u32)> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.target.width());
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.target.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

impl DrawingSurface for Canvas {
    fn save_state(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore_state(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn clip_to_polygon(&mut self, points: &[Vec2]) {
        let polygon = points
            .iter()
            .map(|p| self.view.transform_point2(*p))
            .collect();
        self.state.clips.push(polygon);
    }

    fn clear_region(&mut self, origin: Vec2, size: Vec2) {
        let corners = [
            origin,
            origin + Vec2::new(size.x, 0.0),
            origin + size,
            origin + Vec2::new(0.0, size.y),
        ]
        .map(|p| self.view.transform_point2(p));

        let Some((x0, y0, x1, y1)) = self.pixel_bounds(&corners) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if point_in_polygon(center, &corners) && !self.clipped(center) {
                    self.target.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                }
            }
        }
    }

    fn draw_transformed_image(
        &mut self,
        image: &RgbaImage,
        origin: Vec2,
        size: Vec2,
        transform: &Affine2,
    ) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        // Image pixel space -> user rectangle -> draw transform -> device
        let placement = Affine2::from_scale_angle_translation(
            size / Vec2::new(width as f32, height as f32),
            0.0,
            origin,
        );
        let to_device = self.view * *transform * placement;
        if to_device.matrix2.determinant().abs() < f32::EPSILON * f32::EPSILON {
            return;
        }
        let to_image = to_device.inverse();

        let extent = Vec2::new(width as f32, height as f32);
        let corners = [Vec2::ZERO, Vec2::new(extent.x, 0.0), extent, Vec2::new(0.0, extent.y)]
            .map(|p| to_device.transform_point2(p));
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(&corners) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let source = to_image.transform_point2(center);
                if source.x < 0.0 || source.y < 0.0 || source.x >= extent.x || source.y >= extent.y {
                    continue;
                }
                if self.clipped(center) {
                    continue;
                }

                let texel = *image.get_pixel(source.x as u32, source.y as u32);
                blend_over(self.target.get_pixel_mut(x, y), texel);
            }
        }
    }
}

/// Even-odd point in polygon test
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut previous = match polygon.last() {
        Some(p) => *p,
        None => return false,
    };

    for &current in polygon {
        if (current.y > point.y) != (previous.y > point.y) {
            let cross_x =
                (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y) + current.x;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Source-over composite of `src` onto `dst`
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_alpha = u32::from(src[3]);
    if src_alpha == 0 {
        return;
    }
    if src_alpha == 255 {
        *dst = src;
        return;
    }

    let dst_alpha = u32::from(dst[3]) * (255 - src_alpha) / 255;
    let out_alpha = src_alpha + dst_alpha;
    for channel in 0..3 {
        let value = (u32::from(src[channel]) * src_alpha + u32::from(dst[channel]) * dst_alpha)
            / out_alpha;
        dst[channel] = value as u8;
    }
    dst[3] = out_alpha as u8;
}
