//! Per-triangle texture tiles
//!
//! Every render triangle owns a small image cut from the source texture.
//! The tile covers the triangle's UV bounding box grown by an overdraw
//! margin, and the texture inside it is clipped to a slightly enlarged copy
//! of the triangle so neighbouring triangles overlap instead of leaving
//! seams.

use image::RgbaImage;

use crate::math::{Affine2, Vec2};
use crate::raster::Canvas;
use crate::surface::DrawingSurface;

/// Cropped texture patch for one triangle
#[derive(Debug, Clone)]
pub struct TextureTile {
    image: RgbaImage,
    /// UV position of the tile's top-left corner
    offset: Vec2,
    /// UV extents matching the tile's pixel size exactly
    size: Vec2,
    /// Triangle corners in UV units, relative to `offset`
    uv: [Vec2; 3],
}

impl TextureTile {
    /// Get the tile pixels
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Get tile width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Get tile height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Get the UV position of the tile origin in the source texture
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Get the tile extents in UV units
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Get the unexpanded triangle corners relative to the tile origin
    pub fn uv(&self) -> [Vec2; 3] {
        self.uv
    }
}

/// Push the endpoints of each triangle edge apart by `overdraw` pixels
///
/// Works on UV corners of a `texture_size` texture. Each corner moves by the
/// combined push of its two edges. Zero-length edges are left alone.
pub fn expand_edges(corners: [Vec2; 3], texture_size: Vec2, overdraw: f32) -> [Vec2; 3] {
    let mut expanded = corners;
    for (a, b) in [(0, 1), (1, 2), (2, 0)] {
        let edge = (expanded[b] - expanded[a]) * texture_size;
        let Some(direction) = edge.try_normalize() else {
            continue;
        };
        let push = direction * overdraw / texture_size;
        expanded[b] += push;
        expanded[a] -= push;
    }
    expanded
}

/// Cut the tile for a triangle out of `texture`
///
/// `overdraw` is the margin in texture pixels. The tile is limited to the
/// texture plus that margin, however far the corners reach. An empty
/// texture produces an empty tile.
pub fn build_tile(texture: &RgbaImage, corners: [Vec2; 3], overdraw: f32) -> TextureTile {
    let (width, height) = texture.dimensions();
    if width == 0 || height == 0 {
        return TextureTile {
            image: RgbaImage::new(0, 0),
            offset: Vec2::ZERO,
            size: Vec2::ZERO,
            uv: corners,
        };
    }
    let texture_size = Vec2::new(width as f32, height as f32);

    let (min, max) = corners
        .iter()
        .fold((corners[0], corners[0]), |(min, max), c| (min.min(*c), max.max(*c)));
    // Texture outside the image is transparent, so the box never needs to
    // reach past the texture plus its margin
    let margin = Vec2::splat(overdraw.max(0.0)).min(texture_size) / texture_size;
    let (lower, upper) = (-margin, Vec2::ONE + margin);
    let min = (min - margin).max(lower).min(upper);
    let max = (max + margin).max(lower).min(upper);

    let pixels = ((max - min) * texture_size).ceil();
    let tile_width = pixels.x.max(0.0) as u32;
    let tile_height = pixels.y.max(0.0) as u32;
    let size = Vec2::new(tile_width as f32, tile_height as f32) / texture_size;

    // Tile pixels are texture pixels shifted by the UV box origin
    let view = Affine2::from_scale(texture_size) * Affine2::from_translation(-min);
    let mut canvas = Canvas::new(tile_width, tile_height).with_view(view);
    canvas.save_state();
    canvas.clip_to_polygon(&expand_edges(corners, texture_size, overdraw));
    canvas.draw_transformed_image(texture, Vec2::ZERO, Vec2::ONE, &Affine2::IDENTITY);
    canvas.restore_state();

    TextureTile {
        image: canvas.into_image(),
        offset: min,
        size,
        uv: corners.map(|c| c - min),
    }
}
