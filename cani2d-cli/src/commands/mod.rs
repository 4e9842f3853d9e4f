//! Command implementations and the options they share

pub mod frames;
pub mod info;
pub mod render;

use anyhow::{Context, Result, bail};
use cani2d::math::{Affine2, Vec2};
use cani2d::{AnimationInstance, Mesh, MeshOptions, ModelDocument};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Model and texture inputs
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Path to the model JSON file
    pub model: PathBuf,

    /// Path to the texture image
    pub texture: PathBuf,

    /// Texture tile margin in pixels
    #[arg(long, default_value_t = 1.0)]
    pub overdraw: f32,
}

/// Output image placement
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Output width in pixels (fits the model when omitted)
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels (fits the model when omitted)
    #[arg(long)]
    pub height: Option<u32>,

    /// Model units to pixels
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Pixel position of the model origin, as X,Y
    #[arg(long, value_parser = parse_point)]
    pub origin: Option<Vec2>,

    /// Empty border around a fitted model, in pixels
    #[arg(long, default_value_t = 4)]
    pub padding: u32,
}

impl ViewArgs {
    /// Work out output size and view transform for content within `bounds`
    pub fn resolve(&self, bounds: Option<(Vec2, Vec2)>) -> Result<(u32, u32, Affine2)> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            bail!("Scale must be a positive number, got {}", self.scale);
        }

        let padding = self.padding as f32;
        let (min, max) = bounds.unwrap_or((Vec2::ZERO, Vec2::ZERO));
        let origin = self
            .origin
            .unwrap_or_else(|| Vec2::splat(padding) - min * self.scale);
        let fitted = ((max - min) * self.scale + 2.0 * padding).ceil().max(Vec2::ONE);

        let width = self.width.unwrap_or(fitted.x as u32);
        let height = self.height.unwrap_or(fitted.y as u32);
        if width == 0 || height == 0 {
            bail!("Output size must be non-zero, got {width}x{height}");
        }

        let view = Affine2::from_translation(origin) * Affine2::from_scale(Vec2::splat(self.scale));
        Ok((width, height, view))
    }
}

/// Parse an `X,Y` pair
pub fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let x = x
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid X '{x}': {e}"))?;
    let y = y
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid Y '{y}': {e}"))?;
    Ok(Vec2::new(x, y))
}

/// Load a model document
pub fn load_document(path: &Path) -> Result<ModelDocument> {
    ModelDocument::from_path(path)
        .with_context(|| format!("Failed to load model: {}", path.display()))
}

/// Load model and texture into a shareable mesh
pub fn load_mesh(source: &SourceArgs) -> Result<Arc<Mesh>> {
    let geometry = load_document(&source.model)?.into_geometry();

    let texture = image::open(&source.texture)
        .with_context(|| format!("Failed to open texture: {}", source.texture.display()))?
        .to_rgba8();
    log::info!(
        "Loaded texture {} ({}x{})",
        source.texture.display(),
        texture.width(),
        texture.height()
    );

    let options = MeshOptions {
        overdraw: source.overdraw,
        ..MeshOptions::default()
    };
    let mesh = Mesh::new(geometry, &texture, &options)
        .with_context(|| format!("Failed to build mesh from {}", source.model.display()))?;
    Ok(Arc::new(mesh))
}

/// Select a clip by name, listing the available ones on failure
pub fn select_animation(instance: &mut AnimationInstance, name: &str) -> Result<()> {
    if instance.select_animation(name) {
        return Ok(());
    }
    let available: Vec<&str> = instance
        .mesh()
        .animations()
        .iter()
        .map(|clip| clip.name.as_str())
        .collect();
    bail!(
        "Animation '{}' not found (available: {})",
        name,
        if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        }
    )
}

/// Axis-aligned bounds of a point set
pub fn bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
    )
}

/// Merge two optional bounds
pub fn union(a: Option<(Vec2, Vec2)>, b: Option<(Vec2, Vec2)>) -> Option<(Vec2, Vec2)> {
    match (a, b) {
        (Some((min_a, max_a)), Some((min_b, max_b))) => Some((min_a.min(min_b), max_a.max(max_b))),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Bounds of the deformed mesh over every whole frame of a clip
pub fn clip_bounds(mesh: &Arc<Mesh>, name: &str) -> Result<Option<(Vec2, Vec2)>> {
    let mut instance = AnimationInstance::new(Arc::clone(mesh));
    select_animation(&mut instance, name)?;

    let length = instance.clip().map_or(0.0, |clip| clip.length.max(0.0));
    let mut result = None;
    for frame in 0..=(length.ceil() as u32) {
        instance.set_frame((frame as f32).min(length));
        result = union(result, bounds(instance.vertices()));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(width: Option<u32>, scale: f32, origin: Option<Vec2>) -> ViewArgs {
        ViewArgs {
            width,
            height: None,
            scale,
            origin,
            padding: 2,
        }
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("3,-4.5"), Ok(Vec2::new(3.0, -4.5)));
        assert_eq!(parse_point(" 1 , 2 "), Ok(Vec2::new(1.0, 2.0)));
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_resolve_fits_bounds() {
        let bounds = Some((Vec2::new(-10.0, 5.0), Vec2::new(30.0, 25.0)));
        let (width, height, view) = view(None, 2.0, None).resolve(bounds).unwrap();

        assert_eq!((width, height), (84, 44));
        assert_eq!(view.transform_point2(Vec2::new(-10.0, 5.0)), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_resolve_explicit_values() {
        let (width, _, view) = view(Some(100), 1.0, Some(Vec2::new(50.0, 50.0)))
            .resolve(None)
            .unwrap();
        assert_eq!(width, 100);
        assert_eq!(view.transform_point2(Vec2::ZERO), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_resolve_rejects_bad_scale() {
        assert!(view(None, 0.0, None).resolve(None).is_err());
        assert!(view(None, f32::NAN, None).resolve(None).is_err());
    }

    #[test]
    fn test_bounds_union() {
        let a = bounds(&[Vec2::new(1.0, 2.0), Vec2::new(-1.0, 5.0)]);
        let b = bounds(&[Vec2::new(4.0, 0.0)]);
        assert_eq!(union(a, b), Some((Vec2::new(-1.0, 0.0), Vec2::new(4.0, 5.0))));
        assert_eq!(bounds(&[]), None);
    }
}
