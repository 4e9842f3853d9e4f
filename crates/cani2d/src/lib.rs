//! Skeletal animation of textured 2D meshes
//!
//! A model is a flat textured mesh bound to a bone hierarchy. Keyframed
//! rotation curves drive the bones, linear blend skinning deforms the mesh,
//! and every triangle is drawn from its own pre-cut texture tile through an
//! affine transform onto any [`DrawingSurface`](surface::DrawingSurface).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cani2d::{AnimationInstance, Canvas, Mesh, MeshOptions, ModelDocument};
//!
//! let geometry = ModelDocument::from_path("dragon.json")?.into_geometry();
//! let texture = image::open("dragon.png")?.to_rgba8();
//! let mesh = Arc::new(Mesh::new(geometry, &texture, &MeshOptions::default())?);
//!
//! let mut instance = AnimationInstance::new(mesh);
//! instance.play_animation("fly");
//!
//! let mut canvas = Canvas::new(512, 512);
//! while instance.advance(1000.0 / 60.0) {
//!     instance.draw(&mut canvas);
//! #   break;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animation;
pub mod atlas;
pub mod error;
pub mod format;
pub mod instance;
pub mod math;
pub mod mesh;
pub mod raster;
pub mod skeleton;
pub mod skinning;
pub mod surface;
pub mod version;

// Re-export common types
pub use error::{Cani2dError, Result, StructuralError};
pub use format::ModelDocument;
pub use instance::AnimationInstance;
pub use mesh::{Geometry, Mesh, MeshOptions};
pub use raster::Canvas;
pub use surface::DrawingSurface;
pub use version::{CURRENT_FORMAT_VERSION, FormatVersion};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
