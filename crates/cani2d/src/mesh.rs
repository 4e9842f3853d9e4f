//! Mesh construction and rest geometry
//!
//! A [`Mesh`] is built once from parsed [`Geometry`] and a texture. It owns
//! the immutable pieces every animation instance shares: rest vertices, the
//! skeleton, normalized skin weights, animation clips and the z-sorted list
//! of render triangles with their texture tiles.

use image::RgbaImage;

use crate::animation::AnimationClip;
use crate::atlas::{TextureTile, build_tile};
use crate::error::{Result, StructuralError};
use crate::math::Vec2;
use crate::skeleton::{BoneDef, Skeleton};
use crate::skinning::{SkinWeights, SkinningOptions, VertexInfluence};
use crate::surface::{DEGENERATE_EPSILON, DrawingSurface, draw_triangle};
use crate::version::{CURRENT_FORMAT_VERSION, FormatVersion};

/// Corner patterns for splitting a face into triangles
const TRIANGLE_PATTERN: &[[usize; 3]] = &[[0, 1, 2]];
const QUAD_PATTERN: &[[usize; 3]] = &[[0, 1, 2], [2, 3, 0]];

/// A polygon of the input geometry
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDef {
    /// Draw order key, lower draws first
    pub z: f32,
    /// Vertex indices of the corners
    pub vertices: Vec<usize>,
}

impl FaceDef {
    /// Create a face
    pub fn new(z: f32, vertices: Vec<usize>) -> Self {
        Self { z, vertices }
    }
}

/// Parsed geometry, skeleton and animation data
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Version of the tool that produced the data
    pub exporter_version: Option<FormatVersion>,
    /// Rest positions
    pub vertices: Vec<Vec2>,
    /// One texture coordinate per face corner, in face order
    pub uv: Vec<Vec2>,
    /// Triangles and quads
    pub faces: Vec<FaceDef>,
    /// Bone influences per vertex
    pub influences: Vec<VertexInfluence>,
    /// Bones, parents first
    pub bones: Vec<BoneDef>,
    /// Animation clips
    pub animations: Vec<AnimationClip>,
}

/// Mesh construction options
#[derive(Debug, Clone)]
pub struct MeshOptions {
    /// Tile margin in texture pixels
    pub overdraw: f32,
    /// Exporter versions the loader understands
    pub supported_versions: Vec<FormatVersion>,
    /// Weight normalization settings
    pub skinning: SkinningOptions,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            overdraw: 1.0,
            supported_versions: vec![CURRENT_FORMAT_VERSION],
            skinning: SkinningOptions::default(),
        }
    }
}

/// Render primitive with its texture tile
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertex indices of the corners
    pub vertices: [usize; 3],
    /// Draw order key inherited from the face
    pub z: f32,
    /// Index of the source face
    pub face: usize,
    /// Texture patch drawn onto the triangle
    pub tile: TextureTile,
}

/// Textured, skinned mesh shared by animation instances
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vec2>,
    triangles: Vec<Triangle>,
    skeleton: Skeleton,
    weights: SkinWeights,
    animations: Vec<AnimationClip>,
    exporter_version: Option<FormatVersion>,
    version_compatible: bool,
    skipped_faces: usize,
}

impl Mesh {
    /// Build a mesh from geometry and its texture
    ///
    /// Skeleton problems are fatal. Faces that cannot be drawn are skipped
    /// with a warning, as are influences on unknown bones. A version outside
    /// `options.supported_versions` only produces a warning.
    pub fn new(geometry: Geometry, texture: &RgbaImage, options: &MeshOptions) -> Result<Self> {
        let Geometry {
            exporter_version,
            vertices,
            uv,
            faces,
            mut influences,
            bones,
            animations,
        } = geometry;

        let skeleton = Skeleton::new(bones)?;

        let version_compatible = match exporter_version {
            Some(version) if version.is_supported_by(&options.supported_versions) => true,
            Some(version) => {
                log::warn!(
                    "Model was exported with version {}, supported versions are {}",
                    version,
                    join_versions(&options.supported_versions)
                );
                false
            }
            None => {
                log::warn!("Model has no exporter version, assuming a compatible layout");
                false
            }
        };

        let mut triangles = Vec::with_capacity(faces.len() * 2);
        let mut skipped_faces = 0;
        let mut uv_index = 0;

        for (face_index, face) in faces.iter().enumerate() {
            let corners = face.vertices.len();
            let first_uv = uv_index;
            // Texture coordinates are laid out per corner even for skipped faces
            uv_index += corners;

            let pattern = match corners {
                3 => TRIANGLE_PATTERN,
                4 => QUAD_PATTERN,
                _ => {
                    log::warn!(
                        "{}",
                        StructuralError::UnsupportedPolygon {
                            face: face_index,
                            corners,
                        }
                    );
                    skipped_faces += 1;
                    continue;
                }
            };

            if let Some(&vertex) = face.vertices.iter().find(|&&v| v >= vertices.len()) {
                log::warn!(
                    "{}",
                    StructuralError::VertexOutOfRange {
                        face: face_index,
                        vertex,
                        count: vertices.len(),
                    }
                );
                skipped_faces += 1;
                continue;
            }

            if uv_index > uv.len() {
                log::warn!(
                    "{}",
                    StructuralError::UvOutOfRange {
                        face: face_index,
                        uv: uv_index - 1,
                        count: uv.len(),
                    }
                );
                skipped_faces += 1;
                continue;
            }

            if !uv[first_uv..uv_index].iter().all(|c| c.is_finite()) {
                log::warn!("{}", StructuralError::NonFiniteUv { face: face_index });
                skipped_faces += 1;
                continue;
            }

            for split in pattern {
                let corner_uv = split.map(|corner| uv[first_uv + corner]);
                if uv_area(corner_uv) < DEGENERATE_EPSILON {
                    log::warn!("{}", StructuralError::DegenerateUv { face: face_index });
                    continue;
                }

                triangles.push(Triangle {
                    vertices: split.map(|corner| face.vertices[corner]),
                    z: face.z,
                    face: face_index,
                    tile: build_tile(texture, corner_uv, options.overdraw),
                });
            }
        }

        // Stable, so equal keys keep face order
        triangles.sort_by(|a, b| a.z.total_cmp(&b.z));

        influences.resize_with(vertices.len(), VertexInfluence::default);
        let weights = SkinWeights::normalize(influences, skeleton.len(), &options.skinning);

        log::debug!(
            "Built mesh: {} vertices, {} triangles from {} faces ({} skipped), {} bones, {} animations",
            vertices.len(),
            triangles.len(),
            faces.len(),
            skipped_faces,
            skeleton.len(),
            animations.len()
        );

        Ok(Self {
            vertices,
            triangles,
            skeleton,
            weights,
            animations,
            exporter_version,
            version_compatible,
            skipped_faces,
        })
    }

    /// Get rest vertex positions
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Get triangles in draw order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn weights(&self) -> &SkinWeights {
        &self.weights
    }

    pub fn animations(&self) -> &[AnimationClip] {
        &self.animations
    }

    /// Find an animation clip index by name
    pub fn find_animation(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|clip| clip.name == name)
    }

    /// Get the exporter version recorded in the geometry
    pub fn exporter_version(&self) -> Option<FormatVersion> {
        self.exporter_version
    }

    /// Check if the exporter version is in the supported set
    pub fn is_version_compatible(&self) -> bool {
        self.version_compatible
    }

    /// Get the number of malformed input faces that were dropped
    pub fn skipped_faces(&self) -> usize {
        self.skipped_faces
    }

    /// Draw every triangle at the given vertex positions, in z order
    ///
    /// Returns the number of triangles drawn. Triangles referring past the end
    /// of `vertices` are skipped.
    pub fn draw(&self, surface: &mut dyn DrawingSurface, vertices: &[Vec2]) -> usize {
        let mut drawn = 0;
        for triangle in &self.triangles {
            let [a, b, c] = triangle.vertices;
            let (Some(&a), Some(&b), Some(&c)) = (vertices.get(a), vertices.get(b), vertices.get(c))
            else {
                continue;
            };
            if draw_triangle(&triangle.tile, [a, b, c], surface) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Draw the mesh in its rest pose
    pub fn draw_rest(&self, surface: &mut dyn DrawingSurface) -> usize {
        self.draw(surface, &self.vertices)
    }
}

/// Twice the UV triangle area, in f64
fn uv_area(uv: [Vec2; 3]) -> f64 {
    let [a, b, c] = uv.map(|p| (f64::from(p.x), f64::from(p.y)));
    ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs()
}

fn join_versions(versions: &[FormatVersion]) -> String {
    if versions.is_empty() {
        return "none".to_string();
    }
    versions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
