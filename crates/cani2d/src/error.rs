use std::io;
use thiserror::Error;

/// Error types for mesh construction, model loading and rendering setup
#[derive(Error, Debug)]
pub enum Cani2dError {
    /// I/O Error while reading a model or texture
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The model document is not valid JSON or does not match the expected layout
    #[error("Model document error: {0}")]
    Document(#[from] serde_json::Error),

    /// Texture decoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Skeleton or geometry is malformed beyond recovery
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),
}

/// Malformed skeleton or geometry data
///
/// Skeleton problems are fatal and surface as [`Cani2dError::Structural`].
/// Face and influence problems are recovered by skipping the offending item;
/// they are only reported through `log::warn!` using the same text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A bone names itself as parent
    #[error("bone {bone} is its own parent")]
    SelfParent { bone: usize },

    /// A bone names a parent that is not stored before it
    #[error("bone {bone} references parent {parent} which does not precede it")]
    ForwardParent { bone: usize, parent: usize },

    /// Two bones share a name
    #[error("duplicate bone name '{0}'")]
    DuplicateBoneName(String),

    /// Data refers to a bone name the skeleton does not contain
    #[error("unknown bone '{0}'")]
    UnknownBone(String),

    /// A face with a corner count other than 3 or 4
    #[error("face {face} has {corners} corners, only triangles and quads are supported")]
    UnsupportedPolygon { face: usize, corners: usize },

    /// A face references a vertex past the end of the vertex array
    #[error("face {face} references vertex {vertex}, mesh has {count} vertices")]
    VertexOutOfRange {
        face: usize,
        vertex: usize,
        count: usize,
    },

    /// A face corner has no texture coordinate
    #[error("face {face} needs uv {uv}, geometry has {count} uv coordinates")]
    UvOutOfRange { face: usize, uv: usize, count: usize },

    /// A face corner has an infinite or NaN texture coordinate
    #[error("face {face} has a non-finite uv coordinate")]
    NonFiniteUv { face: usize },

    /// The texture coordinates of a triangle are collinear
    #[error("face {face} has a zero-area uv triangle")]
    DegenerateUv { face: usize },

    /// A vertex influence names a bone index past the end of the skeleton
    #[error("vertex {vertex} is influenced by bone {bone}, skeleton has {count} bones")]
    InfluenceOutOfRange {
        vertex: usize,
        bone: usize,
        count: usize,
    },
}

/// Result type using Cani2dError
pub type Result<T> = std::result::Result<T, Cani2dError>;
