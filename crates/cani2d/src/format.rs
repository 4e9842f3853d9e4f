//! Exported model document
//!
//! Models are stored as a single JSON document:
//!
//! ```json
//! {
//!   "exporter_version": [0, 0, 1],
//!   "faces": [{"z": 0.0, "vertices": [0, 1, 2]}],
//!   "vertices": [0.0, 0.0, 10.0, 0.0, 0.0, 10.0],
//!   "uv": [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
//!   "vertex_groups": {"root": [[0, 1.0], [1, 1.0], [2, 1.0]]},
//!   "bones": [{"name": "root", "head": [0.0, 0.0], "children": []}],
//!   "animations": {
//!     "wave": {"length": 24, "curves": {"root": [
//!       {"type": ["q", 3], "keys": [[1, 0.0, [0.5, 0.0], [4, 0.0]]]}
//!     ]}}
//!   }
//! }
//! ```
//!
//! Vertex and UV arrays are flat coordinate pairs, with one UV pair per face
//! corner in face order. Root bone heads are in mesh space, child heads are
//! relative to their parent. Key handles are absolute `(frame, value)`
//! points. Vertex groups and curves are keyed by bone name.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationClip, BoneCurve, Curve, CurveTarget, Keyframe, QuatAxis};
use crate::error::{Result, StructuralError};
use crate::math::Vec2;
use crate::mesh::{FaceDef, Geometry};
use crate::skeleton::BoneDef;
use crate::skinning::VertexInfluence;
use crate::version::FormatVersion;

/// Curve kind for quaternion rotation channels
pub const ROTATION_CURVE: &str = "q";

/// Keyframe as stored: frame, value, left handle, right handle
pub type KeyDocument = (f32, f32, [f32; 2], [f32; 2]);

/// Top-level model document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub exporter_version: Option<FormatVersion>,
    #[serde(default)]
    pub faces: Vec<FaceDocument>,
    /// Flat x, y pairs
    #[serde(default)]
    pub vertices: Vec<f32>,
    /// Flat u, v pairs, one per face corner
    #[serde(default)]
    pub uv: Vec<f32>,
    /// Bone name to (vertex, weight) pairs
    #[serde(default)]
    pub vertex_groups: BTreeMap<String, Vec<(usize, f32)>>,
    /// Root bones with nested children
    #[serde(default)]
    pub bones: Vec<BoneDocument>,
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDocument {
    pub z: f32,
    pub vertices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDocument {
    pub name: String,
    pub head: [f32; 2],
    #[serde(default)]
    pub children: Vec<BoneDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDocument {
    /// Clip length in frames
    pub length: f32,
    /// Bone name to curves
    #[serde(default)]
    pub curves: BTreeMap<String, Vec<CurveDocument>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDocument {
    /// Channel kind and component index
    #[serde(rename = "type")]
    pub kind: (String, usize),
    #[serde(default)]
    pub keys: Vec<KeyDocument>,
}

impl ModelDocument {
    /// Parse a document from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a document from a file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a document from a string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Count vertices in the flat coordinate array
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Count bones in every nesting level
    pub fn bone_count(&self) -> usize {
        fn count(bones: &[BoneDocument]) -> usize {
            bones.iter().map(|b| 1 + count(&b.children)).sum()
        }
        count(&self.bones)
    }

    /// Convert into geometry ready for mesh construction
    ///
    /// Bones are flattened depth-first so every parent precedes its children.
    /// Vertex groups and curves naming unknown bones are dropped with a
    /// warning, as are group entries for vertices that do not exist.
    pub fn into_geometry(self) -> Geometry {
        let Self {
            exporter_version,
            faces,
            vertices,
            uv,
            vertex_groups,
            bones: bone_documents,
            animations: animation_documents,
        } = self;

        let vertices = pairs(&vertices, "vertices");
        let uv = pairs(&uv, "uv");

        let faces = faces
            .into_iter()
            .map(|face| FaceDef::new(face.z, face.vertices))
            .collect();

        let mut bones = Vec::new();
        for root in bone_documents {
            flatten_bone(root, None, &mut bones);
        }
        // First bone wins on duplicate names; the skeleton rejects those later
        let mut bone_names: HashMap<&str, usize> = HashMap::with_capacity(bones.len());
        for (index, bone) in bones.iter().enumerate() {
            bone_names.entry(bone.name.as_str()).or_insert(index);
        }
        let bone_index = |name: &str| bone_names.get(name).copied();

        let mut influences = vec![VertexInfluence::default(); vertices.len()];
        for (name, group) in vertex_groups {
            let Some(bone) = bone_index(&name) else {
                log::warn!("Vertex group: {}", StructuralError::UnknownBone(name));
                continue;
            };
            for (vertex, weight) in group {
                match influences.get_mut(vertex) {
                    Some(influence) => influence.push(bone, weight),
                    None => log::warn!(
                        "Vertex group '{}' references vertex {}, mesh has {} vertices",
                        name,
                        vertex,
                        vertices.len()
                    ),
                }
            }
        }

        let animations = animation_documents
            .into_iter()
            .map(|(name, animation)| {
                let mut curves = Vec::new();
                for (bone_name, documents) in animation.curves {
                    let Some(bone) = bone_index(&bone_name) else {
                        log::warn!(
                            "Animation '{}': {}",
                            name,
                            StructuralError::UnknownBone(bone_name)
                        );
                        continue;
                    };
                    curves.extend(
                        documents
                            .into_iter()
                            .map(|document| BoneCurve {
                                bone,
                                curve: document.into_curve(),
                            }),
                    );
                }
                AnimationClip::new(name, animation.length, curves)
            })
            .collect();

        Geometry {
            exporter_version,
            vertices,
            uv,
            faces,
            influences,
            bones,
            animations,
        }
    }
}

impl CurveDocument {
    /// Convert into a curve with handle offsets
    pub fn into_curve(self) -> Curve {
        let (kind, index) = self.kind;
        let target = match QuatAxis::from_array_index(index) {
            Some(axis) if kind == ROTATION_CURVE => CurveTarget::Rotation(axis),
            _ => CurveTarget::Other { kind, index },
        };

        let keys = self
            .keys
            .into_iter()
            .map(|(time, value, left, right)| {
                Keyframe::from_absolute_handles(time, value, Vec2::from(left), Vec2::from(right))
            })
            .collect();

        Curve::new(target, keys)
    }
}

fn flatten_bone(document: BoneDocument, parent: Option<usize>, out: &mut Vec<BoneDef>) {
    let index = out.len();
    out.push(BoneDef {
        name: document.name,
        parent,
        head: Vec2::from(document.head),
    });
    for child in document.children {
        flatten_bone(child, Some(index), out);
    }
}

fn pairs(flat: &[f32], what: &str) -> Vec<Vec2> {
    let chunks = flat.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        log::warn!("Odd number of {what} coordinates, ignoring the last one");
    }
    chunks.map(|c| Vec2::new(c[0], c[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = r#"{
        "exporter_version": [0, 0, 1],
        "faces": [{"z": 0.5, "vertices": [0, 1, 2, 3]}],
        "vertices": [0, 0, 10, 0, 10, 10, 0, 10],
        "uv": [0, 0, 1, 0, 1, 1, 0, 1],
        "vertex_groups": {
            "hip": [[0, 1.0], [1, 0.5]],
            "arm": [[1, 0.5], [2, 1.0], [7, 1.0]],
            "ghost": [[3, 1.0]]
        },
        "bones": [
            {"name": "hip", "head": [5, 5], "children": [
                {"name": "arm", "head": [0, -3], "children": []}
            ]},
            {"name": "prop", "head": [1, 1], "children": []}
        ],
        "animations": {
            "wave": {"length": 24, "curves": {
                "arm": [
                    {"type": ["q", 0], "keys": [[0, 1, [-2, 1], [2, 1]], [12, 0.7, [10, 0.7], [14, 0.7]]]},
                    {"type": ["l", 1], "keys": [[0, 0, [0, 0], [0, 0]]]}
                ],
                "tail": [{"type": ["q", 3], "keys": []}]
            }}
        }
    }"#;

    #[test]
    fn test_parse_document() {
        let document = ModelDocument::from_json(DOCUMENT).unwrap();
        assert_eq!(document.exporter_version, Some(FormatVersion::new(0, 0, 1)));
        assert_eq!(document.vertex_count(), 4);
        assert_eq!(document.bone_count(), 3);
        assert_eq!(document.animations["wave"].curves["arm"][0].kind, ("q".to_string(), 0));
    }

    #[test]
    fn test_bones_flattened_depth_first() {
        let geometry = ModelDocument::from_json(DOCUMENT).unwrap().into_geometry();
        assert_eq!(
            geometry.bones,
            vec![
                BoneDef::root("hip", Vec2::new(5.0, 5.0)),
                BoneDef::child("arm", 0, Vec2::new(0.0, -3.0)),
                BoneDef::root("prop", Vec2::new(1.0, 1.0)),
            ]
        );
    }

    #[test]
    fn test_vertex_groups_become_influences() {
        let geometry = ModelDocument::from_json(DOCUMENT).unwrap().into_geometry();
        assert_eq!(geometry.influences.len(), 4);
        // Groups are visited by name: "arm" before "hip"
        assert_eq!(geometry.influences[1].bones, vec![1, 0]);
        assert_eq!(geometry.influences[1].weights, vec![0.5, 0.5]);
        // "ghost" names no bone
        assert!(geometry.influences[3].is_empty());
    }

    #[test]
    fn test_curves_converted() {
        let geometry = ModelDocument::from_json(DOCUMENT).unwrap().into_geometry();
        assert_eq!(geometry.animations.len(), 1);

        let clip = &geometry.animations[0];
        assert_eq!(clip.name, "wave");
        assert_eq!(clip.length, 24.0);
        // The "tail" curves are dropped, location curves are kept but inert
        assert_eq!(clip.curves().len(), 2);
        assert_eq!(clip.rotation_curve_count(), 1);

        let rotation = &clip.curves()[0];
        assert_eq!(rotation.bone, 1);
        assert_eq!(rotation.curve.target, CurveTarget::Rotation(QuatAxis::W));
        assert_eq!(rotation.curve.keys()[0].in_handle, Vec2::new(-2.0, 0.0));
        assert_eq!(rotation.curve.keys()[0].out_handle, Vec2::new(2.0, 0.0));
        assert_eq!(
            clip.curves()[1].curve.target,
            CurveTarget::Other {
                kind: "l".to_string(),
                index: 1
            }
        );
    }

    #[test]
    fn test_duplicate_bone_name_resolves_to_first() {
        let geometry = ModelDocument::from_json(
            r#"{"vertices": [0, 0],
                "vertex_groups": {"twin": [[0, 1.0]]},
                "bones": [
                    {"name": "twin", "head": [0, 0]},
                    {"name": "twin", "head": [1, 1]}
                ],
                "animations": {"nod": {"length": 1, "curves": {
                    "twin": [{"type": ["q", 3], "keys": [[0, 0.5, [0, 0.5], [0, 0.5]]]}]
                }}}}"#,
        )
        .unwrap()
        .into_geometry();

        assert_eq!(geometry.influences[0].bones, vec![0]);
        assert_eq!(geometry.animations[0].curves()[0].bone, 0);
    }

    #[test]
    fn test_empty_document() {
        let geometry = ModelDocument::from_json("{}").unwrap().into_geometry();
        assert!(geometry.vertices.is_empty());
        assert!(geometry.bones.is_empty());
        assert_eq!(geometry.exporter_version, None);
    }

    #[test]
    fn test_invalid_json_is_document_error() {
        let error = ModelDocument::from_json("{\"faces\": 3}").unwrap_err();
        assert!(matches!(error, crate::error::Cani2dError::Document(_)));
    }

    #[test]
    fn test_odd_coordinate_count_truncates() {
        let geometry = ModelDocument::from_json(r#"{"vertices": [1, 2, 3]}"#)
            .unwrap()
            .into_geometry();
        assert_eq!(geometry.vertices, vec![Vec2::new(1.0, 2.0)]);
    }
}
