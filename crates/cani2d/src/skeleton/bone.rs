//! Static bone topology

use crate::error::{Result, StructuralError};
use crate::math::Vec2;
use std::collections::HashMap;

/// Bone description used to build a [`Skeleton`]
#[derive(Debug, Clone, PartialEq)]
pub struct BoneDef {
    /// Bone name, unique within the skeleton
    pub name: String,
    /// Parent bone index (`None` for root bones)
    pub parent: Option<usize>,
    /// Rest head position, relative to the parent head (global for roots)
    pub head: Vec2,
}

impl BoneDef {
    /// Create a root bone with a global head position
    pub fn root(name: impl Into<String>, head: Vec2) -> Self {
        Self {
            name: name.into(),
            parent: None,
            head,
        }
    }

    /// Create a child bone with a head position relative to its parent
    pub fn child(name: impl Into<String>, parent: usize, head: Vec2) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            head,
        }
    }
}

/// Rest configuration of one bone
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Bone index within the skeleton
    pub index: usize,
    /// Bone name
    pub name: String,
    /// Parent bone index (`None` for root bones)
    pub parent: Option<usize>,
    /// Rest head position relative to the parent head
    pub local_head: Vec2,
    /// Rest head position in mesh space
    pub head: Vec2,
    /// Child bone indices, in definition order
    pub children: Vec<usize>,
}

impl Bone {
    /// Check if this bone has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Bone hierarchy stored as a flat, parent-indexed array
///
/// Every parent index is smaller than the index of the bone referring to it,
/// so the hierarchy is acyclic by construction and walking parent links
/// always terminates at a root.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    roots: Vec<usize>,
    names: HashMap<String, usize>,
}

impl Skeleton {
    /// Build a skeleton from bone definitions
    ///
    /// Fails when a bone is its own parent, names a parent that does not
    /// precede it, or reuses another bone's name.
    pub fn new(defs: Vec<BoneDef>) -> Result<Self> {
        let mut bones: Vec<Bone> = Vec::with_capacity(defs.len());
        let mut roots = Vec::new();
        let mut names = HashMap::with_capacity(defs.len());

        for (index, def) in defs.into_iter().enumerate() {
            let head = match def.parent {
                Some(parent) if parent == index => {
                    return Err(StructuralError::SelfParent { bone: index }.into());
                }
                Some(parent) if parent > index => {
                    return Err(StructuralError::ForwardParent {
                        bone: index,
                        parent,
                    }
                    .into());
                }
                Some(parent) => {
                    bones[parent].children.push(index);
                    bones[parent].head + def.head
                }
                None => {
                    roots.push(index);
                    def.head
                }
            };

            if names.insert(def.name.clone(), index).is_some() {
                return Err(StructuralError::DuplicateBoneName(def.name).into());
            }

            bones.push(Bone {
                index,
                name: def.name,
                parent: def.parent,
                local_head: def.head,
                head,
                children: Vec::new(),
            });
        }

        Ok(Self {
            bones,
            roots,
            names,
        })
    }

    /// Create a skeleton without bones
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get number of bones
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Check if the skeleton has no bones
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Get all bones in index order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Get a bone by index
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Get indices of bones without a parent
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Find a bone index by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Get the depth of a bone (0 for roots)
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.bones.get(index).and_then(|b| b.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.bones[parent].parent;
        }
        depth
    }
}
