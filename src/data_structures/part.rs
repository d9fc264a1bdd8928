//! Parts: the addressable mesh regions of a loaded product model.
//!
//! The external scene loader hands over [`MeshNode`] descriptors. The engine
//! never writes back into them; everything it needs to remember about a node
//! lives in side tables keyed by [`PartId`].

use std::fmt;

/// Stable identifier of a part within the currently loaded scene.
///
/// Derived from the loader's node handle so that repeated clicks on the same
/// node always resolve to the same part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part#{}", self.0)
    }
}

/// Read-only mesh node descriptor as produced by the scene loader.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshNode {
    pub handle: u32,
    pub name: String,
    pub material_name: String,
}

impl MeshNode {
    pub fn new(handle: u32, name: impl Into<String>, material_name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            material_name: material_name.into(),
        }
    }
}

/// Whether a part can be customized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Interactive,
    Inert,
}

/// Customization group of an interactive part. Selects the texture library
/// and control section the host shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Vamp,
    Shoelace,
    Label,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Vamp, Category::Shoelace, Category::Label];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Vamp => "vamp",
            Category::Shoelace => "shoelace",
            Category::Label => "label",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub material_name: String,
    pub capability: Capability,
    pub category: Option<Category>,
}

impl Part {
    pub fn is_interactive(&self) -> bool {
        self.capability == Capability::Interactive
    }
}

/// Emitted to the host UI whenever a click resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionEvent {
    Select(Part),
    Deselect,
}
