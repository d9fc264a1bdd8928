//! Part classification and click resolution.
//!
//! Whether a mesh node is customizable is decided purely from its name using
//! an ordered [`KeywordTable`]. The table is plain data so hosts can swap it
//! for a different product's naming convention.

use std::collections::HashMap;

use crate::data_structures::part::{Capability, Category, MeshNode, Part, PartId, SelectionEvent};

/// Ordered keyword to category mapping.
///
/// Matching is substring containment and the first matching keyword wins.
/// Names that contain several keywords are a naming-convention problem of
/// the model; [`KeywordTable::ambiguous_matches`] exposes them so hosts can
/// warn about it.
#[derive(Clone, Debug, PartialEq)]
pub struct KeywordTable {
    entries: Vec<(String, Category)>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new([
            ("Shape027", Category::Vamp),
            ("Line040", Category::Label),
            ("Shape026", Category::Shoelace),
        ])
    }
}

impl KeywordTable {
    pub fn new<K: Into<String>>(entries: impl IntoIterator<Item = (K, Category)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(keyword, category)| (keyword.into(), category))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, Category)] {
        &self.entries
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        if name.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(keyword, _)| name.contains(keyword.as_str()))
            .map(|(_, category)| *category)
    }

    pub fn classify(&self, name: &str) -> Capability {
        match self.category_of(name) {
            Some(_) => Capability::Interactive,
            None => Capability::Inert,
        }
    }

    /// All keywords contained in `name`, in table order.
    pub fn ambiguous_matches(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(keyword, _)| name.contains(keyword.as_str()))
            .map(|(keyword, _)| keyword.as_str())
            .collect()
    }
}

/// Parts of the currently loaded scene.
#[derive(Debug, Default)]
pub struct PartRegistry {
    table: KeywordTable,
    parts: HashMap<PartId, Part>,
}

impl PartRegistry {
    pub fn new(table: KeywordTable) -> Self {
        Self {
            table,
            parts: HashMap::new(),
        }
    }

    pub fn classify(&self, name: &str) -> Capability {
        self.table.classify(name)
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.table.category_of(name)
    }

    /// Drop every part of the previous scene and register the new nodes.
    pub fn load_scene(&mut self, nodes: &[MeshNode]) {
        self.parts.clear();
        for node in nodes {
            self.part_for(node);
        }
        let interactive = self.parts.values().filter(|p| p.is_interactive()).count();
        log::info!(
            "Loaded scene with {} parts ({} interactive)",
            self.parts.len(),
            interactive
        );
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.get(&id)
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Look up the part for `node`, creating it on first sight.
    pub fn part_for(&mut self, node: &MeshNode) -> &Part {
        let table = &self.table;
        self.parts.entry(PartId(node.handle)).or_insert_with(|| {
            let matches = table.ambiguous_matches(&node.name);
            if matches.len() > 1 {
                log::warn!(
                    "Mesh {:?} matches several keywords {:?}; using {:?}",
                    node.name,
                    matches,
                    matches[0]
                );
            }
            let category = table.category_of(&node.name);
            Part {
                id: PartId(node.handle),
                name: node.name.clone(),
                material_name: node.material_name.clone(),
                capability: if category.is_some() {
                    Capability::Interactive
                } else {
                    Capability::Inert
                },
                category,
            }
        })
    }

    /// Resolve a click on `node` into a selection event.
    ///
    /// Starting the glow for the selected part is left to the caller, which
    /// owns the animator.
    pub fn resolve_click(&mut self, node: &MeshNode) -> SelectionEvent {
        let part = self.part_for(node);
        if part.is_interactive() {
            SelectionEvent::Select(part.clone())
        } else {
            SelectionEvent::Deselect
        }
    }
}
