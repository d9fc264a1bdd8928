//! Mesh node descriptors from glTF documents.
//!
//! Only node names and material names are read; geometry stays with whatever
//! loader renders the model.

use anyhow::{Context, Result};

use crate::data_structures::part::MeshNode;

/// List every node of a `.gltf`/`.glb` document that carries a mesh.
///
/// Unnamed nodes fall back to their mesh's name. The material name is taken
/// from the first primitive; empty if it has none.
pub fn mesh_nodes_from_gltf(bytes: &[u8]) -> Result<Vec<MeshNode>> {
    let gltf = gltf::Gltf::from_slice(bytes).context("parsing glTF document")?;
    let nodes = gltf
        .nodes()
        .filter_map(|node| {
            let mesh = node.mesh()?;
            let name = node.name().or(mesh.name()).unwrap_or_default();
            let material_name = mesh
                .primitives()
                .next()
                .and_then(|primitive| primitive.material().name().map(str::to_string))
                .unwrap_or_default();
            Some(MeshNode::new(node.index() as u32, name, material_name))
        })
        .collect();
    Ok(nodes)
}
