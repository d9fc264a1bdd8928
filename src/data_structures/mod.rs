//! Engine data structures: parts, material configuration and decoded textures.
//!
//! - `part` holds mesh node descriptors, part identity and classification results
//! - `material` holds the per-part texture configuration and its field patches
//! - `texture` holds decoded texture handles shared through the texture cache

pub mod material;
pub mod part;
pub mod texture;
