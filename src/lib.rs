//! swatch-ngin
//!
//! Material binding and scene composition for configurable 3D products. The
//! engine decides which mesh parts of a loaded model can be customized, keeps
//! the texture configuration of each part, loads and deduplicates the
//! textures, derives renderer-ready material parameters and captures a
//! multi-angle composite of the result. Drawing itself is left to an external
//! renderer behind [`render::SceneRenderer`].
//!
//! High-level modules
//! - `camera`: camera pose and projection snapshots
//! - `compositor`: multi-pose capture and aspect-preserving layout
//! - `config`: every tunable of the engine in one place
//! - `data_structures`: parts, texture configuration and decoded textures
//! - `engine`: the orchestrator a host drives from its frame loop
//! - `glow`: transient selection highlight
//! - `library`: per-category texture libraries and uploads
//! - `material`: the material store and its derived render view
//! - `registry`: keyword based part classification
//! - `render`: the renderer seam
//! - `resources`: texture sources, texture cache and scene node extraction
//! - `transform`: texture configuration to renderer parameters
//!

pub mod camera;
pub mod compositor;
pub mod config;
pub mod data_structures;
pub mod engine;
pub mod error;
pub mod glow;
pub mod library;
pub mod material;
pub mod registry;
pub mod render;
pub mod resources;
pub mod transform;

// Re-exports commonly used types for convenience in downstream code.
pub use config::EngineConfig;
pub use data_structures::material::{TextureConfig, TextureParam, Tint};
pub use data_structures::part::{Capability, Category, MeshNode, Part, PartId, SelectionEvent};
pub use engine::Engine;
pub use error::BindError;

/// Install `env_logger` with an `info` default, overridable through `RUST_LOG`.
///
/// Calling it more than once is harmless.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
