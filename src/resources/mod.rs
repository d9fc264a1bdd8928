//! Everything that pulls data from outside the engine.
//!
//! - `source` decides which texture URLs are allowed and fetches their bytes
//! - `texture` deduplicates decoded textures and binds them to parts
//! - `scene` turns a glTF document into mesh node descriptors

pub mod scene;
pub mod source;
pub mod texture;

pub use source::{HttpSource, RemoteSource, SourcePolicy};
pub use texture::{LoadOutcome, LoadResult, PendingLoad, Request, TextureCache};
