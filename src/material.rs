//! Material state of the loaded scene.
//!
//! [`MaterialStore`] is the only owner of per-part [`TextureConfig`]s and is
//! mutated exclusively through [`MaterialStore::apply`] and
//! [`MaterialStore::update`]. What the renderer sees is the derived
//! [`RenderConfig`], recomputed from the store and never written back.

use std::collections::BTreeMap;

use crate::data_structures::{
    material::{TextureConfig, TextureParam},
    part::PartId,
};

/// Maps the user-facing scale slider onto texture repeat counts:
/// `repeat = base + scale * multiplier`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderScale {
    pub base: f32,
    pub multiplier: f32,
}

impl Default for RenderScale {
    fn default() -> Self {
        Self {
            base: 3.0,
            multiplier: 1.4,
        }
    }
}

impl RenderScale {
    pub fn apply(&self, scale: f32) -> f32 {
        self.base + scale * self.multiplier
    }
}

/// Derived, display-ready copy of the material state.
pub type RenderConfig = BTreeMap<PartId, TextureConfig>;

#[derive(Debug, Default)]
pub struct MaterialStore {
    configs: BTreeMap<PartId, TextureConfig>,
    revision: u64,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, part: PartId) -> Option<&TextureConfig> {
        self.configs.get(&part)
    }

    /// Bind `url` to `part`, creating a default configuration on first use.
    ///
    /// Returns whether the state changed.
    pub fn apply(&mut self, part: PartId, url: &str) -> bool {
        match self.configs.get_mut(&part) {
            Some(config) if config.source_url.as_deref() == Some(url) => false,
            Some(config) => {
                config.source_url = Some(url.to_string());
                self.revision += 1;
                true
            }
            None => {
                self.configs.insert(part, TextureConfig::with_source(url));
                self.revision += 1;
                true
            }
        }
    }

    /// Patch one field of `part`'s configuration, creating a default
    /// configuration without a texture first if there is none.
    pub fn update(&mut self, part: PartId, param: TextureParam) {
        self.configs.entry(part).or_default().patch(param);
        self.revision += 1;
    }

    /// Drop the texture source but keep the remaining parameters.
    pub fn clear_source(&mut self, part: PartId) {
        if let Some(config) = self.configs.get_mut(&part) {
            if config.source_url.take().is_some() {
                self.revision += 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.configs.clear();
        self.revision += 1;
    }

    /// Changes every time the stored state changes. Derived views may be
    /// memoized against it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartId, &TextureConfig)> {
        self.configs.iter().map(|(id, config)| (*id, config))
    }

    pub fn derive(&self, scale: &RenderScale) -> RenderConfig {
        self.configs
            .iter()
            .map(|(id, config)| {
                let mut derived = config.clone();
                derived.scale = scale.apply(config.scale);
                (*id, derived)
            })
            .collect()
    }
}
