//! Engine configuration.
//!
//! Every tunable lives in [`EngineConfig`]. Hosts start from
//! `EngineConfig::default()` and overwrite the fields they care about before
//! building the [`crate::engine::Engine`].

use crate::{
    camera::CameraPose,
    compositor::CompositeSettings,
    glow::GlowSettings,
    library::UploadLimits,
    material::RenderScale,
    registry::KeywordTable,
    resources::source::SourcePolicy,
};

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub sources: SourcePolicy,
    pub uploads: UploadLimits,
    pub keywords: KeywordTable,
    pub render_scale: RenderScale,
    pub glow: GlowSettings,
    /// Cutout threshold used for transparent or tinted materials.
    pub alpha_test: f32,
    pub composite: CompositeSettings,
    pub default_view: CameraPose,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sources: SourcePolicy::default(),
            uploads: UploadLimits::default(),
            keywords: KeywordTable::default(),
            render_scale: RenderScale::default(),
            glow: GlowSettings::default(),
            alpha_test: 0.05,
            composite: CompositeSettings::default(),
            default_view: CameraPose::default(),
        }
    }
}
