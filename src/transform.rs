//! Mapping of texture configuration onto renderer material parameters.
//!
//! [`TransformApplier::apply`] is pure: the same configuration always yields
//! the same parameters. It is the last stop before the renderer, so every
//! numeric value is sanitized here no matter what the controls promised.

use std::sync::Arc;

use cgmath::{Matrix3, Rad, Vector2, Vector3};

use crate::data_structures::{
    material::{TextureConfig, Tint},
    texture::{AddressMode, LoadedTexture},
};

/// Which texture map the renderer should sample for a part.
#[derive(Clone, Debug, Default)]
pub enum MapSource {
    /// Keep whatever map the model's own material has.
    #[default]
    Original,
    Texture(Arc<LoadedTexture>),
    /// No map at all; only colour and PBR values.
    Cleared,
}

impl PartialEq for MapSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MapSource::Original, MapSource::Original) => true,
            (MapSource::Cleared, MapSource::Cleared) => true,
            (MapSource::Texture(a), MapSource::Texture(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Texture coordinate transform, rotating around `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvTransform {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub repeat: Vector2<f32>,
    pub offset: Vector2<f32>,
    pub rotation: Rad<f32>,
    pub center: Vector2<f32>,
}

impl UvTransform {
    /// Homogeneous matrix applied to `(u, v, 1)`:
    /// translate by the offset, scale by repeat and rotate, both around the center.
    pub fn matrix(&self) -> Matrix3<f32> {
        let (s, c) = self.rotation.0.sin_cos();
        let Vector2 { x: sx, y: sy } = self.repeat;
        let Vector2 { x: cx, y: cy } = self.center;
        let Vector2 { x: tx, y: ty } = self.offset;
        // cgmath takes columns
        Matrix3::from_cols(
            Vector3::new(sx * c, -sy * s, 0.0),
            Vector3::new(sx * s, sy * c, 0.0),
            Vector3::new(
                -sx * (c * cx + s * cy) + cx + tx,
                -sy * (-s * cx + c * cy) + cy + ty,
                1.0,
            ),
        )
    }

    pub fn apply(&self, uv: Vector2<f32>) -> Vector2<f32> {
        let out = self.matrix() * uv.extend(1.0);
        Vector2::new(out.x, out.y)
    }
}

/// Everything the renderer needs to draw one customized part.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererMaterialParams {
    pub uv: UvTransform,
    pub map: MapSource,
    /// Multiplied onto the albedo; white when there is no tint.
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub alpha_test: Option<f32>,
    pub transparent: bool,
    pub double_sided: bool,
}

/// GPU layout of [`RendererMaterialParams`], ready for a uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    // mat3x3 columns are padded to 16 bytes in uniforms
    pub uv_transform: [[f32; 4]; 3],
    /// rgb tint, opacity
    pub color: [f32; 4],
    /// roughness, metalness, alpha test, emissive intensity
    pub pbr: [f32; 4],
}

impl RendererMaterialParams {
    pub fn to_uniform(&self, emissive_intensity: f32) -> MaterialUniform {
        let m = self.uv.matrix();
        let col = |v: Vector3<f32>| [v.x, v.y, v.z, 0.0];
        let [r, g, b] = self.color;
        MaterialUniform {
            uv_transform: [col(m.x), col(m.y), col(m.z)],
            color: [r, g, b, self.opacity],
            pbr: [
                self.roughness,
                self.metalness,
                self.alpha_test.unwrap_or(0.0),
                emissive_intensity.max(0.0),
            ],
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

fn unit(value: f32, fallback: f32) -> f32 {
    finite_or(value, fallback).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformApplier {
    pub alpha_test: f32,
}

impl Default for TransformApplier {
    fn default() -> Self {
        Self { alpha_test: 0.05 }
    }
}

impl TransformApplier {
    pub fn new(alpha_test: f32) -> Self {
        Self { alpha_test }
    }

    /// Derive renderer parameters from a (render-scaled) configuration.
    ///
    /// The map defaults to [`MapSource::Original`]; callers that know the bound
    /// texture use [`TransformApplier::apply_with_map`].
    pub fn apply(&self, config: &TextureConfig) -> RendererMaterialParams {
        self.apply_with_map(config, MapSource::Original)
    }

    pub fn apply_with_map(&self, config: &TextureConfig, map: MapSource) -> RendererMaterialParams {
        let scale = finite_or(config.scale, 0.0).max(0.0);
        let opacity = unit(config.opacity, 1.0);
        let transparent = opacity < 1.0;
        let alpha_test = (transparent || config.tint.is_some()).then_some(self.alpha_test);
        RendererMaterialParams {
            uv: UvTransform {
                address_mode_u: AddressMode::Repeat,
                address_mode_v: AddressMode::Repeat,
                repeat: Vector2::new(scale, scale),
                offset: Vector2::new(
                    finite_or(config.offset_x, 0.0),
                    finite_or(config.offset_y, 0.0),
                ),
                rotation: Rad(finite_or(config.rotation_degrees, 0.0).to_radians()),
                center: Vector2::new(0.5, 0.5),
            },
            map,
            color: config.tint.unwrap_or(Tint::WHITE).to_factors(),
            roughness: unit(config.roughness, 1.0),
            metalness: unit(config.metalness, 0.0),
            opacity,
            alpha_test,
            transparent,
            double_sided: true,
        }
    }
}
