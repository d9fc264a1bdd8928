//! Per-part texture configuration.
//!
//! A [`TextureConfig`] is created the first time a part is customized and is
//! then patched field by field through [`TextureParam`]. Values are stored as
//! the user entered them; sanitizing happens when render parameters are
//! derived (see [`crate::transform`]).

use std::{fmt, str::FromStr};

/// Optional colour multiplied onto the texture albedo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tint(pub [u8; 3]);

impl Tint {
    pub const WHITE: Tint = Tint([255, 255, 255]);

    /// Linear factors in `[0, 1]` for the shader.
    pub fn to_factors(self) -> [f32; 3] {
        let [r, g, b] = self.0;
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }
}

impl FromStr for Tint {
    type Err = String;

    /// Parses `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected a #rrggbb colour, got {s:?}"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("{s:?}: {e}"))
        };
        Ok(Tint([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }
}

impl fmt::Display for Tint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Stored texture/material parameters of one part.
///
/// `source_url == None` means no texture map is bound; PBR values and the
/// tint still apply in that case.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureConfig {
    pub source_url: Option<String>,
    /// Tiling factor as entered, expected in `[0, 5]`.
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub rotation_degrees: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub tint: Option<Tint>,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            scale: 2.5,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation_degrees: 0.0,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            tint: None,
        }
    }
}

impl TextureConfig {
    /// Default configuration bound to `url`.
    pub fn with_source(url: impl Into<String>) -> Self {
        Self {
            source_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Overwrite the single field named by `param`, keeping all others.
    pub fn patch(&mut self, param: TextureParam) {
        match param {
            TextureParam::Scale(v) => self.scale = v,
            TextureParam::OffsetX(v) => self.offset_x = v,
            TextureParam::OffsetY(v) => self.offset_y = v,
            TextureParam::Rotation(v) => self.rotation_degrees = v,
            TextureParam::Roughness(v) => self.roughness = v,
            TextureParam::Metalness(v) => self.metalness = v,
            TextureParam::Opacity(v) => self.opacity = v,
            TextureParam::Tint(tint) => self.tint = tint,
        }
    }
}

/// A single-field edit coming from the host's controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureParam {
    Scale(f32),
    OffsetX(f32),
    OffsetY(f32),
    Rotation(f32),
    Roughness(f32),
    Metalness(f32),
    Opacity(f32),
    Tint(Option<Tint>),
}

impl TextureParam {
    /// Build a patch from a control's field name and its textual value.
    ///
    /// Numeric fields accept anything `f32` parses; `color` accepts `#rrggbb`
    /// or an empty string to clear the tint.
    pub fn parse(field: &str, value: &str) -> Result<Self, String> {
        let number = || {
            value
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("{field}: {e}"))
        };
        let param = match field {
            "scale" => TextureParam::Scale(number()?),
            "offsetX" | "offset_x" => TextureParam::OffsetX(number()?),
            "offsetY" | "offset_y" => TextureParam::OffsetY(number()?),
            "rotation" => TextureParam::Rotation(number()?),
            "roughness" => TextureParam::Roughness(number()?),
            "metalness" => TextureParam::Metalness(number()?),
            "opacity" => TextureParam::Opacity(number()?),
            "color" | "tint" if value.trim().is_empty() => TextureParam::Tint(None),
            "color" | "tint" => TextureParam::Tint(Some(value.parse()?)),
            other => return Err(format!("unknown texture field {other:?}")),
        };
        Ok(param)
    }
}
