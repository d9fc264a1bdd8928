//! Decoded textures and texture creation utilities.
//!
//! This module provides [`LoadedTexture`], the decoded form of a texture
//! source shared by every part bound to the same URL. The renderer uploads the
//! RGBA pixels itself; the addressing flags it needs travel with the pixels.

use std::sync::Arc;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};

/// Texture coordinate addressing outside of `[0, 1]`. Product textures only
/// ever tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressMode {
    Repeat,
}

/// A decoded texture ready to be uploaded by the renderer.
///
/// Product textures tile across the mesh, so both axes repeat. Colour data
/// is sRGB and glTF UVs already have their origin top-left, so rows are not
/// flipped.
#[derive(Clone, Debug)]
pub struct LoadedTexture {
    pub url: String,
    pub pixels: Arc<RgbaImage>,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub srgb: bool,
    pub flip_y: bool,
}

impl LoadedTexture {
    /// Decode a texture from raw image file contents.
    ///
    /// # Arguments
    ///
    /// * `bytes` raw image file data (PNG, JPEG, etc.)
    /// * `url` the source the bytes came from, kept as the cache key
    /// * `format` optional format hint. If None, the format is guessed from the bytes.
    pub fn from_bytes(bytes: &[u8], url: &str, format: Option<ImageFormat>) -> Result<Self> {
        let img = match format {
            None => image::load_from_memory(bytes),
            Some(fmt) => image::load_from_memory_with_format(bytes, fmt),
        }
        .with_context(|| format!("could not decode {} bytes", bytes.len()))?;
        Self::from_image(&img, url)
    }

    pub fn from_image(img: &DynamicImage, url: &str) -> Result<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            anyhow::bail!("image has no pixels ({width}x{height})");
        }
        Ok(Self {
            url: url.to_string(),
            pixels: Arc::new(img.to_rgba8()),
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            srgb: true,
            flip_y: false,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}
