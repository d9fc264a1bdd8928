//! Texture libraries offered per category, and user uploads.

use std::collections::BTreeMap;

use crate::{data_structures::part::Category, error::BindError};

const SWATCH_BASE: &str = "https://raw.githubusercontent.com/yayapewn/shoe-textures/main";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureItem {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl TextureItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

fn swatch(id: &str, name: &str, file: &str) -> TextureItem {
    TextureItem::new(id, name, format!("{SWATCH_BASE}/{file}"))
}

/// Stock swatches for each category.
pub fn stock_items(category: Category) -> Vec<TextureItem> {
    match category {
        Category::Vamp => vec![
            swatch("v1", "Fine Fabric 01", "EGT%2000601%20A%20WP_BASE.jpg"),
            swatch("v2", "Woven Fabric 02", "EGT%2000716%20A%20WP_BASE.jpg"),
            swatch("v3", "Tech Mesh 03", "EGT%2000820%20J%20WP_BASE.jpg"),
            swatch("v4", "Durable 04", "EGT01305-01A-000A_BASE.jpg"),
            swatch("v5", "Breathable 05", "EGT01317-01A-000A_BASE.jpg"),
            swatch("v6", "Digital 06", "EGT01436-01A-000A_BASE.jpg"),
        ],
        Category::Shoelace => vec![
            swatch("s1", "Lace Texture 01", "EGT01305-01A-000A_BASE.jpg"),
            swatch("s2", "Lace Texture 02", "EGT%2000601%20A%20WP_BASE.jpg"),
            swatch("s3", "Lace Texture 03", "EGT01317-01A-000A_BASE.jpg"),
        ],
        Category::Label => vec![
            swatch("l1", "Leather", "EGT%2000716%20A%20WP_BASE.jpg"),
            swatch("l2", "Carbon Fiber", "EGT01317-01A-000A_BASE.jpg"),
            swatch("l3", "Matte Finish", "EGT%2000820%20J%20WP_BASE.jpg"),
        ],
    }
}

/// The texture libraries of all categories. Newest items come first.
#[derive(Clone, Debug, PartialEq)]
pub struct Libraries {
    items: BTreeMap<Category, Vec<TextureItem>>,
}

impl Default for Libraries {
    fn default() -> Self {
        Self {
            items: Category::ALL
                .into_iter()
                .map(|category| (category, stock_items(category)))
                .collect(),
        }
    }
}

impl Libraries {
    pub fn get(&self, category: Category) -> &[TextureItem] {
        self.items.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn prepend(&mut self, category: Category, item: TextureItem) {
        self.items.entry(category).or_default().insert(0, item);
    }

    pub fn remove_url(&mut self, url: &str) {
        for items in self.items.values_mut() {
            items.retain(|item| item.url != url);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadLimits {
    pub mime_prefix: String,
    pub max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            mime_prefix: "image/".into(),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// A file handed over by the host's file picker.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadLimits {
    pub fn validate(&self, upload: &UploadedImage) -> Result<(), BindError> {
        if !upload.mime.starts_with(&self.mime_prefix) {
            return Err(BindError::InvalidInput(format!(
                "{} is not an image ({})",
                upload.file_name, upload.mime
            )));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(BindError::InvalidInput(format!(
                "{} is too large ({} bytes, limit {})",
                upload.file_name,
                upload.bytes.len(),
                self.max_bytes
            )));
        }
        Ok(())
    }
}
