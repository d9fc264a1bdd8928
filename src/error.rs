//! Error kinds surfaced at the engine's call boundaries.
//!
//! Every failure is recoverable by whoever invoked the operation. Rejections
//! (`InvalidInput`, `UnsafeSource`) happen before any state is touched,
//! `LoadFailure` leaves the previous binding in place and the compositor
//! errors are only returned after the camera has been restored.

use thiserror::Error;

use crate::data_structures::part::PartId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("blocked texture source {0}")]
    UnsafeSource(String),
    #[error("failed to load texture {url}: {reason}")]
    LoadFailure { url: String, reason: String },
    #[error("render failed: {0}")]
    RenderFailure(String),
    #[error("a composite capture is already running")]
    CaptureBusy,
    #[error("composite capture exceeded {0:?}")]
    CaptureTimeout(instant::Duration),
    #[error("unknown part {0}")]
    UnknownPart(PartId),
}

impl BindError {
    pub(crate) fn load_failure(url: &str, err: anyhow::Error) -> Self {
        // `{:#}` keeps the whole context chain on one line
        Self::LoadFailure {
            url: url.to_string(),
            reason: format!("{:#}", err),
        }
    }
}
