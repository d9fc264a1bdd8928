//! Multi-angle composite capture.
//!
//! The compositor borrows the renderer's camera, renders the primary view and
//! three auxiliary views synchronously and lays them out on one canvas:
//!
//! ```text
//! +----------------------+-------+
//! |                      | top   |
//! |       primary        +-------+
//! |     (2/3 width)      | side  |
//! |                      +-------+
//! |                      | back  |
//! +----------------------+-------+
//! ```
//!
//! Each frame is scaled to fit its slot without distortion and centered in
//! it. The camera is restored on every exit path, including failed passes and
//! panics inside the renderer.

use std::{cell::Cell, io::Cursor};

use base64::Engine as _;
use cgmath::Point3;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, codecs::jpeg::JpegEncoder, imageops};
use instant::{Duration, Instant};

use crate::{
    camera::{Camera, CameraPose},
    error::BindError,
    render::SceneRenderer,
};

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Largest rectangle with the source's aspect ratio that fits into `dest`,
/// centered along the axis with slack.
pub fn fit_rect(source_width: u32, source_height: u32, dest: Rect) -> Rect {
    let source_aspect = source_width as f32 / source_height as f32;
    if source_aspect > dest.aspect() {
        let height = dest.width / source_aspect;
        Rect::new(dest.x, dest.y + (dest.height - height) / 2.0, dest.width, height)
    } else {
        let width = dest.height * source_aspect;
        Rect::new(dest.x + (dest.width - width) / 2.0, dest.y, width, dest.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageEncoding {
    Png,
    /// Quality in `1..=100`.
    Jpeg { quality: u8 },
}

impl ImageEncoding {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageEncoding::Png => "image/png",
            ImageEncoding::Jpeg { .. } => "image/jpeg",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompositeSettings {
    pub width: u32,
    pub height: u32,
    pub background: Rgba<u8>,
    pub encoding: ImageEncoding,
    /// Upper bound for all render passes together.
    pub timeout: Duration,
    /// Where the auxiliary cameras stand, top to bottom in the right column.
    pub auxiliary_positions: [Point3<f32>; 3],
    /// What the auxiliary cameras look at.
    pub target: Point3<f32>,
}

impl Default for CompositeSettings {
    fn default() -> Self {
        Self {
            width: 2560,
            height: 1440,
            background: Rgba([255, 255, 255, 255]),
            encoding: ImageEncoding::Png,
            timeout: Duration::from_secs(10),
            auxiliary_positions: [
                Point3::new(0.0, 0.5, 0.0),
                Point3::new(0.5, 0.0, 0.0),
                Point3::new(0.0, 0.0, -0.5),
            ],
            target: Point3::new(0.0, 0.0, 0.0),
        }
    }
}

impl CompositeSettings {
    /// Slot of the primary view followed by the three auxiliary slots.
    pub fn slots(&self) -> [Rect; 4] {
        let width = self.width as f32;
        let height = self.height as f32;
        let left = (width * 2.0 / 3.0).floor();
        let right = width - left;
        let row = height / 3.0;
        [
            Rect::new(0.0, 0.0, left, height),
            Rect::new(left, 0.0, right, row),
            Rect::new(left, row, right, row),
            Rect::new(left, row * 2.0, right, row),
        ]
    }
}

/// Puts the saved pose back when dropped.
struct PoseGuard<'r, R: SceneRenderer + ?Sized> {
    renderer: &'r mut R,
    saved: CameraPose,
}

impl<'r, R: SceneRenderer + ?Sized> PoseGuard<'r, R> {
    fn acquire(renderer: &'r mut R) -> Self {
        let saved = renderer.camera_pose();
        Self { renderer, saved }
    }
}

impl<R: SceneRenderer + ?Sized> Drop for PoseGuard<'_, R> {
    fn drop(&mut self) {
        self.renderer.set_camera_pose(&self.saved);
    }
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Debug, Default)]
pub struct Compositor {
    settings: CompositeSettings,
    busy: Cell<bool>,
}

impl Compositor {
    pub fn new(settings: CompositeSettings) -> Self {
        Self {
            settings,
            busy: Cell::new(false),
        }
    }

    pub fn settings(&self) -> &CompositeSettings {
        &self.settings
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Capture the composite and return it as a `data:` URI.
    pub fn capture_composite<R: SceneRenderer + ?Sized>(
        &self,
        renderer: &mut R,
    ) -> Result<String, BindError> {
        let canvas = self.capture_canvas(renderer)?;
        let uri = encode_data_uri(&canvas, self.settings.encoding)
            .map_err(|e| BindError::RenderFailure(format!("encoding composite: {e:#}")))?;
        log::info!(
            "Captured {}x{} composite ({} bytes)",
            canvas.width(),
            canvas.height(),
            uri.len()
        );
        Ok(uri)
    }

    /// Capture the composite as raw pixels.
    ///
    /// Only one capture may run at a time; a second call while one is running
    /// fails with [`BindError::CaptureBusy`].
    pub fn capture_canvas<R: SceneRenderer + ?Sized>(
        &self,
        renderer: &mut R,
    ) -> Result<RgbaImage, BindError> {
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            log::warn!("Composite capture requested while another one is running");
            return Err(BindError::CaptureBusy);
        };
        let settings = &self.settings;
        let started = Instant::now();
        let guard = PoseGuard::acquire(renderer);
        let saved = guard.saved;

        let mut poses = vec![saved];
        poses.extend(settings.auxiliary_positions.iter().map(|&position| CameraPose {
            camera: Camera::looking_at(position, settings.target),
            projection: saved.projection,
        }));

        let mut canvas = RgbaImage::from_pixel(settings.width, settings.height, settings.background);
        for (pass, (pose, slot)) in poses.iter().zip(settings.slots()).enumerate() {
            guard.renderer.set_camera_pose(pose);
            let frame = guard.renderer.render_frame().map_err(|e| {
                log::error!("Render pass {pass} failed: {e:#}");
                BindError::RenderFailure(format!("pass {pass}: {e:#}"))
            })?;
            if frame.width() == 0 || frame.height() == 0 {
                log::error!("Render pass {pass} returned an empty frame");
                return Err(BindError::RenderFailure(format!("pass {pass}: empty frame")));
            }
            draw_fitted(&mut canvas, &frame, slot);
            if started.elapsed() >= settings.timeout {
                log::error!("Composite capture timed out after pass {pass}");
                return Err(BindError::CaptureTimeout(settings.timeout));
            }
        }
        drop(guard);
        Ok(canvas)
    }
}

fn draw_fitted(canvas: &mut RgbaImage, frame: &RgbaImage, slot: Rect) {
    let fitted = fit_rect(frame.width(), frame.height(), slot);
    let width = (fitted.width.round() as u32).max(1);
    let height = (fitted.height.round() as u32).max(1);
    let x = fitted.x.round() as i64;
    let y = fitted.y.round() as i64;
    if frame.dimensions() == (width, height) {
        imageops::overlay(canvas, frame, x, y);
    } else {
        let scaled = imageops::resize(frame, width, height, imageops::FilterType::Triangle);
        imageops::overlay(canvas, &scaled, x, y);
    }
}

/// Encode `canvas` and wrap it into a base64 `data:` URI.
pub fn encode_data_uri(canvas: &RgbaImage, encoding: ImageEncoding) -> anyhow::Result<String> {
    let mut bytes = Vec::new();
    match encoding {
        ImageEncoding::Png => canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?,
        ImageEncoding::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)?;
        }
    }
    Ok(format!(
        "data:{};base64,{}",
        encoding.mime_type(),
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    ))
}
