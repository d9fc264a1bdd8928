//! The seam to the external renderer.
//!
//! The engine never draws anything itself. It hands derived material
//! parameters to the host and, for composite captures, borrows the
//! renderer's camera and asks for synchronous frames through
//! [`SceneRenderer`].

use image::RgbaImage;

use crate::camera::CameraPose;

pub trait SceneRenderer {
    /// Current camera pose and projection.
    fn camera_pose(&self) -> CameraPose;

    fn set_camera_pose(&mut self, pose: &CameraPose);

    /// Render the scene with the current camera and read the frame back.
    ///
    /// Blocks until the frame is available.
    fn render_frame(&mut self) -> anyhow::Result<RgbaImage>;
}
