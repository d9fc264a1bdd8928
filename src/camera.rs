//! Camera pose and projection as seen by the compositor.
//!
//! The renderer owns the real camera. These types are the snapshot the
//! engine takes of it and the poses it asks the renderer to assume.

use cgmath::{Deg, InnerSpace, Point3, Rad, Vector3};

const SAFE_FRAC_PI_2: f32 = std::f32::consts::FRAC_PI_2 - 0.0001;

/// Position and orientation, orientation given as yaw/pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Camera at `position` facing `target`.
    ///
    /// Straight up/down views are clamped just short of the pole so the view
    /// matrix stays well defined.
    pub fn looking_at(position: Point3<f32>, target: Point3<f32>) -> Self {
        let dir = target - position;
        if dir.magnitude2() == 0.0 {
            return Self::new(position, Rad(0.0), Rad(0.0));
        }
        let dir = dir.normalize();
        let pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2);
        let yaw = dir.z.atan2(dir.x);
        Self::new(position, Rad(yaw), Rad(pitch))
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }
}

/// Full snapshot of the renderer's camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub camera: Camera,
    pub projection: Projection,
}

impl Default for CameraPose {
    /// Three-quarter product view.
    fn default() -> Self {
        let position = Point3::new(0.85, 0.2, 0.0);
        Self {
            camera: Camera::looking_at(position, Point3::new(0.0, 0.0, 0.0)),
            projection: Projection::new(16, 9, Deg(37.8), 0.01, 100.0),
        }
    }
}
