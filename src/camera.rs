use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::raycast::Ray;

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 10.0),
            target: Vec3::ZERO,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect.max(0.01), self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Ray from the camera through a point given in normalized device
    /// coordinates.
    pub fn ray_through_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let half_height = (self.fov.to_radians() * 0.5).tan();
        let half_width = half_height * aspect.max(0.01);
        let direction = forward + right * (ndc.x * half_width) + up * (ndc.y * half_height);
        Ray::new(self.position, direction)
    }
}

/// Camera that trails a subject at a fixed offset with no smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    pub offset: Vec3,
    pub camera: Camera,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 5.0, 10.0),
            camera: Camera::default(),
        }
    }
}

impl CameraRig {
    pub fn follow(&mut self, subject: Vec3) -> Camera {
        self.camera.position = subject + self.offset;
        self.camera.target = subject;
        self.camera
    }
}
