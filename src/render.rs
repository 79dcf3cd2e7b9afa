use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::model::Geometry;
use crate::scene::Scene;

/// Camera state consumed by the host renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
}

impl CameraParams {
    pub fn from_camera(camera: &Camera, aspect: f32) -> Self {
        Self {
            view_proj: camera.view_proj(aspect),
            position: camera.position,
            target: camera.target,
            fov: camera.fov,
        }
    }
}

/// Lighting state consumed by the host renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightParams {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// One primitive to draw this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    /// Name of the scene object the primitive belongs to.
    pub tag: String,
    pub geometry: Geometry,
    /// Column-major world transform.
    pub transform: Mat4,
    pub color: Vec3,
}

/// Everything the host needs to draw a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderCommand {
    pub frame: u64,
    pub camera: CameraParams,
    pub light: LightParams,
    pub draws: Vec<DrawCommand>,
}

impl RenderCommand {
    pub fn build(frame: u64, scene: &Scene, camera: &Camera, aspect: f32) -> Self {
        let draws = scene
            .objects
            .iter()
            .flat_map(|object| {
                object
                    .world_primitives()
                    .into_iter()
                    .map(move |(primitive, center)| DrawCommand {
                        tag: object.name.clone(),
                        geometry: primitive.geometry,
                        transform: Mat4::from_rotation_translation(object.rotation, center),
                        color: primitive.color,
                    })
            })
            .collect();

        Self {
            frame,
            camera: CameraParams::from_camera(camera, aspect),
            light: LightParams {
                position: scene.light.position,
                color: scene.light.color,
                intensity: scene.light.intensity.max(0.1),
            },
            draws,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
