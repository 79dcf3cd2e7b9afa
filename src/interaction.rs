use glam::Vec2;
use log::info;

use crate::camera::Camera;
use crate::scene::Scene;
use crate::viewport::ViewportProvider;

/// Object resolved under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub name: String,
    pub distance: f32,
}

/// Resolves a click at `pixel` to the nearest object under the cursor.
pub fn pick(
    scene: &Scene,
    camera: &Camera,
    viewport: &dyn ViewportProvider,
    pixel: Vec2,
) -> Option<PickHit> {
    let ndc = viewport.to_ndc(pixel);
    let ray = camera.ray_through_ndc(ndc, viewport.aspect());
    let hit = scene.raycast(&ray, |_, _| true)?;
    let object = scene.object(hit.object)?;
    info!("clicked on {} ({:.2} units away)", object.name, hit.distance);
    Some(PickHit {
        name: object.name.clone(),
        distance: hit.distance,
    })
}
