use std::sync::Arc;

use glam::Vec2;
use parking_lot::RwLock;

/// Provides the pixel size of the surface the game is drawn into.
pub trait ViewportProvider: Send + Sync {
    fn viewport_size(&self) -> (u32, u32);

    fn aspect(&self) -> f32 {
        let (width, height) = self.viewport_size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Converts a pixel position (origin top-left) to normalized device
    /// coordinates in `-1..=1`, y pointing up.
    fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        let (width, height) = self.viewport_size();
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        Vec2::new(pixel.x / width * 2.0 - 1.0, 1.0 - pixel.y / height * 2.0)
    }
}

/// Viewport that always reports the same resolution.
#[derive(Debug, Clone, Copy)]
pub struct StaticViewport {
    pub width: u32,
    pub height: u32,
}

impl StaticViewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ViewportProvider for StaticViewport {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Viewport tracking a resizable window or canvas.
#[derive(Debug)]
pub struct SharedViewport {
    size: RwLock<(u32, u32)>,
}

impl SharedViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }
}

impl ViewportProvider for SharedViewport {
    fn viewport_size(&self) -> (u32, u32) {
        *self.size.read()
    }
}

impl<T> ViewportProvider for Arc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }
}
