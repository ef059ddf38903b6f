//! Vello-backed connector surface.

use crate::renderer::{LineStyle, RenderResult, Surface};
use kurbo::{Affine, BezPath, Size, Stroke};
use vello::Scene;

/// Builds a vello scene holding the connector overlay.
///
/// The host composites [`VelloSurface::scene`] on top of the page.
pub struct VelloSurface {
    scene: Scene,
    size: Size,
    transform: Affine,
}

impl Default for VelloSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloSurface {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            size: Size::ZERO,
            transform: Affine::IDENTITY,
        }
    }

    /// Device scale applied to every stroke.
    pub fn set_scale(&mut self, scale: f64) {
        self.transform = Affine::scale(scale);
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl Surface for VelloSurface {
    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn clear(&mut self) {
        self.scene.reset();
    }

    fn stroke(&mut self, path: &BezPath, style: &LineStyle) -> RenderResult<()> {
        let stroke = Stroke::new(style.width);
        self.scene.stroke(&stroke, self.transform, style.color(), None, path);
        Ok(())
    }
}
