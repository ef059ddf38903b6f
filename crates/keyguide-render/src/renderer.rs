//! Drawing-surface abstraction and diagram configuration.

use kurbo::{BezPath, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Stroke width and color for one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub width: f64,
    /// Straight (non-premultiplied) RGBA.
    pub rgba: [u8; 4],
}

impl LineStyle {
    pub const fn new(width: f64, rgba: [u8; 4]) -> Self {
        Self { width, rgba }
    }

    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.rgba;
        Color::from_rgba8(r, g, b, a)
    }

    /// `#rrggbb` form of the color.
    pub fn hex(&self) -> String {
        let [r, g, b, _] = self.rgba;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Alpha in `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        f64::from(self.rgba[3]) / 255.0
    }
}

/// Routing distances and line styles for the connector overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Step between inset rows near a reference source.
    pub inset_tick: f64,
    /// Step between parallel margin columns.
    pub column_tick: f64,
    /// Vertical distance from the title to the selected connector's row.
    pub selected_offset: f64,
    pub reference_style: LineStyle,
    pub selected_style: LineStyle,
    pub debug_style: LineStyle,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            inset_tick: 3.0,
            column_tick: 5.0,
            selected_offset: 45.0,
            reference_style: LineStyle::new(1.5, [59, 130, 246, 255]), // Blue
            selected_style: LineStyle::new(3.0, [234, 88, 12, 255]),   // Orange
            debug_style: LineStyle::new(1.0, [220, 38, 38, 160]),      // Red
        }
    }
}

/// A drawing surface covering the whole display area.
///
/// Implementations can record strokes, build a vello scene, or draw to
/// anything else that can stroke paths.
pub trait Surface {
    /// The surface now covers `size` (in overlay pixels).
    fn resize(&mut self, size: Size);

    /// Remove everything drawn so far.
    fn clear(&mut self);

    /// Stroke a path in overlay coordinates.
    fn stroke(&mut self, path: &BezPath, style: &LineStyle) -> RenderResult<()>;
}
