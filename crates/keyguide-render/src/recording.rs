//! In-memory surface that keeps every stroke.

use kurbo::{BezPath, Size};

use crate::renderer::{LineStyle, RenderResult, Surface};

/// One recorded stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStroke {
    pub path: BezPath,
    pub style: LineStyle,
}

/// Surface that records strokes instead of rasterizing them.
///
/// Used for headless export and for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Size,
    strokes: Vec<RecordedStroke>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn strokes(&self) -> &[RecordedStroke] {
        &self.strokes
    }

    /// How many times the surface was cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn clear(&mut self) {
        self.strokes.clear();
        self.clears += 1;
    }

    fn stroke(&mut self, path: &BezPath, style: &LineStyle) -> RenderResult<()> {
        self.strokes.push(RecordedStroke {
            path: path.clone(),
            style: *style,
        });
        Ok(())
    }
}
