//! Connector overlay renderer.
//!
//! Owns a [`Surface`] spanning the whole display area and redraws every
//! connector from scratch whenever the connection set or the page size
//! changes.

use keyguide_core::{Connection, ConnectionKind, ConnectionPair, ElementTree};
use kurbo::{BezPath, Point, Shape, Size};

use crate::renderer::{DiagramConfig, LineStyle, RenderResult, Surface};
use crate::router::{DiagramLayout, RoutedLine, route};

/// Renderer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No usable size yet; nothing is drawn.
    Idle,
    /// Sized and holding the last completed frame.
    Sized,
    /// A redraw is in progress.
    Drawing,
}

/// Inputs of the last drawn frame, kept so a resize can redraw it.
#[derive(Debug, Clone)]
struct Frame {
    layout: DiagramLayout,
    pairs: Vec<ConnectionPair>,
    debug: bool,
}

/// Draws reference and selected connectors onto a surface.
pub struct DiagramRenderer<S: Surface> {
    surface: S,
    config: DiagramConfig,
    phase: Phase,
    size: Size,
    frame: Option<Frame>,
    lines: Vec<RoutedLine>,
}

impl<S: Surface> DiagramRenderer<S> {
    pub fn new(surface: S, config: DiagramConfig) -> Self {
        Self {
            surface,
            config,
            phase: Phase::Idle,
            size: Size::ZERO,
            frame: None,
            lines: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Lines of the last completed frame, in overlay coordinates.
    pub fn lines(&self) -> &[RoutedLine] {
        &self.lines
    }

    /// Match the surface to the display size and redraw the cached frame.
    ///
    /// The cached frame keeps the anchor rectangles of the last
    /// [`render`](Self::render); callers that can re-resolve anchors after a
    /// reflow use [`resize_and_render`](Self::resize_and_render) instead.
    /// Calling this repeatedly with the same size yields the same picture.
    pub fn resize(&mut self, size: Size) -> RenderResult<()> {
        if self.apply_size(size) {
            self.redraw()
        } else {
            Ok(())
        }
    }

    /// Match the surface to the display size, then draw fresh inputs.
    pub fn resize_and_render(
        &mut self,
        size: Size,
        layout: DiagramLayout,
        connections: &[Connection],
        tree: &dyn ElementTree,
        debug: bool,
    ) -> RenderResult<usize> {
        self.apply_size(size);
        self.render(layout, connections, tree, debug)
    }

    /// Returns whether the new size is drawable.
    fn apply_size(&mut self, size: Size) -> bool {
        self.size = size;
        self.surface.resize(size);
        if size.width <= 0.0 || size.height <= 0.0 {
            log::debug!("Diagram surface has no area, going idle");
            self.surface.clear();
            self.lines.clear();
            self.phase = Phase::Idle;
            return false;
        }
        self.phase = Phase::Sized;
        true
    }

    /// Resolve `connections` against `tree` and draw them.
    ///
    /// Connections whose anchors are not rendered are skipped. Returns the
    /// number of lines drawn.
    pub fn render(
        &mut self,
        layout: DiagramLayout,
        connections: &[Connection],
        tree: &dyn ElementTree,
        debug: bool,
    ) -> RenderResult<usize> {
        let pairs: Vec<_> = connections
            .iter()
            .filter_map(|connection| {
                let pair = ConnectionPair::resolve(connection, tree);
                if pair.is_none() {
                    log::debug!(
                        "Skipping connection {} -> {}: anchor not rendered",
                        connection.source,
                        connection.target
                    );
                }
                pair
            })
            .collect();

        self.frame = Some(Frame { layout, pairs, debug });
        self.redraw()?;
        Ok(self.lines.len())
    }

    /// Redraw the cached frame from a cleared surface.
    pub fn redraw(&mut self) -> RenderResult<()> {
        if self.phase == Phase::Idle {
            return Ok(());
        }

        self.phase = Phase::Drawing;
        self.surface.clear();
        self.lines.clear();

        let result = self.draw_frame();
        if let Err(err) = &result {
            log::warn!("Connector redraw failed: {}", err);
            self.surface.clear();
            self.lines.clear();
        }
        self.phase = Phase::Sized;
        result
    }

    fn draw_frame(&mut self) -> RenderResult<()> {
        let Some(frame) = &self.frame else {
            return Ok(());
        };

        let origin = frame.layout.overlay;
        let layout = frame.layout.normalized();
        let pairs: Vec<_> = frame.pairs.iter().map(|p| p.normalized(origin)).collect();
        let lines = route(&layout, &pairs, &self.config);

        if frame.debug {
            draw_debug(&mut self.surface, &layout, &self.config.debug_style)?;
        }

        for line in &lines {
            let style = match line.kind {
                ConnectionKind::Reference => &self.config.reference_style,
                ConnectionKind::Selected => &self.config.selected_style,
            };
            self.surface.stroke(&line.to_path(), style)?;
        }

        log::trace!("Drew {} connectors", lines.len());
        self.lines = lines;
        Ok(())
    }
}

/// Outline the routing regions and the side-selection centerline.
fn draw_debug<S: Surface>(surface: &mut S, layout: &DiagramLayout, style: &LineStyle) -> RenderResult<()> {
    for region in [layout.keyboard, layout.left_margin, layout.right_margin] {
        surface.stroke(&region.to_path(0.1), style)?;
    }

    let x = layout.keyboard_center_x();
    let mut centerline = BezPath::new();
    centerline.move_to(Point::new(x, layout.overlay.y0));
    centerline.line_to(Point::new(x, layout.overlay.y1));
    surface.stroke(&centerline, style)
}
