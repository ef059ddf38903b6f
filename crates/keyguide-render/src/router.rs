//! Collision-free routing of connector lines.
//!
//! Pure geometry: takes overlay-relative rectangles and resolved connection
//! pairs, returns polylines. Nothing here touches a surface.

use keyguide_core::geometry::{self, center_x};
use keyguide_core::{ConnectionKind, ConnectionPair};
use kurbo::{BezPath, Point, Rect};

use crate::renderer::DiagramConfig;

/// Smallest tick the router accepts; keeps the collision search finite.
const MIN_TICK: f64 = 0.5;

/// Page regions the overlay is routed through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramLayout {
    /// The overlay surface itself.
    pub overlay: Rect,
    /// Keyboard plus info panel.
    pub keyboard: Rect,
    pub left_margin: Rect,
    pub right_margin: Rect,
}

impl DiagramLayout {
    /// Same layout relative to the overlay's own top-left corner.
    pub fn normalized(&self) -> Self {
        let origin = self.overlay;
        Self {
            overlay: geometry::normalize(self.overlay, origin),
            keyboard: geometry::normalize(self.keyboard, origin),
            left_margin: geometry::normalize(self.left_margin, origin),
            right_margin: geometry::normalize(self.right_margin, origin),
        }
    }

    /// Everything left of this goes to the left margin.
    pub fn keyboard_center_x(&self) -> f64 {
        center_x(self.keyboard)
    }
}

/// Margin a reference line runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// A computed connector polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLine {
    pub kind: ConnectionKind,
    /// Margin side for reference lines.
    pub side: Option<Side>,
    pub points: Vec<Point>,
}

impl RoutedLine {
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
            for point in points {
                path.line_to(*point);
            }
        }
        path
    }

    /// Y of the horizontal run next to the source (reference lines).
    pub fn inset_y(&self) -> Option<f64> {
        if self.kind != ConnectionKind::Reference {
            return None;
        }
        self.points.get(1).map(|p| p.y)
    }

    /// X of the vertical run in the margin (reference lines).
    pub fn margin_x(&self) -> Option<f64> {
        if self.kind != ConnectionKind::Reference {
            return None;
        }
        self.points.get(2).map(|p| p.x)
    }
}

/// Route every pair. All inputs must already be overlay-relative.
///
/// Reference lines come first, in input order, then the single selected line.
pub fn route(layout: &DiagramLayout, pairs: &[ConnectionPair], config: &DiagramConfig) -> Vec<RoutedLine> {
    let inset_tick = config.inset_tick.max(MIN_TICK);
    let column_tick = config.column_tick.max(0.0);
    let center = layout.keyboard_center_x();

    let mut rows: [Vec<f64>; 2] = [Vec::new(), Vec::new()];
    let mut columns = [0usize; 2];
    let mut lines = Vec::with_capacity(pairs.len());

    for pair in pairs.iter().filter(|p| p.kind == ConnectionKind::Reference) {
        let side = if center < pair.target_x() {
            Side::Right
        } else {
            Side::Left
        };
        let (source, target) = pair.reference_endpoints(side == Side::Right);

        let used = &mut rows[side.index()];
        let mut inset_y = source.y;
        while used.iter().any(|y| (y - inset_y).abs() < inset_tick) {
            inset_y += inset_tick;
        }
        used.push(inset_y);

        let column = columns[side.index()] as f64;
        columns[side.index()] += 1;
        let margin_x = match side {
            Side::Right => layout.right_margin.x1 - column * column_tick,
            Side::Left => layout.left_margin.x0 + column * column_tick,
        };

        lines.push(RoutedLine {
            kind: ConnectionKind::Reference,
            side: Some(side),
            points: vec![
                source,
                Point::new(source.x, inset_y),
                Point::new(margin_x, inset_y),
                Point::new(margin_x, target.y),
                target,
            ],
        });
    }

    let mut selected = pairs.iter().filter(|p| p.kind == ConnectionKind::Selected);
    if let Some(pair) = selected.next() {
        let (source, target) = pair.selected_endpoints();
        let row_y = if target.y < source.y {
            source.y - config.selected_offset
        } else {
            source.y + config.selected_offset
        };
        lines.push(RoutedLine {
            kind: ConnectionKind::Selected,
            side: None,
            points: vec![
                source,
                Point::new(source.x, row_y),
                Point::new(target.x, row_y),
                target,
            ],
        });
    }
    let extra = selected.count();
    if extra > 0 {
        log::debug!("Ignoring {} extra selected connections", extra);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyguide_core::geometry::rect;

    fn layout() -> DiagramLayout {
        DiagramLayout {
            overlay: rect(0.0, 0.0, 1000.0, 600.0),
            keyboard: rect(100.0, 0.0, 800.0, 600.0),
            left_margin: rect(0.0, 0.0, 100.0, 600.0),
            right_margin: rect(900.0, 0.0, 100.0, 600.0),
        }
    }

    fn reference(source: Rect, target: Rect) -> ConnectionPair {
        ConnectionPair {
            kind: ConnectionKind::Reference,
            source,
            target,
        }
    }

    #[test]
    fn test_reference_line_shape() {
        let pairs = [reference(rect(400.0, 400.0, 20.0, 10.0), rect(700.0, 50.0, 40.0, 40.0))];
        let lines = route(&layout(), &pairs, &DiagramConfig::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].side, Some(Side::Right));
        assert_eq!(
            lines[0].points,
            vec![
                Point::new(410.0, 410.0),
                Point::new(410.0, 410.0),
                Point::new(1000.0, 410.0),
                Point::new(1000.0, 70.0),
                Point::new(740.0, 70.0),
            ]
        );
    }

    #[test]
    fn test_left_side_target() {
        let pairs = [reference(rect(400.0, 400.0, 20.0, 10.0), rect(150.0, 50.0, 40.0, 40.0))];
        let lines = route(&layout(), &pairs, &DiagramConfig::default());
        assert_eq!(lines[0].side, Some(Side::Left));
        assert_eq!(lines[0].margin_x(), Some(0.0));
        assert_eq!(lines[0].points[4], Point::new(150.0, 70.0));
    }

    #[test]
    fn test_duplicate_targets_fan_out() {
        let key = rect(700.0, 300.0, 40.0, 40.0);
        let pairs = [
            reference(rect(200.0, 400.0, 20.0, 10.0), key),
            reference(rect(300.0, 400.0, 20.0, 10.0), key),
        ];
        let lines = route(&layout(), &pairs, &DiagramConfig::default());
        assert_eq!(lines[0].margin_x(), Some(1000.0));
        assert_eq!(lines[1].margin_x(), Some(995.0));
        assert_eq!(lines[0].inset_y(), Some(410.0));
        assert_eq!(lines[1].inset_y(), Some(413.0));
    }

    #[test]
    fn test_same_side_routes_never_share_rows_or_columns() {
        let pairs: Vec<_> = (0..12)
            .map(|i| {
                let source = rect(120.0 + (i % 4) as f64 * 50.0, 400.0 + (i / 3) as f64, 20.0, 10.0);
                let target = rect(600.0 + (i % 5) as f64 * 40.0, 40.0 * (i % 3) as f64, 40.0, 40.0);
                reference(source, target)
            })
            .collect();
        let lines = route(&layout(), &pairs, &DiagramConfig::default());
        assert_eq!(lines.len(), 12);

        for (i, a) in lines.iter().enumerate() {
            for b in lines.iter().skip(i + 1) {
                assert_eq!(a.side, Some(Side::Right));
                assert_ne!(a.inset_y(), b.inset_y());
                assert_ne!(a.margin_x(), b.margin_x());
            }
        }
    }

    #[test]
    fn test_sides_are_tracked_independently() {
        let source = rect(400.0, 400.0, 20.0, 10.0);
        let pairs = [
            reference(source, rect(150.0, 50.0, 40.0, 40.0)),
            reference(source, rect(700.0, 50.0, 40.0, 40.0)),
        ];
        let lines = route(&layout(), &pairs, &DiagramConfig::default());
        assert_eq!(lines[0].inset_y(), Some(410.0));
        assert_eq!(lines[1].inset_y(), Some(410.0));
        assert_eq!(lines[0].margin_x(), Some(0.0));
        assert_eq!(lines[1].margin_x(), Some(1000.0));
    }

    #[test]
    fn test_selected_line_goes_up_to_key() {
        let pairs = [ConnectionPair {
            kind: ConnectionKind::Selected,
            source: rect(400.0, 400.0, 200.0, 20.0),
            target: rect(200.0, 100.0, 40.0, 40.0),
        }];
        let lines = route(&layout(), &pairs, &DiagramConfig::default());
        assert_eq!(
            lines[0].points,
            vec![
                Point::new(500.0, 400.0),
                Point::new(500.0, 355.0),
                Point::new(220.0, 355.0),
                Point::new(220.0, 140.0),
            ]
        );
        assert_eq!(lines[0].inset_y(), None);
    }

    #[test]
    fn test_only_one_selected_line() {
        let pair = ConnectionPair {
            kind: ConnectionKind::Selected,
            source: rect(400.0, 400.0, 200.0, 20.0),
            target: rect(200.0, 100.0, 40.0, 40.0),
        };
        let lines = route(&layout(), &[pair, pair], &DiagramConfig::default());
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_zero_tick_still_terminates() {
        let config = DiagramConfig {
            inset_tick: 0.0,
            ..DiagramConfig::default()
        };
        let source = rect(400.0, 400.0, 20.0, 10.0);
        let target = rect(700.0, 50.0, 40.0, 40.0);
        let lines = route(&layout(), &[reference(source, target), reference(source, target)], &config);
        assert_ne!(lines[0].inset_y(), lines[1].inset_y());
    }

    #[test]
    fn test_layout_normalized() {
        let mut page = layout();
        page.overlay = rect(50.0, 20.0, 1000.0, 600.0);
        let n = page.normalized();
        assert_eq!(n.overlay, rect(0.0, 0.0, 1000.0, 600.0));
        assert_eq!(n.keyboard, rect(50.0, -20.0, 800.0, 600.0));
        assert!((n.keyboard_center_x() - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_path() {
        let line = RoutedLine {
            kind: ConnectionKind::Selected,
            side: None,
            points: vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(5.0, 10.0)],
        };
        assert_eq!(line.to_path().elements().len(), 3);
    }

    #[test]
    fn test_short_reference_line_has_no_runs() {
        let line = RoutedLine {
            kind: ConnectionKind::Reference,
            side: Some(Side::Right),
            points: vec![Point::new(1.0, 2.0)],
        };
        assert_eq!(line.inset_y(), None);
        assert_eq!(line.margin_x(), None);

        let line = RoutedLine {
            points: vec![Point::new(1.0, 2.0), Point::new(1.0, 7.0)],
            ..line
        };
        assert_eq!(line.inset_y(), Some(7.0));
        assert_eq!(line.margin_x(), None);
        assert!(RoutedLine { points: Vec::new(), ..line }.to_path().elements().is_empty());
    }
}
