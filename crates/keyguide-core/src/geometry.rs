//! Geometry helpers for moving rectangles between coordinate spaces.
//!
//! Rectangles are plain `kurbo` values. Every helper here returns a new value
//! and never touches its inputs, so one rectangle can be shared by several
//! consumers in the same frame.

use kurbo::{Point, Rect, Vec2};

/// Translate `rect` so it is expressed relative to `origin`'s top-left corner.
///
/// Used to turn page-space bounding boxes into drawing-surface coordinates.
pub fn normalize(rect: Rect, origin: Rect) -> Rect {
    rect - origin_offset(origin)
}

fn origin_offset(origin: Rect) -> Vec2 {
    Vec2::new(origin.x0, origin.y0)
}

/// Build a rectangle from its top-left corner and size.
pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::new(x, y, x + width, y + height)
}

/// Horizontal midpoint of a rectangle.
pub fn center_x(rect: Rect) -> f64 {
    (rect.x0 + rect.x1) / 2.0
}

/// Midpoint of the top edge.
pub fn top_center(rect: Rect) -> Point {
    Point::new(center_x(rect), rect.y0)
}

/// Midpoint of the bottom edge.
pub fn bottom_center(rect: Rect) -> Point {
    Point::new(center_x(rect), rect.y1)
}

/// Midpoint of the left edge.
pub fn left_center(rect: Rect) -> Point {
    Point::new(rect.x0, rect.center().y)
}

/// Midpoint of the right edge.
pub fn right_center(rect: Rect) -> Point {
    Point::new(rect.x1, rect.center().y)
}
