//! Connector descriptions and their resolved, concrete form.

use crate::element::ElementTree;
use crate::geometry::{self, bottom_center, center_x, left_center, right_center, top_center};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Which kind of connector a pair of anchors forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    /// A reference marker in text pointing at the key it names.
    Reference,
    /// The key-info title pointing at the active key.
    Selected,
}

/// An anchor pair, by element identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub kind: ConnectionKind,
}

impl Connection {
    pub fn reference(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: ConnectionKind::Reference,
        }
    }

    pub fn selected(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: ConnectionKind::Selected,
        }
    }
}

/// A connection with both anchors resolved to rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionPair {
    pub kind: ConnectionKind,
    pub source: Rect,
    pub target: Rect,
}

impl ConnectionPair {
    /// Resolve both anchors against the rendered tree.
    ///
    /// Returns `None` when either anchor is not rendered.
    pub fn resolve(connection: &Connection, tree: &dyn ElementTree) -> Option<Self> {
        let source = tree.bounding_rect(&connection.source)?;
        let target = tree.bounding_rect(&connection.target)?;
        Some(Self {
            kind: connection.kind,
            source,
            target,
        })
    }

    /// Same pair expressed relative to `origin`.
    pub fn normalized(&self, origin: Rect) -> Self {
        Self {
            kind: self.kind,
            source: geometry::normalize(self.source, origin),
            target: geometry::normalize(self.target, origin),
        }
    }

    /// Horizontal position used to pick the margin side.
    pub fn target_x(&self) -> f64 {
        center_x(self.target)
    }

    /// Line endpoints for a reference connector.
    ///
    /// The line leaves the marker from its bottom edge and enters the key from
    /// the side facing the chosen margin.
    pub fn reference_endpoints(&self, right_margin: bool) -> (Point, Point) {
        let target = if right_margin {
            right_center(self.target)
        } else {
            left_center(self.target)
        };
        (bottom_center(self.source), target)
    }

    /// Line endpoints for the selected-key connector.
    ///
    /// Leaves the title on the edge facing the key and enters the key on the
    /// edge facing the title.
    pub fn selected_endpoints(&self) -> (Point, Point) {
        if self.target.center().y < self.source.center().y {
            (top_center(self.source), bottom_center(self.target))
        } else {
            (bottom_center(self.source), top_center(self.target))
        }
    }
}
