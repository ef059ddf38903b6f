//! Key-info text rendering and connector collection.
//!
//! [`render_info`] turns the current state into the text model for the info
//! panel; the host lays it out. [`collect`] then scans the rendered tree for
//! reference markers and produces the connections to draw.

use crate::connection::Connection;
use crate::element::{ElementTag, ElementTree, TITLE_ANCHOR, key_anchor, reference_anchor};
use crate::markup::{self, Segment};
use crate::model::{GuideStep, Key, KeyId, Layer};
use crate::state::Snapshot;
use thiserror::Error;

/// What the info panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoMode {
    /// No key and no guide: the layer's welcome text.
    Welcome,
    /// A key's description (selected, or named by a guide step).
    Key,
    /// A free-standing guide step.
    GuideText,
}

/// A run of rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    /// A reference marker; `anchor` is the element id the host must use.
    Reference {
        anchor: String,
        key_id: KeyId,
        label: String,
    },
}

/// One rendered paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub spans: Vec<Span>,
}

impl Paragraph {
    /// Paragraph text with reference labels inlined.
    pub fn plain_text(&self) -> String {
        self.spans
            .iter()
            .map(|span| match span {
                Span::Text(text) => text.as_str(),
                Span::Reference { label, .. } => label.as_str(),
            })
            .collect()
    }
}

/// Position within the active guide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidePosition {
    pub guide_id: String,
    pub guide_name: String,
    pub index: usize,
    pub count: usize,
}

impl GuidePosition {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }
}

/// Text model for the key-info panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPanel {
    pub mode: InfoMode,
    pub title: String,
    /// The key whose description is shown, if any.
    pub key_id: Option<KeyId>,
    pub paragraphs: Vec<Paragraph>,
    pub guide: Option<GuidePosition>,
    /// Keys to highlight on the keyboard.
    pub highlighted: Vec<KeyId>,
}

impl InfoPanel {
    /// All reference spans, in document order.
    pub fn references(&self) -> impl Iterator<Item = (&str, &str)> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.spans.iter())
            .filter_map(|span| match span {
                Span::Reference { anchor, key_id, .. } => Some((anchor.as_str(), key_id.as_str())),
                Span::Text(_) => None,
            })
    }
}

/// Render the info panel for the current state.
pub fn render_info(snapshot: &Snapshot<'_>) -> InfoPanel {
    let layer = snapshot.layer();
    let guide = snapshot.guide().zip(snapshot.guide_step_index()).map(|(g, index)| GuidePosition {
        guide_id: g.id.clone(),
        guide_name: g.name.clone(),
        index,
        count: g.len(),
    });
    let step = snapshot.guide_step();
    let step_selection = step.and_then(GuideStep::selection);
    let mut refs = 0;

    if let Some(key_id) = snapshot.active_key_id() {
        let key = layer.key(key_id);
        let paragraphs = key
            .map(|k| render_paragraphs(&k.paragraphs, layer, &mut refs))
            .unwrap_or_default();
        let mut highlighted = vec![key_id.to_string()];
        let group = step_selection.or(key.map(|k| k.selection.as_slice()));
        for id in group.into_iter().flatten() {
            if !highlighted.contains(id) {
                highlighted.push(id.clone());
            }
        }
        return InfoPanel {
            mode: InfoMode::Key,
            title: key.map_or_else(|| key_id.to_string(), |k| k.name.clone()),
            key_id: Some(key_id.to_string()),
            paragraphs,
            guide,
            highlighted,
        };
    }

    if let Some(GuideStep::Text { title, paragraphs, .. }) = step {
        return InfoPanel {
            mode: InfoMode::GuideText,
            title: title.clone(),
            key_id: None,
            paragraphs: render_paragraphs(paragraphs, layer, &mut refs),
            guide,
            highlighted: step_selection.map(<[KeyId]>::to_vec).unwrap_or_default(),
        };
    }

    InfoPanel {
        mode: InfoMode::Welcome,
        title: layer.name.clone(),
        key_id: None,
        paragraphs: render_paragraphs(&layer.welcome, layer, &mut refs),
        guide: None,
        highlighted: Vec::new(),
    }
}

fn render_paragraphs(source: &[String], layer: &Layer, refs: &mut usize) -> Vec<Paragraph> {
    source
        .iter()
        .map(|paragraph| Paragraph {
            spans: markup::parse(paragraph)
                .into_iter()
                .map(|segment| match segment {
                    Segment::Text(text) => Span::Text(text.to_string()),
                    Segment::Reference { key_id, label } => {
                        let anchor = reference_anchor(*refs);
                        *refs += 1;
                        let label = label
                            .or_else(|| layer.key(key_id).map(Key::label))
                            .unwrap_or(key_id);
                        Span::Reference {
                            anchor,
                            key_id: key_id.to_string(),
                            label: label.to_string(),
                        }
                    }
                })
                .collect(),
        })
        .collect()
}

/// Non-fatal problems found while collecting connections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectWarning {
    #[error("Reference '{anchor}' names key '{key_id}' which is not on the keyboard")]
    DanglingReference { anchor: String, key_id: KeyId },
    #[error("Reference '{0}' does not name a key")]
    UntargetedReference(String),
}

/// Connections for one render, plus anything that had to be dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub connections: Vec<Connection>,
    pub warnings: Vec<CollectWarning>,
}

/// Collect the connections for the current state from the rendered tree.
///
/// Only a shown key produces connections: one selected connection from the
/// title to the key, and one reference connection per rendered marker whose
/// key exists. Welcome text and narrative guide steps produce none.
pub fn collect(snapshot: &Snapshot<'_>, tree: &dyn ElementTree) -> Collection {
    let mut collection = Collection::default();
    let Some(active) = snapshot.active_key_id() else {
        return collection;
    };
    let keyboard = &snapshot.keymap().keyboard;

    collection
        .connections
        .push(Connection::selected(TITLE_ANCHOR, key_anchor(active)));

    for marker in tree.tagged(ElementTag::Reference) {
        let Some(key_id) = marker.key_id.as_deref() else {
            collection
                .warnings
                .push(CollectWarning::UntargetedReference(marker.id.clone()));
            continue;
        };
        let target = key_anchor(key_id);
        if !keyboard.contains(key_id) || tree.element(&target).is_none() {
            collection.warnings.push(CollectWarning::DanglingReference {
                anchor: marker.id.clone(),
                key_id: key_id.to_string(),
            });
            continue;
        }
        collection
            .connections
            .push(Connection::reference(marker.id.clone(), target));
    }

    for warning in &collection.warnings {
        log::warn!("{}", warning);
    }
    collection
}
