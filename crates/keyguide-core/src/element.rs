//! Rendered element tree as seen by the connector collector and router.
//!
//! The host renders keys and the info panel however it likes and exposes the
//! result through [`ElementTree`]: element ids, a tag per element, and page
//! space bounding rectangles.

use crate::model::KeyId;
use kurbo::Rect;
use std::collections::HashMap;

/// Element id of the key-info title.
pub const TITLE_ANCHOR: &str = "keyinfo-title";

/// Element id of a physical key on the keyboard.
pub fn key_anchor(key_id: &str) -> String {
    format!("key-{key_id}")
}

/// Element id of the n-th reference marker rendered in the info panel.
pub fn reference_anchor(index: usize) -> String {
    format!("keyinfo-ref-{index}")
}

/// What kind of thing an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementTag {
    /// A physical key on the keyboard.
    PhysicalKey,
    /// A reference marker inside rendered text.
    Reference,
    /// The key-info title.
    Title,
    /// Any other region (panel, margins).
    Region,
}

/// One rendered element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub tag: ElementTag,
    /// Key this element stands for (physical keys and reference markers).
    pub key_id: Option<KeyId>,
    /// Bounding box in page coordinates.
    pub rect: Rect,
}

impl Element {
    pub fn new(id: impl Into<String>, tag: ElementTag, rect: Rect) -> Self {
        Self {
            id: id.into(),
            tag,
            key_id: None,
            rect,
        }
    }

    pub fn with_key(mut self, key_id: impl Into<KeyId>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }
}

/// Read access to the rendered visual tree.
pub trait ElementTree {
    /// Look up an element by id.
    fn element(&self, id: &str) -> Option<&Element>;

    /// All elements carrying `tag`, in document order.
    fn tagged(&self, tag: ElementTag) -> Vec<&Element>;

    /// Bounding rectangle of an element, if it is rendered.
    fn bounding_rect(&self, id: &str) -> Option<Rect> {
        self.element(id).map(|e| e.rect)
    }
}

/// Simple insertion-ordered element tree.
#[derive(Debug, Clone, Default)]
pub struct SceneTree {
    elements: Vec<Element>,
    index: HashMap<String, usize>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element; replacing keeps the original order slot.
    pub fn insert(&mut self, element: Element) {
        match self.index.get(&element.id) {
            Some(&slot) => self.elements[slot] = element,
            None => {
                self.index.insert(element.id.clone(), self.elements.len());
                self.elements.push(element);
            }
        }
    }

    /// Remove every element with the given tag.
    pub fn remove_tagged(&mut self, tag: ElementTag) {
        self.elements.retain(|e| e.tag != tag);
        self.reindex();
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn reindex(&mut self) {
        self.index = self
            .elements
            .iter()
            .enumerate()
            .map(|(slot, e)| (e.id.clone(), slot))
            .collect();
    }
}

impl ElementTree for SceneTree {
    fn element(&self, id: &str) -> Option<&Element> {
        self.index.get(id).map(|&slot| &self.elements[slot])
    }

    fn tagged(&self, tag: ElementTag) -> Vec<&Element> {
        self.elements.iter().filter(|e| e.tag == tag).collect()
    }
}
