//! Hosts render the keyboard and the info panel and expose the result as an
//! element tree.
//!
//! [`SceneHost`] is the headless host: keys are laid out from the keyboard
//! model on a fixed unit grid and panel text uses fixed-advance glyphs, so
//! every rectangle is deterministic.

use std::collections::HashSet;
use std::sync::Arc;

use keyguide_core::model::{KeyId, KeyboardModel};
use keyguide_core::{
    Element, ElementTag, ElementTree, InfoPanel, Keymap, SceneTree, Span, TITLE_ANCHOR, key_anchor,
};
use keyguide_render::DiagramLayout;
use kurbo::{Rect, Size};

use crate::error::{AppError, AppResult};
use crate::scene::LayoutConfig;

/// Element id of the whole keyboard region.
pub const KEYBOARD_REGION: &str = "keyboard";
/// Element id of the info panel region.
pub const PANEL_REGION: &str = "keyinfo";

/// What the controller needs from whatever draws the page.
pub trait Host: ElementTree {
    /// Swap the rendered keyboard to the keymap's model.
    ///
    /// Fails when no keyboard implementation is registered for the model.
    fn show_keyboard(&mut self, keymap: &Keymap) -> AppResult<()>;

    /// Render the info panel and its reference markers.
    fn show_info(&mut self, panel: &InfoPanel);

    /// Current page regions for the connector overlay.
    fn diagram_layout(&self) -> DiagramLayout;
}

/// Deterministic host that keeps its elements in a [`SceneTree`].
#[derive(Debug, Clone)]
pub struct SceneHost {
    layout: LayoutConfig,
    registered: HashSet<String>,
    tree: SceneTree,
    keyboard: Option<Arc<KeyboardModel>>,
    panel: Option<InfoPanel>,
    keyboard_rect: Rect,
    panel_rect: Rect,
    highlighted: Vec<KeyId>,
}

impl SceneHost {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            registered: HashSet::new(),
            tree: SceneTree::new(),
            keyboard: None,
            panel: None,
            keyboard_rect: Rect::ZERO,
            panel_rect: Rect::ZERO,
            highlighted: Vec::new(),
        }
    }

    /// Declare that this host can draw keyboard model `id`.
    pub fn register_keyboard(&mut self, id: impl Into<String>) {
        self.registered.insert(id.into());
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.registered.contains(id)
    }

    /// Model id of the keyboard currently shown.
    pub fn keyboard_id(&self) -> Option<&str> {
        self.keyboard.as_deref().map(|model| model.id.as_str())
    }

    /// Keys highlighted by the last info panel.
    pub fn highlighted(&self) -> &[KeyId] {
        &self.highlighted
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Lay the shown keyboard and panel out again with new metrics, as a
    /// page reflow would. Nothing is redrawn until the next resize or update.
    pub fn relayout(&mut self, layout: LayoutConfig) {
        self.layout = layout;
        if let Some(model) = self.keyboard.clone() {
            self.layout_keys(&model);
        }
        if let Some(panel) = self.panel.take() {
            self.show_info(&panel);
        }
    }

    fn content_x(&self) -> f64 {
        self.layout.origin_x + self.layout.margin_width
    }

    fn layout_keys(&mut self, model: &KeyboardModel) {
        let l = &self.layout;
        let bounds = model.bounds();
        let x0 = self.content_x() + l.padding;
        let y0 = l.origin_y + l.padding;

        self.tree.remove_tagged(ElementTag::PhysicalKey);
        for key in &model.keys {
            let rect = Rect::new(
                x0 + (key.x - bounds.x0) * l.key_unit,
                y0 + (key.y - bounds.y0) * l.key_unit,
                x0 + (key.x - bounds.x0 + key.width) * l.key_unit - l.key_gap,
                y0 + (key.y - bounds.y0 + key.height) * l.key_unit - l.key_gap,
            );
            self.tree
                .insert(Element::new(key_anchor(&key.id), ElementTag::PhysicalKey, rect).with_key(key.id.clone()));
        }

        self.keyboard_rect = Rect::new(
            self.content_x(),
            l.origin_y,
            self.content_x() + bounds.width() * l.key_unit + 2.0 * l.padding,
            l.origin_y + bounds.height() * l.key_unit + 2.0 * l.padding,
        );
        self.tree
            .insert(Element::new(KEYBOARD_REGION, ElementTag::Region, self.keyboard_rect));
    }
}

/// Places fixed-advance runs left to right, wrapping at the right edge.
struct TextCursor {
    left: f64,
    right: f64,
    x: f64,
    y: f64,
    line_height: f64,
}

impl TextCursor {
    fn place(&mut self, width: f64) -> Rect {
        if self.x > self.left && self.x + width > self.right {
            self.new_line();
        }
        let rect = Rect::new(self.x, self.y, self.x + width, self.y + self.line_height);
        self.x += width;
        rect
    }

    fn new_line(&mut self) {
        self.x = self.left;
        self.y += self.line_height;
    }
}

impl Host for SceneHost {
    fn show_keyboard(&mut self, keymap: &Keymap) -> AppResult<()> {
        let model = &keymap.keyboard;
        if !self.registered.contains(&model.id) {
            return Err(AppError::MissingKeyboard {
                keymap: keymap.id.clone(),
                model: model.id.clone(),
            });
        }
        if self.keyboard_id() == Some(model.id.as_str()) {
            return Ok(());
        }
        log::debug!("Showing keyboard '{}' for keymap '{}'", model.id, keymap.id);
        self.layout_keys(model);
        self.keyboard = Some(Arc::clone(model));
        Ok(())
    }

    fn show_info(&mut self, panel: &InfoPanel) {
        let l = self.layout.clone();
        let left = self.keyboard_rect.x0 + l.padding;
        let top = self.keyboard_rect.y1 + l.panel_gap;
        let right = (self.keyboard_rect.x1 - l.padding).max(left);

        self.tree.remove_tagged(ElementTag::Title);
        self.tree.remove_tagged(ElementTag::Reference);

        let title_width = panel.title.chars().count() as f64 * l.title_advance;
        self.tree.insert(Element::new(
            TITLE_ANCHOR,
            ElementTag::Title,
            Rect::new(left, top + l.padding, left + title_width, top + l.padding + l.title_height),
        ));

        let mut cursor = TextCursor {
            left,
            right,
            x: left,
            y: top + l.padding + l.title_height + l.paragraph_gap,
            line_height: l.line_height,
        };
        for paragraph in &panel.paragraphs {
            for span in &paragraph.spans {
                match span {
                    Span::Text(text) => {
                        for word in text.split_inclusive(' ') {
                            cursor.place(word.chars().count() as f64 * l.char_advance);
                        }
                    }
                    Span::Reference { anchor, key_id, label } => {
                        let rect = cursor.place(label.chars().count() as f64 * l.char_advance);
                        self.tree
                            .insert(Element::new(anchor.clone(), ElementTag::Reference, rect).with_key(key_id.clone()));
                    }
                }
            }
            cursor.new_line();
            cursor.y += l.paragraph_gap;
        }

        let bottom = (cursor.y + l.padding).max(top + l.min_panel_height);
        self.panel_rect = Rect::new(self.keyboard_rect.x0, top, self.keyboard_rect.x1, bottom);
        self.tree
            .insert(Element::new(PANEL_REGION, ElementTag::Region, self.panel_rect));
        self.highlighted = panel.highlighted.clone();
        self.panel = Some(panel.clone());
    }

    fn diagram_layout(&self) -> DiagramLayout {
        let l = &self.layout;
        let content = self.keyboard_rect.union(self.panel_rect);
        let width = content.width() + 2.0 * l.margin_width;
        let height = (content.y1 - l.origin_y + l.padding).max(0.0);
        let overlay = Rect::from_origin_size((l.origin_x, l.origin_y), Size::new(width, height));

        DiagramLayout {
            overlay,
            keyboard: Rect::new(self.content_x(), overlay.y0, self.content_x() + content.width(), overlay.y1),
            left_margin: Rect::new(overlay.x0, overlay.y0, overlay.x0 + l.margin_width, overlay.y1),
            right_margin: Rect::new(overlay.x1 - l.margin_width, overlay.y0, overlay.x1, overlay.y1),
        }
    }
}

impl ElementTree for SceneHost {
    fn element(&self, id: &str) -> Option<&Element> {
        self.tree.element(id)
    }

    fn tagged(&self, tag: ElementTag) -> Vec<&Element> {
        self.tree.tagged(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyguide_core::model::{KeySpec, KeymapSpec, LayerSpec, PhysicalKey};
    use keyguide_core::{Catalog, InfoMode, Paragraph};

    fn catalog() -> Catalog {
        let board = KeyboardModel::new(
            "split",
            vec![
                PhysicalKey::new("a", 0.0, 0.0),
                PhysicalKey::new("b", 1.0, 0.0),
                PhysicalKey::new("c", 9.0, 1.0).with_size(2.0, 1.0),
            ],
        );
        let keymap = KeymapSpec {
            id: "base".into(),
            name: "Base".into(),
            keyboard: "split".into(),
            layers: vec![LayerSpec {
                name: "Main".into(),
                welcome: Vec::new(),
                keys: vec![KeySpec::new("a", "Alpha")],
            }],
            guides: Vec::new(),
        };
        Catalog::new(vec![board], vec![keymap]).unwrap()
    }

    fn panel(spans: Vec<Span>) -> InfoPanel {
        InfoPanel {
            mode: InfoMode::Key,
            title: "Alpha".into(),
            key_id: Some("a".into()),
            paragraphs: vec![Paragraph { spans }],
            guide: None,
            highlighted: vec!["a".into()],
        }
    }

    fn reference(n: usize, key: &str, label: &str) -> Span {
        Span::Reference {
            anchor: keyguide_core::reference_anchor(n),
            key_id: key.into(),
            label: label.into(),
        }
    }

    #[test]
    fn test_unregistered_keyboard_is_fatal() {
        let catalog = catalog();
        let mut host = SceneHost::new(LayoutConfig::default());
        let err = host.show_keyboard(catalog.default_keymap()).unwrap_err();
        assert!(matches!(err, AppError::MissingKeyboard { ref model, .. } if model == "split"));
        assert!(host.keyboard_id().is_none());
    }

    #[test]
    fn test_key_layout() {
        let catalog = catalog();
        let mut host = SceneHost::new(LayoutConfig::default());
        host.register_keyboard("split");
        host.show_keyboard(catalog.default_keymap()).unwrap();

        // margin 80 + padding 16, unit 54, gap 4
        assert_eq!(host.bounding_rect("key-a"), Some(Rect::new(96.0, 16.0, 146.0, 66.0)));
        assert_eq!(host.bounding_rect("key-c"), Some(Rect::new(582.0, 70.0, 686.0, 120.0)));
        assert_eq!(host.tagged(ElementTag::PhysicalKey).len(), 3);
        assert_eq!(host.element("key-b").unwrap().key_id.as_deref(), Some("b"));
        assert_eq!(host.bounding_rect(KEYBOARD_REGION), Some(Rect::new(80.0, 0.0, 706.0, 140.0)));
    }

    #[test]
    fn test_info_layout_places_markers() {
        let catalog = catalog();
        let mut host = SceneHost::new(LayoutConfig::default());
        host.register_keyboard("split");
        host.show_keyboard(catalog.default_keymap()).unwrap();
        host.show_info(&panel(vec![Span::Text("See ".into()), reference(0, "c", "Cee")]));

        let title = host.bounding_rect(TITLE_ANCHOR).unwrap();
        assert_eq!(title, Rect::new(96.0, 180.0, 156.0, 208.0));
        let marker = host.element("keyinfo-ref-0").unwrap();
        assert_eq!(marker.key_id.as_deref(), Some("c"));
        assert_eq!(marker.rect, Rect::new(124.0, 216.0, 145.0, 236.0));
        assert_eq!(host.highlighted(), ["a".to_string()]);
    }

    #[test]
    fn test_show_info_replaces_markers() {
        let catalog = catalog();
        let mut host = SceneHost::new(LayoutConfig::default());
        host.register_keyboard("split");
        host.show_keyboard(catalog.default_keymap()).unwrap();
        host.show_info(&panel(vec![reference(0, "b", "B"), reference(1, "c", "C")]));
        assert_eq!(host.tagged(ElementTag::Reference).len(), 2);

        host.show_info(&panel(vec![Span::Text("nothing".into())]));
        assert!(host.tagged(ElementTag::Reference).is_empty());
        assert!(host.bounding_rect(TITLE_ANCHOR).is_some());
    }

    #[test]
    fn test_long_text_wraps() {
        let catalog = catalog();
        let mut host = SceneHost::new(LayoutConfig::default());
        host.register_keyboard("split");
        host.show_keyboard(catalog.default_keymap()).unwrap();
        let long = "word ".repeat(60);
        host.show_info(&panel(vec![Span::Text(long), reference(0, "c", "Cee")]));

        let marker = host.bounding_rect("keyinfo-ref-0").unwrap();
        assert!(marker.y0 > 216.0);
        assert!(marker.x1 <= 706.0 - 16.0);
    }

    #[test]
    fn test_diagram_layout() {
        let catalog = catalog();
        let mut host = SceneHost::new(LayoutConfig::default());
        host.register_keyboard("split");
        host.show_keyboard(catalog.default_keymap()).unwrap();
        host.show_info(&panel(Vec::new()));

        let layout = host.diagram_layout();
        // keyboard 80..706, panel below it down to 164 + 160
        assert_eq!(layout.overlay, Rect::new(0.0, 0.0, 786.0, 340.0));
        assert_eq!(layout.keyboard, Rect::new(80.0, 0.0, 706.0, 340.0));
        assert_eq!(layout.left_margin, Rect::new(0.0, 0.0, 80.0, 340.0));
        assert_eq!(layout.right_margin, Rect::new(706.0, 0.0, 786.0, 340.0));
    }

    #[test]
    fn test_relayout_moves_keys_and_markers() {
        let catalog = catalog();
        let mut host = SceneHost::new(LayoutConfig::default());
        host.register_keyboard("split");
        host.show_keyboard(catalog.default_keymap()).unwrap();
        host.show_info(&panel(vec![reference(0, "b", "Beta")]));
        let marker = host.bounding_rect(&keyguide_core::reference_anchor(0)).unwrap();

        host.relayout(LayoutConfig {
            key_unit: 80.0,
            ..LayoutConfig::default()
        });
        assert_eq!(host.keyboard_id(), Some("split"));
        assert_eq!(host.bounding_rect(&key_anchor("a")), Some(Rect::new(96.0, 16.0, 172.0, 92.0)));
        assert_eq!(host.bounding_rect(&key_anchor("b")), Some(Rect::new(176.0, 16.0, 252.0, 92.0)));
        let moved = host.bounding_rect(&keyguide_core::reference_anchor(0)).unwrap();
        assert!(moved.y0 > marker.y0);
    }
}
