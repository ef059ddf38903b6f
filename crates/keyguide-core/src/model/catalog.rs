//! The set of known keyboards and keymaps.

use super::keyboard::KeyboardModel;
use super::keymap::{Keymap, KeymapSpec};
use super::{ModelError, ModelResult};
use std::collections::HashSet;
use std::sync::Arc;

/// Read-only collection of every keymap the UI can display.
///
/// Built once at startup; all structural validation happens in [`Catalog::new`].
#[derive(Debug, Clone)]
pub struct Catalog {
    keyboards: Vec<Arc<KeyboardModel>>,
    keymaps: Vec<Keymap>,
}

impl Catalog {
    pub fn new(keyboards: Vec<KeyboardModel>, keymaps: Vec<KeymapSpec>) -> ModelResult<Self> {
        let mut keyboard_ids = HashSet::new();
        for keyboard in &keyboards {
            keyboard.validate()?;
            if !keyboard_ids.insert(keyboard.id.clone()) {
                return Err(ModelError::DuplicateKeyboard(keyboard.id.clone()));
            }
        }
        let keyboards: Vec<Arc<KeyboardModel>> = keyboards.into_iter().map(Arc::new).collect();

        if keymaps.is_empty() {
            return Err(ModelError::EmptyCatalog);
        }

        let mut keymap_ids = HashSet::new();
        let mut built = Vec::with_capacity(keymaps.len());
        for spec in keymaps {
            if !keymap_ids.insert(spec.id.clone()) {
                return Err(ModelError::DuplicateKeymap(spec.id));
            }
            let keyboard = keyboards
                .iter()
                .find(|k| k.id == spec.keyboard)
                .cloned()
                .ok_or_else(|| ModelError::MissingKeyboard {
                    keymap: spec.id.clone(),
                    keyboard: spec.keyboard.clone(),
                })?;
            built.push(Keymap::build(spec, keyboard)?);
        }

        log::debug!(
            "Catalog ready: {} keyboards, {} keymaps",
            keyboards.len(),
            built.len()
        );

        Ok(Self {
            keyboards,
            keymaps: built,
        })
    }

    pub fn keymaps(&self) -> &[Keymap] {
        &self.keymaps
    }

    pub fn keyboards(&self) -> &[Arc<KeyboardModel>] {
        &self.keyboards
    }

    pub fn keymap(&self, id: &str) -> Option<&Keymap> {
        self.keymaps.iter().find(|k| k.id == id)
    }

    pub fn keymap_index(&self, id: &str) -> Option<usize> {
        self.keymaps.iter().position(|k| k.id == id)
    }

    /// The keymap shown when nothing else is requested.
    pub fn default_keymap(&self) -> &Keymap {
        &self.keymaps[0]
    }

    /// First keymap built for the given keyboard model.
    pub fn first_keymap_for_board(&self, board: &str) -> Option<&Keymap> {
        self.keymaps.iter().find(|k| k.keyboard.id == board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayerSpec, PhysicalKey};

    fn keyboard(id: &str) -> KeyboardModel {
        KeyboardModel::new(id, vec![PhysicalKey::new("a", 0.0, 0.0)])
    }

    fn keymap(id: &str, board: &str) -> KeymapSpec {
        KeymapSpec {
            id: id.to_string(),
            name: id.to_uppercase(),
            keyboard: board.to_string(),
            layers: vec![LayerSpec {
                name: "base".into(),
                welcome: Vec::new(),
                keys: Vec::new(),
            }],
            guides: Vec::new(),
        }
    }

    #[test]
    fn test_lookup_and_default() {
        let catalog = Catalog::new(
            vec![keyboard("k1"), keyboard("k2")],
            vec![keymap("m1", "k1"), keymap("m2", "k2"), keymap("m3", "k2")],
        )
        .unwrap();
        assert_eq!(catalog.default_keymap().id, "m1");
        assert_eq!(catalog.keymap_index("m3"), Some(2));
        assert_eq!(catalog.first_keymap_for_board("k2").unwrap().id, "m2");
        assert!(catalog.keymap("zz").is_none());
    }

    #[test]
    fn test_missing_keyboard_is_fatal() {
        let err = Catalog::new(vec![keyboard("k1")], vec![keymap("m1", "k9")]).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingKeyboard {
                keymap: "m1".into(),
                keyboard: "k9".into()
            }
        );
    }

    #[test]
    fn test_duplicate_keymap_rejected() {
        let err = Catalog::new(vec![keyboard("k1")], vec![keymap("m1", "k1"), keymap("m1", "k1")])
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicateKeymap("m1".into()));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(
            Catalog::new(vec![keyboard("k1")], Vec::new()).unwrap_err(),
            ModelError::EmptyCatalog
        );
    }
}
