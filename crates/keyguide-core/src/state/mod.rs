//! Reactive UI state: what keymap, layer, guide and key are on screen.
//!
//! The [`Store`] is the single owner of [`UiState`]. It is changed only through
//! [`Store::apply_update`], which resolves a whole transaction against one
//! consistent snapshot before touching anything, then notifies observers once.

mod change;
mod store;
mod update;

pub use change::{Change, ChangeSet, Field};
pub use store::{Observer, ObserverId, Store};
pub use update::{Update, UpdateError, UpdateQueue, UpdateResult};

use crate::connection::Connection;
use crate::model::{Catalog, Guide, GuideStep, KeyId, Keymap, Layer};

/// The store's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub(crate) debug: u8,
    /// Index into the catalog's keymaps.
    pub(crate) keymap: usize,
    pub(crate) layer: usize,
    /// Index into the active keymap's guides.
    pub(crate) guide: Option<usize>,
    pub(crate) guide_step: Option<usize>,
    pub(crate) selected_key: KeyId,
    pub(crate) connections: Vec<Connection>,
}

impl UiState {
    /// Startup defaults: first keymap, its first layer, no guide, no selection.
    pub(crate) fn initial() -> Self {
        Self {
            debug: 0,
            keymap: 0,
            layer: 0,
            guide: None,
            guide_step: None,
            selected_key: KeyId::new(),
            connections: Vec::new(),
        }
    }
}

/// Read-only view of the state together with the catalog it indexes into.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    state: &'a UiState,
    catalog: &'a Catalog,
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(state: &'a UiState, catalog: &'a Catalog) -> Self {
        Self { state, catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn debug(&self) -> u8 {
        self.state.debug
    }

    pub fn keymap(&self) -> &'a Keymap {
        &self.catalog.keymaps()[self.state.keymap]
    }

    pub fn keymap_id(&self) -> &'a str {
        &self.keymap().id
    }

    pub fn layer_index(&self) -> usize {
        self.state.layer
    }

    pub fn layer(&self) -> &'a Layer {
        &self.keymap().layers[self.state.layer]
    }

    pub fn guide(&self) -> Option<&'a Guide> {
        self.state.guide.map(|index| &self.keymap().guides[index])
    }

    pub fn guide_id(&self) -> Option<&'a str> {
        self.guide().map(|g| g.id.as_str())
    }

    pub fn guide_step_index(&self) -> Option<usize> {
        self.state.guide_step
    }

    pub fn guide_step(&self) -> Option<&'a GuideStep> {
        self.guide()?.step(self.state.guide_step?)
    }

    pub fn selected_key(&self) -> &'a str {
        &self.state.selected_key
    }

    /// The key whose description is shown: the guide step's key, else the
    /// selected key, else none.
    pub fn active_key_id(&self) -> Option<&'a str> {
        if let Some(key_id) = self.guide_step().and_then(GuideStep::key_id) {
            return Some(key_id);
        }
        Some(self.selected_key()).filter(|k| !k.is_empty())
    }

    pub fn connections(&self) -> &'a [Connection] {
        &self.state.connections
    }
}
