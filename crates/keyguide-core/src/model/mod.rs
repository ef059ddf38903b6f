//! Keyboard reference data model.
//!
//! Authored records (`*Spec` types, keyboard models) come in through serde and
//! are validated once into the read-only [`Catalog`]. Every structural problem
//! is reported here, at construction time, as a [`ModelError`].

mod catalog;
mod guide;
mod keyboard;
mod keymap;

pub use catalog::Catalog;
pub use guide::{Guide, GuideSpec, GuideStep, GuideStepSpec};
pub use keyboard::{KeyboardModel, PhysicalKey};
pub use keymap::{Key, KeySpec, Keymap, KeymapSpec, Layer, LayerSpec, Legend};

use thiserror::Error;

/// Identifier of a physical key (e.g. `l-f-1-1`).
pub type KeyId = String;

/// Structural errors in authored keyboard data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Keyboard model '{model}' defines key '{key}' more than once")]
    DuplicatePhysicalKey { model: String, key: String },
    #[error("Keyboard model '{0}' is registered more than once")]
    DuplicateKeyboard(String),
    #[error("Keymap '{keymap}' references keyboard model '{keyboard}' which is not registered")]
    MissingKeyboard { keymap: String, keyboard: String },
    #[error("Keymap id '{0}' is used more than once")]
    DuplicateKeymap(String),
    #[error("Keymap '{0}' has no layers")]
    NoLayers(String),
    #[error("Layer '{layer}' defines key '{key}' more than once")]
    DuplicateKey { layer: String, key: String },
    #[error("Layer '{layer}' defines key '{key}' which is not on keyboard model '{model}'")]
    UnknownLayerKey { layer: String, key: String, model: String },
    #[error("Key '{key}' selects '{selected}' which is not on keyboard model '{model}'")]
    UnknownSelectionKey { key: String, selected: String, model: String },
    #[error("Guide id '{guide}' is used more than once in keymap '{keymap}'")]
    DuplicateGuide { keymap: String, guide: String },
    #[error("Guide '{0}' has no steps")]
    EmptyGuide(String),
    #[error("Guide '{guide}' step {step} names key '{key}' which is not on the keyboard model")]
    UnknownGuideKey { guide: String, step: usize, key: String },
    #[error("Catalog contains no keymaps")]
    EmptyCatalog,
}

/// Result type for model construction.
pub type ModelResult<T> = Result<T, ModelError>;
