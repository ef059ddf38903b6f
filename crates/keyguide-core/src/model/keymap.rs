//! Keymaps, layers and keys.

use super::guide::{Guide, GuideSpec};
use super::keyboard::KeyboardModel;
use super::{KeyId, ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Short legend printed on a key cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Legend {
    Text(String),
    /// Image source (URL or asset path).
    Image(String),
}

impl Legend {
    pub fn text(&self) -> Option<&str> {
        match self {
            Legend::Text(text) => Some(text),
            Legend::Image(_) => None,
        }
    }
}

/// Authored key definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpec {
    pub id: KeyId,
    pub name: String,
    #[serde(default)]
    pub legend: Option<Legend>,
    /// Description paragraphs; may embed reference markers.
    #[serde(default)]
    pub text: Vec<String>,
    /// Other keys highlighted together with this one.
    #[serde(default)]
    pub selection: Vec<KeyId>,
}

impl KeySpec {
    pub fn new(id: impl Into<KeyId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            legend: None,
            text: Vec::new(),
            selection: Vec::new(),
        }
    }

    pub fn with_legend(mut self, legend: Legend) -> Self {
        self.legend = Some(legend);
        self
    }

    pub fn with_text(mut self, paragraph: impl Into<String>) -> Self {
        self.text.push(paragraph.into());
        self
    }

    pub fn with_selection(mut self, keys: &[&str]) -> Self {
        self.selection = keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

/// A validated key on a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub id: KeyId,
    pub name: String,
    pub legend: Option<Legend>,
    pub paragraphs: Vec<String>,
    pub selection: Vec<KeyId>,
    /// True when the layer did not define this physical key.
    pub unset: bool,
}

impl Key {
    fn from_spec(spec: KeySpec) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            legend: spec.legend,
            paragraphs: spec.text,
            selection: spec.selection,
            unset: false,
        }
    }

    /// Placeholder for a physical key the layer leaves undefined.
    pub fn unset(id: impl Into<KeyId>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            legend: None,
            paragraphs: Vec::new(),
            selection: Vec::new(),
            unset: true,
        }
    }

    /// Text used when another paragraph refers to this key.
    pub fn label(&self) -> &str {
        self.legend
            .as_ref()
            .and_then(Legend::text)
            .unwrap_or(&self.name)
    }
}

/// Authored layer definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    #[serde(default)]
    pub welcome: Vec<String>,
    #[serde(default)]
    pub keys: Vec<KeySpec>,
}

/// One complete assignment of keys for a keyboard model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub welcome: Vec<String>,
    keys: HashMap<KeyId, Key>,
}

impl Layer {
    /// Validate a layer against its keyboard model.
    ///
    /// Physical keys the layer definition leaves out get an unset placeholder.
    pub fn build(spec: LayerSpec, model: &KeyboardModel) -> ModelResult<Self> {
        let mut keys = HashMap::with_capacity(model.keys.len());
        for key in spec.keys {
            if !model.contains(&key.id) {
                return Err(ModelError::UnknownLayerKey {
                    layer: spec.name,
                    key: key.id,
                    model: model.id.clone(),
                });
            }
            if let Some(selected) = key.selection.iter().find(|id| !model.contains(id)) {
                return Err(ModelError::UnknownSelectionKey {
                    key: key.id.clone(),
                    selected: selected.clone(),
                    model: model.id.clone(),
                });
            }
            if keys.contains_key(&key.id) {
                return Err(ModelError::DuplicateKey {
                    layer: spec.name,
                    key: key.id,
                });
            }
            keys.insert(key.id.clone(), Key::from_spec(key));
        }

        for physical in &model.keys {
            keys.entry(physical.id.clone())
                .or_insert_with(|| Key::unset(physical.id.clone()));
        }

        Ok(Self {
            name: spec.name,
            welcome: spec.welcome,
            keys,
        })
    }

    pub fn key(&self, id: &str) -> Option<&Key> {
        self.keys.get(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Authored keymap definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapSpec {
    pub id: String,
    pub name: String,
    /// Keyboard model id.
    pub keyboard: String,
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub guides: Vec<GuideSpec>,
}

/// A named, complete keyboard layout.
#[derive(Debug, Clone)]
pub struct Keymap {
    pub id: String,
    pub name: String,
    pub keyboard: Arc<KeyboardModel>,
    pub layers: Vec<Layer>,
    pub guides: Vec<Guide>,
}

impl Keymap {
    pub fn build(spec: KeymapSpec, keyboard: Arc<KeyboardModel>) -> ModelResult<Self> {
        if spec.layers.is_empty() {
            return Err(ModelError::NoLayers(spec.id));
        }

        let layers = spec
            .layers
            .into_iter()
            .map(|layer| Layer::build(layer, &keyboard))
            .collect::<ModelResult<Vec<_>>>()?;

        let mut guide_ids = HashSet::new();
        let mut guides = Vec::with_capacity(spec.guides.len());
        for guide in spec.guides {
            if !guide_ids.insert(guide.id.clone()) {
                return Err(ModelError::DuplicateGuide {
                    keymap: spec.id,
                    guide: guide.id,
                });
            }
            guides.push(Guide::build(guide, &keyboard)?);
        }

        Ok(Self {
            id: spec.id,
            name: spec.name,
            keyboard,
            layers,
            guides,
        })
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn guide(&self, id: &str) -> Option<&Guide> {
        self.guides.iter().find(|g| g.id == id)
    }
}
