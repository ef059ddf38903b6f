//! Scene files: keyboard data plus page geometry and configuration.

use std::path::Path;

use keyguide_core::model::{KeyboardModel, KeymapSpec};
use keyguide_core::{Catalog, QueryConfig};
use keyguide_render::DiagramConfig;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::host::SceneHost;

/// Page geometry used by the headless host, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page position of the overlay's top-left corner.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Size of one key unit.
    pub key_unit: f64,
    /// Space between neighbouring key caps.
    pub key_gap: f64,
    /// Width of each connector margin.
    pub margin_width: f64,
    pub padding: f64,
    /// Space between keyboard and info panel.
    pub panel_gap: f64,
    pub min_panel_height: f64,
    pub title_height: f64,
    /// Fixed advance of one title character.
    pub title_advance: f64,
    /// Fixed advance of one body character.
    pub char_advance: f64,
    pub line_height: f64,
    pub paragraph_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            key_unit: 54.0,
            key_gap: 4.0,
            margin_width: 80.0,
            padding: 16.0,
            panel_gap: 24.0,
            min_panel_height: 160.0,
            title_height: 28.0,
            title_advance: 12.0,
            char_advance: 7.0,
            line_height: 20.0,
            paragraph_gap: 8.0,
        }
    }
}

/// Everything needed to run the reference headlessly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub keyboards: Vec<KeyboardModel>,
    pub keymaps: Vec<KeymapSpec>,
    /// Keyboard models the host can draw; every model in `keyboards` when absent.
    #[serde(default)]
    pub hosted: Option<Vec<String>>,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub diagram: DiagramConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl SceneConfig {
    /// Load a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        log::info!("Loading scene from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate the keyboard data into a catalog.
    pub fn catalog(&self) -> AppResult<Catalog> {
        Ok(Catalog::new(self.keyboards.clone(), self.keymaps.clone())?)
    }

    /// Headless host with the hosted keyboards registered.
    pub fn host(&self) -> SceneHost {
        let mut host = SceneHost::new(self.layout.clone());
        match &self.hosted {
            Some(ids) => ids.iter().for_each(|id| host.register_keyboard(id.clone())),
            None => self
                .keyboards
                .iter()
                .for_each(|k| host.register_keyboard(k.id.clone())),
        }
        host
    }
}
