//! Physical keyboard models.

use super::{ModelError, ModelResult};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_key_size() -> f64 {
    1.0
}

/// One physical key position, in key units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalKey {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_key_size")]
    pub width: f64,
    #[serde(default = "default_key_size")]
    pub height: f64,
}

impl PhysicalKey {
    /// Create a 1x1 key at the given unit position.
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width: 1.0,
            height: 1.0,
        }
    }

    /// Set the key size in units.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Bounds of this key in unit space.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// A set of physical key positions and sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub keys: Vec<PhysicalKey>,
}

impl KeyboardModel {
    pub fn new(id: impl Into<String>, keys: Vec<PhysicalKey>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            keys,
        }
    }

    /// Reject models that define a key id twice.
    pub fn validate(&self) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for key in &self.keys {
            if !seen.insert(key.id.as_str()) {
                return Err(ModelError::DuplicatePhysicalKey {
                    model: self.id.clone(),
                    key: key.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.iter().any(|k| k.id == key_id)
    }

    /// Union of all key bounds, in key units.
    pub fn bounds(&self) -> Rect {
        self.keys
            .iter()
            .map(PhysicalKey::bounds)
            .reduce(|acc, r| acc.union(r))
            .unwrap_or(Rect::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_physical_key_rejected() {
        let model = KeyboardModel::new(
            "split",
            vec![PhysicalKey::new("a", 0.0, 0.0), PhysicalKey::new("a", 1.0, 0.0)],
        );
        assert_eq!(
            model.validate(),
            Err(ModelError::DuplicatePhysicalKey {
                model: "split".to_string(),
                key: "a".to_string()
            })
        );
    }

    #[test]
    fn test_bounds_union() {
        let model = KeyboardModel::new(
            "split",
            vec![
                PhysicalKey::new("a", 0.0, 0.0),
                PhysicalKey::new("b", 3.0, 1.0).with_size(2.0, 1.0),
            ],
        );
        assert_eq!(model.bounds(), Rect::new(0.0, 0.0, 5.0, 2.0));
    }

    #[test]
    fn test_deserialize_default_size() {
        let key: PhysicalKey = serde_json::from_str(r#"{"id":"k","x":2,"y":3}"#).unwrap();
        assert!((key.width - 1.0).abs() < f64::EPSILON);
        assert!((key.height - 1.0).abs() < f64::EPSILON);
    }
}
