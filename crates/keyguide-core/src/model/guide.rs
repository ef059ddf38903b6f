//! Guides: authored walkthroughs over a keymap.

use super::keyboard::KeyboardModel;
use super::{KeyId, ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Authored guide step.
///
/// A step naming a `key` reuses that key's description; otherwise `title`
/// and `text` are shown as free-standing narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideStepSpec {
    #[serde(default)]
    pub key: Option<KeyId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub selection: Option<Vec<KeyId>>,
}

/// Authored guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideSpec {
    pub id: String,
    pub name: String,
    pub steps: Vec<GuideStepSpec>,
}

/// A validated guide step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideStep {
    /// Points at a key and shows its description.
    Key {
        key_id: KeyId,
        selection: Option<Vec<KeyId>>,
    },
    /// Free-standing narrative.
    Text {
        title: String,
        paragraphs: Vec<String>,
        selection: Option<Vec<KeyId>>,
    },
}

impl GuideStep {
    pub fn key_id(&self) -> Option<&str> {
        match self {
            GuideStep::Key { key_id, .. } => Some(key_id),
            GuideStep::Text { .. } => None,
        }
    }

    /// Selection-group override carried by the step itself.
    pub fn selection(&self) -> Option<&[KeyId]> {
        match self {
            GuideStep::Key { selection, .. } | GuideStep::Text { selection, .. } => {
                selection.as_deref()
            }
        }
    }
}

/// An ordered walkthrough of a keymap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guide {
    pub id: String,
    pub name: String,
    pub steps: Vec<GuideStep>,
}

impl Guide {
    pub fn build(spec: GuideSpec, model: &KeyboardModel) -> ModelResult<Self> {
        if spec.steps.is_empty() {
            return Err(ModelError::EmptyGuide(spec.id));
        }

        let mut steps = Vec::with_capacity(spec.steps.len());
        for (index, step) in spec.steps.into_iter().enumerate() {
            let named = step.key.iter().chain(step.selection.iter().flatten());
            for key in named {
                if !model.contains(key) {
                    return Err(ModelError::UnknownGuideKey {
                        guide: spec.id,
                        step: index,
                        key: key.clone(),
                    });
                }
            }

            steps.push(match step.key {
                Some(key_id) => GuideStep::Key {
                    key_id,
                    selection: step.selection,
                },
                None => GuideStep::Text {
                    title: step.title.unwrap_or_default(),
                    paragraphs: step.text,
                    selection: step.selection,
                },
            });
        }

        Ok(Self {
            id: spec.id,
            name: spec.name,
            steps,
        })
    }

    pub fn step(&self, index: usize) -> Option<&GuideStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_first(&self, index: usize) -> bool {
        index == 0
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhysicalKey;

    fn model() -> KeyboardModel {
        KeyboardModel::new("mini", vec![PhysicalKey::new("a", 0.0, 0.0)])
    }

    #[test]
    fn test_step_kinds() {
        let guide = Guide::build(
            GuideSpec {
                id: "g".into(),
                name: "Tour".into(),
                steps: vec![
                    GuideStepSpec {
                        title: Some("Intro".into()),
                        text: vec!["Welcome".into()],
                        ..Default::default()
                    },
                    GuideStepSpec {
                        key: Some("a".into()),
                        ..Default::default()
                    },
                ],
            },
            &model(),
        )
        .unwrap();

        assert_eq!(guide.len(), 2);
        assert_eq!(guide.step(0).unwrap().key_id(), None);
        assert_eq!(guide.step(1).unwrap().key_id(), Some("a"));
        assert!(guide.is_first(0));
        assert!(guide.is_last(1));
        assert!(!guide.is_last(0));
    }

    #[test]
    fn test_empty_guide_rejected() {
        let err = Guide::build(
            GuideSpec {
                id: "g".into(),
                name: "Tour".into(),
                steps: Vec::new(),
            },
            &model(),
        )
        .unwrap_err();
        assert_eq!(err, ModelError::EmptyGuide("g".into()));
    }

    #[test]
    fn test_unknown_step_key_rejected() {
        let err = Guide::build(
            GuideSpec {
                id: "g".into(),
                name: "Tour".into(),
                steps: vec![GuideStepSpec {
                    selection: Some(vec!["nope".into()]),
                    ..Default::default()
                }],
            },
            &model(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnknownGuideKey { step: 0, ref key, .. } if key == "nope"));
    }
}
