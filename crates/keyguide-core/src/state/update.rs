//! Transaction input for the state store.

use super::Snapshot;
use crate::connection::Connection;
use crate::model::KeyId;
use std::collections::VecDeque;
use thiserror::Error;

/// Reasons a transaction is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("Unknown keymap '{0}'")]
    UnknownKeymap(String),
    #[error("Layer index {index} out of range for keymap '{keymap}' ({count} layers)")]
    LayerOutOfRange {
        keymap: String,
        index: usize,
        count: usize,
    },
    #[error("Unknown guide '{guide}' in keymap '{keymap}'")]
    UnknownGuide { keymap: String, guide: String },
    #[error("Guide step {index} out of range for guide '{guide}' ({count} steps)")]
    GuideStepOutOfRange {
        guide: String,
        index: usize,
        count: usize,
    },
    #[error("Guide step {0} given but no guide is active")]
    GuideStepWithoutGuide(usize),
    #[error("Key '{key}' is not on keyboard model '{model}'")]
    UnknownKey { key: String, model: String },
}

/// Result type for store transactions.
pub type UpdateResult<T> = Result<T, UpdateError>;

/// A partial set of fields to apply in one transaction.
///
/// `None` leaves a field to the cascading resolution rules. An empty
/// `guide_id` clears the guide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub debug: Option<u8>,
    pub keymap_id: Option<String>,
    pub layer: Option<usize>,
    pub guide_id: Option<String>,
    pub guide_step: Option<usize>,
    pub selected_key: Option<KeyId>,
    pub connections: Option<Vec<Connection>>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn debug(mut self, level: u8) -> Self {
        self.debug = Some(level);
        self
    }

    pub fn keymap(mut self, id: impl Into<String>) -> Self {
        self.keymap_id = Some(id.into());
        self
    }

    pub fn layer(mut self, index: usize) -> Self {
        self.layer = Some(index);
        self
    }

    pub fn guide(mut self, id: impl Into<String>) -> Self {
        self.guide_id = Some(id.into());
        self
    }

    pub fn clear_guide(self) -> Self {
        self.guide("")
    }

    pub fn step(mut self, index: usize) -> Self {
        self.guide_step = Some(index);
        self
    }

    pub fn select(mut self, key: impl Into<KeyId>) -> Self {
        self.selected_key = Some(key.into());
        self
    }

    pub fn connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = Some(connections);
        self
    }

    /// Clear the field `err` rejected so the rest of the update can be
    /// retried. Returns `false` when that field was not set here.
    pub fn drop_rejected(&mut self, err: &UpdateError) -> bool {
        match err {
            UpdateError::UnknownKeymap(_) => self.keymap_id.take().is_some(),
            UpdateError::LayerOutOfRange { .. } => self.layer.take().is_some(),
            UpdateError::UnknownGuide { .. } => self.guide_id.take().is_some(),
            UpdateError::GuideStepOutOfRange { .. } | UpdateError::GuideStepWithoutGuide(_) => {
                self.guide_step.take().is_some()
            }
            UpdateError::UnknownKey { .. } => self.selected_key.take().is_some(),
        }
    }

    /// Move one step forward in the active guide, if there is a next step.
    pub fn next_step(snapshot: &Snapshot<'_>) -> Option<Self> {
        let guide = snapshot.guide()?;
        let step = snapshot.guide_step_index()?;
        (!guide.is_last(step)).then(|| Self::new().step(step + 1))
    }

    /// Move one step back in the active guide, if there is a previous step.
    pub fn previous_step(snapshot: &Snapshot<'_>) -> Option<Self> {
        snapshot.guide()?;
        let step = snapshot.guide_step_index()?;
        step.checked_sub(1).map(|prev| Self::new().step(prev))
    }
}

/// Updates queued by observers while a notification is in progress.
///
/// They run as separate transactions once every observer has been notified.
#[derive(Debug, Default)]
pub struct UpdateQueue {
    pending: VecDeque<Update>,
}

impl UpdateQueue {
    pub fn push(&mut self, update: Update) {
        self.pending.push_back(update);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn pop(&mut self) -> Option<Update> {
        self.pending.pop_front()
    }

    pub(crate) fn append(&mut self, other: &mut UpdateQueue) {
        self.pending.append(&mut other.pending);
    }
}
