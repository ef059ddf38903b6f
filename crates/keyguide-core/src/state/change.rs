//! Change records delivered to observers.

use crate::connection::Connection;
use crate::model::KeyId;

/// The resolvable fields of the UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Debug,
    Keymap,
    Layer,
    Guide,
    GuideStep,
    SelectedKey,
    Connections,
}

/// One field that changed in a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Debug { old: u8, new: u8 },
    Keymap { old: String, new: String },
    /// Also reported when only the keymap changed, since layer identity is
    /// scoped to its keymap.
    Layer { old: usize, new: usize },
    Guide { old: Option<String>, new: Option<String> },
    GuideStep { old: Option<usize>, new: Option<usize> },
    SelectedKey { old: KeyId, new: KeyId },
    Connections { old: Vec<Connection>, new: Vec<Connection> },
}

impl Change {
    pub fn field(&self) -> Field {
        match self {
            Change::Debug { .. } => Field::Debug,
            Change::Keymap { .. } => Field::Keymap,
            Change::Layer { .. } => Field::Layer,
            Change::Guide { .. } => Field::Guide,
            Change::GuideStep { .. } => Field::GuideStep,
            Change::SelectedKey { .. } => Field::SelectedKey,
            Change::Connections { .. } => Field::Connections,
        }
    }
}

/// All changes produced by one transaction, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub(crate) fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    pub fn get(&self, field: Field) -> Option<&Change> {
        self.changes.iter().find(|c| c.field() == field)
    }

    /// Whether the visible key-info text or the active key may differ.
    pub fn affects_info(&self) -> bool {
        self.changes.iter().any(|c| {
            matches!(
                c.field(),
                Field::Keymap | Field::Layer | Field::Guide | Field::GuideStep | Field::SelectedKey
            )
        })
    }

    /// Whether anything persisted in the query string may differ.
    pub fn affects_query(&self) -> bool {
        self.changes.iter().any(|c| c.field() != Field::Connections)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
