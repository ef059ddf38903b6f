//! The transactional state store and its observers.

use super::change::{Change, ChangeSet};
use super::update::{Update, UpdateError, UpdateQueue, UpdateResult};
use super::{Snapshot, UiState};
use crate::model::{Catalog, KeyId};
use std::sync::Arc;

/// Upper bound on observer-queued follow-up transactions per `apply_update`.
const MAX_QUEUED_UPDATES: usize = 64;

/// Receives one batch of changes per applied transaction.
///
/// Observers only get a read-only snapshot; further updates go through the
/// queue and run after the current notification round.
pub trait Observer {
    fn notify(&mut self, snapshot: &Snapshot<'_>, changes: &ChangeSet, queue: &mut UpdateQueue);
}

impl<F> Observer for F
where
    F: FnMut(&Snapshot<'_>, &ChangeSet, &mut UpdateQueue),
{
    fn notify(&mut self, snapshot: &Snapshot<'_>, changes: &ChangeSet, queue: &mut UpdateQueue) {
        self(snapshot, changes, queue)
    }
}

/// Handle returned by [`Store::attach`].
///
/// Slots are reused after a detach; the generation keeps a stale handle from
/// reaching the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId {
    index: usize,
    generation: u32,
}

#[derive(Default)]
struct ObserverSlot {
    generation: u32,
    observer: Option<Box<dyn Observer>>,
}

/// Single source of truth for selection and navigation state.
pub struct Store {
    catalog: Arc<Catalog>,
    state: UiState,
    observers: Vec<ObserverSlot>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Fully resolved target state of one transaction.
struct Resolved {
    state: UiState,
    keymap_changed: bool,
    guide_changed: bool,
}

impl Store {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            state: UiState::initial(),
            observers: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.state, &self.catalog)
    }

    pub fn attach(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        let index = match self.observers.iter().position(|slot| slot.observer.is_none()) {
            Some(index) => index,
            None => {
                self.observers.push(ObserverSlot::default());
                self.observers.len() - 1
            }
        };
        let slot = &mut self.observers[index];
        slot.observer = Some(observer);
        ObserverId {
            index,
            generation: slot.generation,
        }
    }

    /// Attach a closure observer.
    pub fn attach_fn<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Snapshot<'_>, &ChangeSet, &mut UpdateQueue) + 'static,
    {
        self.attach(Box::new(observer))
    }

    /// Stop notifying an observer. Returns it if it was still attached.
    pub fn detach(&mut self, id: ObserverId) -> Option<Box<dyn Observer>> {
        let slot = self
            .observers
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let observer = slot.observer.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        Some(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.iter().filter(|slot| slot.observer.is_some()).count()
    }

    /// Apply one transaction.
    ///
    /// The whole update is validated and resolved before anything changes; on
    /// error the state is untouched and nobody is notified. Updates queued by
    /// observers run afterwards as their own transactions; their failures are
    /// logged and do not affect the returned change set.
    pub fn apply_update(&mut self, update: Update) -> UpdateResult<ChangeSet> {
        let changes = self.apply_one(update).inspect_err(|e| {
            log::warn!("Rejected state update: {}", e);
        })?;
        let mut queue = self.notify(&changes);

        let mut processed = 0;
        while let Some(next) = queue.pop() {
            processed += 1;
            if processed > MAX_QUEUED_UPDATES {
                log::warn!(
                    "Dropping {} queued state updates after {} rounds",
                    queue.len() + 1,
                    MAX_QUEUED_UPDATES
                );
                break;
            }
            match self.apply_one(next) {
                Ok(follow_up) => queue.append(&mut self.notify(&follow_up)),
                Err(e) => log::warn!("Rejected queued state update: {}", e),
            }
        }

        Ok(changes)
    }

    fn apply_one(&mut self, update: Update) -> UpdateResult<ChangeSet> {
        if update.is_empty() {
            return Ok(ChangeSet::default());
        }
        let resolved = self.resolve(update)?;
        let changes = self.diff(&resolved);
        if !changes.is_empty() {
            self.state = resolved.state;
            log::debug!("Applied state update with {} changes", changes.len());
        }
        Ok(changes)
    }

    fn notify(&mut self, changes: &ChangeSet) -> UpdateQueue {
        let mut queue = UpdateQueue::default();
        if changes.is_empty() {
            return queue;
        }
        let snapshot = Snapshot::new(&self.state, &self.catalog);
        for observer in self.observers.iter_mut().filter_map(|slot| slot.observer.as_mut()) {
            observer.notify(&snapshot, changes, &mut queue);
        }
        queue
    }

    /// Resolve every field from the current state without mutating it.
    fn resolve(&self, update: Update) -> UpdateResult<Resolved> {
        let old = &self.state;
        let catalog = &self.catalog;

        let keymap_index = match update.keymap_id.as_deref() {
            Some(id) => catalog
                .keymap_index(id)
                .ok_or_else(|| UpdateError::UnknownKeymap(id.to_string()))?,
            None => old.keymap,
        };
        let keymap = &catalog.keymaps()[keymap_index];
        let keymap_changed = keymap_index != old.keymap;

        let layer = match update.layer {
            Some(index) if index >= keymap.layers.len() => {
                return Err(UpdateError::LayerOutOfRange {
                    keymap: keymap.id.clone(),
                    index,
                    count: keymap.layers.len(),
                });
            }
            Some(index) => index,
            None if keymap_changed => 0,
            None => old.layer,
        };
        let layer_changed = keymap_changed || layer != old.layer;

        let mut guide = match update.guide_id.as_deref() {
            Some("") => None,
            Some(id) => Some(keymap.guides.iter().position(|g| g.id == id).ok_or_else(|| {
                UpdateError::UnknownGuide {
                    keymap: keymap.id.clone(),
                    guide: id.to_string(),
                }
            })?),
            None if keymap_changed => None,
            None => old.guide,
        };
        let mut guide_changed = keymap_changed || guide != old.guide;

        let mut guide_step = match (update.guide_step, guide) {
            (Some(index), None) => return Err(UpdateError::GuideStepWithoutGuide(index)),
            (Some(index), Some(g)) => {
                let g = &keymap.guides[g];
                if index >= g.len() {
                    return Err(UpdateError::GuideStepOutOfRange {
                        guide: g.id.clone(),
                        index,
                        count: g.len(),
                    });
                }
                Some(index)
            }
            (None, g) if guide_changed => g.map(|_| 0),
            (None, _) => old.guide_step,
        };

        let explicit_key = update.selected_key.as_deref().filter(|k| !k.is_empty());
        if let Some(key) = explicit_key {
            if !keymap.keyboard.contains(key) {
                return Err(UpdateError::UnknownKey {
                    key: key.to_string(),
                    model: keymap.keyboard.id.clone(),
                });
            }
        }
        let selects_key = explicit_key.is_some();

        let selected_key = match update.selected_key {
            Some(key) => key,
            None if layer_changed || guide_changed => KeyId::new(),
            None => old.selected_key.clone(),
        };

        // Selecting a key and being in a guide are mutually exclusive.
        if selects_key && guide.is_some() {
            guide = None;
            guide_step = None;
            guide_changed = true;
        }

        Ok(Resolved {
            state: UiState {
                debug: update.debug.unwrap_or(old.debug),
                keymap: keymap_index,
                layer,
                guide,
                guide_step,
                selected_key,
                connections: update.connections.unwrap_or_else(|| old.connections.clone()),
            },
            keymap_changed,
            guide_changed,
        })
    }

    fn diff(&self, resolved: &Resolved) -> ChangeSet {
        let old = &self.state;
        let new = &resolved.state;
        let keymaps = self.catalog.keymaps();
        let guide_id = |keymap: usize, guide: Option<usize>| {
            guide.map(|g| keymaps[keymap].guides[g].id.clone())
        };

        let mut changes = ChangeSet::default();
        if new.debug != old.debug {
            changes.push(Change::Debug {
                old: old.debug,
                new: new.debug,
            });
        }
        if resolved.keymap_changed {
            changes.push(Change::Keymap {
                old: keymaps[old.keymap].id.clone(),
                new: keymaps[new.keymap].id.clone(),
            });
        }
        if resolved.keymap_changed || new.layer != old.layer {
            changes.push(Change::Layer {
                old: old.layer,
                new: new.layer,
            });
        }
        let guide_identity_changed =
            new.guide != old.guide || (resolved.keymap_changed && new.guide.is_some());
        if guide_identity_changed {
            changes.push(Change::Guide {
                old: guide_id(old.keymap, old.guide),
                new: guide_id(new.keymap, new.guide),
            });
        }
        let step_changed = new.guide_step != old.guide_step
            || (resolved.guide_changed && guide_identity_changed && new.guide_step.is_some());
        if step_changed {
            changes.push(Change::GuideStep {
                old: old.guide_step,
                new: new.guide_step,
            });
        }
        if new.selected_key != old.selected_key {
            changes.push(Change::SelectedKey {
                old: old.selected_key.clone(),
                new: new.selected_key.clone(),
            });
        }
        if new.connections != old.connections {
            changes.push(Change::Connections {
                old: old.connections.clone(),
                new: new.connections.clone(),
            });
        }
        changes
    }
}
