//! Mapping between the UI state and URL query parameters.
//!
//! Parameter names are `<prefix>-board`, `<prefix>-map`, `<prefix>-layer`,
//! `<prefix>-key`, `<prefix>-guide`, `<prefix>-step` plus an unprefixed
//! `debug`. Malformed numbers are ignored, never fatal.
//!
//! [`Attributes`] are the values the page shows without any parameter. A
//! field equal to its attribute is left out of the URL, and an absent field
//! falls back to its attribute when read. An empty `key` or `guide` value
//! stands for "none" where the attribute names one.

use crate::model::Catalog;
use crate::state::{ChangeSet, Observer, Snapshot, Update, UpdateQueue};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Default parameter prefix.
pub const DEFAULT_PREFIX: &str = "kg";

/// Unprefixed debug flag.
pub const DEBUG_PARAM: &str = "debug";

const BOARD: &str = "board";
const MAP: &str = "map";
const LAYER: &str = "layer";
const KEY: &str = "key";
const GUIDE: &str = "guide";
const STEP: &str = "step";

/// Ordered bag of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBag {
    pairs: Vec<(String, String)>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `?a=1&b=2` (leading `?` or `#` optional, percent-encoding allowed).
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches(['?', '#']);
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// Serialize without a leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every value for `name` with a single one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.pairs.push((name, value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.pairs.retain(|(k, _)| k != name);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Values the host already shows without any parameter (e.g. page defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub board: Option<String>,
    pub keymap: Option<String>,
    pub layer: Option<usize>,
    pub key: Option<String>,
    pub guide: Option<String>,
    pub step: Option<usize>,
}

/// Query configuration: name prefix and fallback attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub prefix: String,
    pub attributes: Attributes,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            attributes: Attributes::default(),
        }
    }
}

/// Fields read from a parameter bag, before catalog resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFields {
    pub debug: Option<u8>,
    pub board: Option<String>,
    pub keymap: Option<String>,
    pub layer: Option<usize>,
    pub key: Option<String>,
    pub guide: Option<String>,
    pub step: Option<usize>,
}

impl QueryFields {
    /// Fill every absent field from `attrs`.
    ///
    /// A board named in the query outranks the keymap attribute, and the step
    /// attribute only applies while some guide is named.
    pub fn with_attributes(mut self, attrs: &Attributes) -> Self {
        if self.keymap.is_none() && self.board.is_none() {
            self.keymap = attrs.keymap.clone();
        }
        self.board = self.board.or_else(|| attrs.board.clone());
        self.layer = self.layer.or(attrs.layer);
        self.key = self.key.or_else(|| attrs.key.clone());
        self.guide = self.guide.or_else(|| attrs.guide.clone());
        if self.guide.as_deref().is_some_and(|g| !g.is_empty()) {
            self.step = self.step.or(attrs.step);
        }
        self
    }

    /// Turn the fields into a store transaction.
    ///
    /// `board` only matters when no keymap is named; it picks the first keymap
    /// built for that keyboard model.
    pub fn to_update(&self, catalog: &Catalog) -> Update {
        let keymap_id = self.keymap.clone().or_else(|| {
            let board = self.board.as_deref()?;
            let keymap = catalog.first_keymap_for_board(board);
            if keymap.is_none() {
                log::warn!("No keymap for board '{}' in query", board);
            }
            keymap.map(|k| k.id.clone())
        });

        Update {
            debug: self.debug,
            keymap_id,
            layer: self.layer,
            guide_id: self.guide.clone(),
            guide_step: self.step,
            selected_key: self.key.clone(),
            connections: None,
        }
    }
}

fn param(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}-{name}")
    }
}

fn parse_number<T: std::str::FromStr>(params: &ParamBag, name: &str) -> Option<T> {
    let raw = params.get(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("Ignoring malformed query parameter {}={}", name, raw);
            None
        }
    }
}

fn non_empty(params: &ParamBag, name: &str) -> Option<String> {
    params.get(name).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Read the known parameters under `prefix`.
pub fn read_from_source(params: &ParamBag, prefix: &str) -> QueryFields {
    QueryFields {
        debug: parse_number(params, DEBUG_PARAM),
        board: non_empty(params, &param(prefix, BOARD)),
        keymap: non_empty(params, &param(prefix, MAP)),
        layer: parse_number(params, &param(prefix, LAYER)),
        key: params.get(&param(prefix, KEY)).map(str::to_string),
        guide: params.get(&param(prefix, GUIDE)).map(str::to_string),
        step: parse_number(params, &param(prefix, STEP)),
    }
}

/// Write the state into a copy of `current`.
///
/// Unrelated parameters in `current` are kept. A parameter is only emitted
/// when its value differs from the matching attribute (or from the neutral
/// default when there is no attribute).
pub fn write_to_source(snapshot: &Snapshot<'_>, config: &QueryConfig, current: &ParamBag) -> ParamBag {
    let prefix = config.prefix.as_str();
    let attrs = &config.attributes;
    let mut params = current.clone();

    let mut emit = |name: &str, value: Option<String>| {
        let name = param(prefix, name);
        match value {
            Some(value) => params.set(name, value),
            None => params.remove(&name),
        }
    };

    let keymap = snapshot.keymap();
    let board = keymap.keyboard.id.as_str();
    emit(
        BOARD,
        attrs
            .board
            .as_deref()
            .filter(|b| *b != board)
            .map(|_| board.to_string()),
    );
    emit(
        MAP,
        (attrs.keymap.as_deref() != Some(keymap.id.as_str())).then(|| keymap.id.clone()),
    );

    let layer = snapshot.layer_index();
    emit(
        LAYER,
        (layer != attrs.layer.unwrap_or(0)).then(|| layer.to_string()),
    );

    // "none" only needs spelling out when an attribute would fill it in.
    let key = snapshot.selected_key();
    emit(
        KEY,
        if key.is_empty() {
            attrs.key.as_ref().map(|_| String::new())
        } else {
            (attrs.key.as_deref() != Some(key)).then(|| key.to_string())
        },
    );

    let guide = snapshot.guide_id();
    emit(
        GUIDE,
        match guide {
            Some(g) => (attrs.guide.as_deref() != Some(g)).then(|| g.to_string()),
            None => attrs.guide.as_ref().map(|_| String::new()),
        },
    );
    emit(
        STEP,
        snapshot
            .guide_step_index()
            .filter(|s| guide.is_some() && attrs.step != Some(*s))
            .map(|s| s.to_string()),
    );

    match snapshot.debug() {
        0 => params.remove(DEBUG_PARAM),
        level => params.set(DEBUG_PARAM, level.to_string()),
    }
    params
}

/// Observer that keeps a shared parameter bag in sync with the store.
pub struct QuerySync {
    config: QueryConfig,
    params: Rc<RefCell<ParamBag>>,
}

impl QuerySync {
    pub fn new(config: QueryConfig, params: Rc<RefCell<ParamBag>>) -> Self {
        Self { config, params }
    }

    /// Read the startup transaction from the shared bag, falling back to the
    /// configured attributes.
    pub fn initial_update(&self, catalog: &Catalog) -> Update {
        read_from_source(&self.params.borrow(), &self.config.prefix)
            .with_attributes(&self.config.attributes)
            .to_update(catalog)
    }
}

impl Observer for QuerySync {
    fn notify(&mut self, snapshot: &Snapshot<'_>, changes: &ChangeSet, _queue: &mut UpdateQueue) {
        if !changes.affects_query() {
            return;
        }
        let updated = write_to_source(snapshot, &self.config, &self.params.borrow());
        log::debug!("Query parameters now: {}", updated.to_query_string());
        *self.params.borrow_mut() = updated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GuideSpec, GuideStepSpec, KeyboardModel, KeymapSpec, LayerSpec, PhysicalKey};
    use crate::state::Store;
    use std::sync::Arc;

    fn catalog() -> Arc<Catalog> {
        let layer = |name: &str| LayerSpec {
            name: name.into(),
            welcome: Vec::new(),
            keys: Vec::new(),
        };
        let guide = GuideSpec {
            id: "tour".into(),
            name: "Tour".into(),
            steps: vec![
                GuideStepSpec::default(),
                GuideStepSpec {
                    key: Some("a".into()),
                    ..Default::default()
                },
            ],
        };
        Arc::new(
            Catalog::new(
                vec![
                    KeyboardModel::new("board1", vec![PhysicalKey::new("a", 0.0, 0.0)]),
                    KeyboardModel::new("board2", vec![PhysicalKey::new("a", 0.0, 0.0)]),
                ],
                vec![
                    KeymapSpec {
                        id: "m1".into(),
                        name: "One".into(),
                        keyboard: "board1".into(),
                        layers: vec![layer("base")],
                        guides: Vec::new(),
                    },
                    KeymapSpec {
                        id: "m2".into(),
                        name: "Two".into(),
                        keyboard: "board2".into(),
                        layers: vec![layer("base"), layer("nav")],
                        guides: vec![guide],
                    },
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_parse_and_serialize() {
        let bag = ParamBag::parse("?kg-map=m2&kg-key=l%2Df&x=1");
        assert_eq!(bag.get("kg-map"), Some("m2"));
        assert_eq!(bag.get("kg-key"), Some("l-f"));
        assert_eq!(bag.get("x"), Some("1"));
        assert_eq!(ParamBag::parse(&bag.to_query_string()), bag);
    }

    #[test]
    fn test_read_ignores_malformed_numbers() {
        let bag = ParamBag::parse("kg-layer=two&kg-step=-1&debug=yes&kg-map=m2");
        let fields = read_from_source(&bag, "kg");
        assert_eq!(fields.layer, None);
        assert_eq!(fields.step, None);
        assert_eq!(fields.debug, None);
        assert_eq!(fields.keymap.as_deref(), Some("m2"));
    }

    #[test]
    fn test_read_respects_prefix() {
        let bag = ParamBag::parse("kg-map=m1&other-map=m2&debug=1");
        let fields = read_from_source(&bag, "other");
        assert_eq!(fields.keymap.as_deref(), Some("m2"));
        assert_eq!(fields.debug, Some(1));
    }

    #[test]
    fn test_board_selects_first_keymap() {
        let catalog = catalog();
        let fields = read_from_source(&ParamBag::parse("kg-board=board2"), "kg");
        assert_eq!(fields.to_update(&catalog).keymap_id.as_deref(), Some("m2"));

        let fields = read_from_source(&ParamBag::parse("kg-board=board2&kg-map=m1"), "kg");
        assert_eq!(fields.to_update(&catalog).keymap_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_round_trip() {
        let catalog = catalog();
        let mut store = Store::new(Arc::clone(&catalog));
        store
            .apply_update(Update::new().keymap("m2").layer(1).guide("tour").step(1))
            .unwrap();

        let config = QueryConfig::default();
        let bag = write_to_source(&store.snapshot(), &config, &ParamBag::new());
        let update = read_from_source(&bag, &config.prefix).to_update(&catalog);

        let mut other = Store::new(catalog);
        other.apply_update(update).unwrap();
        let (a, b) = (store.snapshot(), other.snapshot());
        assert_eq!(a.keymap_id(), b.keymap_id());
        assert_eq!(a.layer_index(), b.layer_index());
        assert_eq!(a.guide_id(), b.guide_id());
        assert_eq!(a.guide_step_index(), b.guide_step_index());
        assert_eq!(a.selected_key(), b.selected_key());
    }

    #[test]
    fn test_round_trip_selected_key() {
        let catalog = catalog();
        let mut store = Store::new(Arc::clone(&catalog));
        store.apply_update(Update::new().select("a")).unwrap();

        let config = QueryConfig::default();
        let bag = write_to_source(&store.snapshot(), &config, &ParamBag::new());
        assert_eq!(bag.get("kg-key"), Some("a"));
        let update = read_from_source(&bag, "kg").to_update(&catalog);
        assert_eq!(update.selected_key.as_deref(), Some("a"));
    }

    #[test]
    fn test_attributes_suppress_parameters() {
        let catalog = catalog();
        let store = Store::new(catalog);
        let config = QueryConfig {
            prefix: "kg".into(),
            attributes: Attributes {
                keymap: Some("m1".into()),
                ..Default::default()
            },
        };
        let current = ParamBag::parse("kg-map=m2&kg-layer=1&keep=me");
        let bag = write_to_source(&store.snapshot(), &config, &current);
        assert_eq!(bag.get("kg-map"), None);
        assert_eq!(bag.get("kg-layer"), None);
        assert_eq!(bag.get("keep"), Some("me"));
        assert_eq!(bag.get(DEBUG_PARAM), None);
    }

    #[test]
    fn test_absent_fields_fall_back_to_attributes() {
        let catalog = catalog();
        let attrs = Attributes {
            keymap: Some("m2".into()),
            layer: Some(1),
            guide: Some("tour".into()),
            step: Some(1),
            ..Default::default()
        };
        let update = read_from_source(&ParamBag::new(), "kg")
            .with_attributes(&attrs)
            .to_update(&catalog);
        assert_eq!(update.keymap_id.as_deref(), Some("m2"));
        assert_eq!(update.layer, Some(1));
        assert_eq!(update.guide_id.as_deref(), Some("tour"));
        assert_eq!(update.guide_step, Some(1));

        // Query values win; a named board outranks the keymap attribute.
        let update = read_from_source(&ParamBag::parse("kg-board=board1&kg-layer=0&kg-guide="), "kg")
            .with_attributes(&attrs)
            .to_update(&catalog);
        assert_eq!(update.keymap_id.as_deref(), Some("m1"));
        assert_eq!(update.layer, Some(0));
        assert_eq!(update.guide_id.as_deref(), Some(""));
        assert_eq!(update.guide_step, None);
    }

    #[test]
    fn test_round_trip_with_attributes() {
        let catalog = catalog();
        let config = QueryConfig {
            prefix: "kg".into(),
            attributes: Attributes {
                keymap: Some("m2".into()),
                key: Some("a".into()),
                guide: Some("tour".into()),
                ..Default::default()
            },
        };
        let states = [
            Update::new().keymap("m2"),
            Update::new().keymap("m2").guide("tour").step(1),
            Update::new().keymap("m2").select("a"),
            Update::new().keymap("m1"),
        ];
        for target in states {
            let mut store = Store::new(Arc::clone(&catalog));
            store.apply_update(target).unwrap();
            let bag = write_to_source(&store.snapshot(), &config, &ParamBag::new());

            let mut reloaded = Store::new(Arc::clone(&catalog));
            let update = read_from_source(&bag, &config.prefix)
                .with_attributes(&config.attributes)
                .to_update(&catalog);
            reloaded.apply_update(update).unwrap();
            let (a, b) = (store.snapshot(), reloaded.snapshot());
            let query = bag.to_query_string();
            assert_eq!(a.keymap_id(), b.keymap_id(), "{query}");
            assert_eq!(a.guide_id(), b.guide_id(), "{query}");
            assert_eq!(a.guide_step_index(), b.guide_step_index(), "{query}");
            assert_eq!(a.selected_key(), b.selected_key(), "{query}");
        }
    }

    #[test]
    fn test_debug_written_unprefixed() {
        let mut store = Store::new(catalog());
        store.apply_update(Update::new().debug(2)).unwrap();
        let bag = write_to_source(&store.snapshot(), &QueryConfig::default(), &ParamBag::new());
        assert_eq!(bag.get("debug"), Some("2"));
    }

    #[test]
    fn test_observer_updates_shared_bag() {
        let catalog = catalog();
        let params = Rc::new(RefCell::new(ParamBag::parse("kg-map=m2&kg-layer=1")));
        let sync = QuerySync::new(QueryConfig::default(), Rc::clone(&params));

        let mut store = Store::new(Arc::clone(&catalog));
        let initial = sync.initial_update(&catalog);
        store.attach(Box::new(sync));
        store.apply_update(initial).unwrap();
        assert_eq!(store.snapshot().layer_index(), 1);

        store.apply_update(Update::new().layer(0)).unwrap();
        assert_eq!(params.borrow().get("kg-layer"), None);
        assert_eq!(params.borrow().get("kg-map"), Some("m2"));
    }
}
