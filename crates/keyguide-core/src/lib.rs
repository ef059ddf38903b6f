//! keyguide Core Library
//!
//! Platform-agnostic data model, reactive UI state and connector collection
//! for the interactive keyboard reference.

pub mod collector;
pub mod connection;
pub mod element;
pub mod geometry;
pub mod markup;
pub mod model;
pub mod query;
pub mod state;

pub use collector::{CollectWarning, Collection, InfoMode, InfoPanel, Paragraph, Span, collect, render_info};
pub use connection::{Connection, ConnectionKind, ConnectionPair};
pub use element::{Element, ElementTag, ElementTree, SceneTree, TITLE_ANCHOR, key_anchor, reference_anchor};
pub use model::{Catalog, Keymap, ModelError, ModelResult};
pub use query::{Attributes, ParamBag, QueryConfig, QuerySync};
pub use state::{Change, ChangeSet, Field, Observer, ObserverId, Snapshot, Store, Update, UpdateError, UpdateQueue};
