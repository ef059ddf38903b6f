//! keyguide Application
//!
//! The application shell: scene loading, the headless host, and the
//! controller that ties the state store to the connector overlay.

mod controller;
mod error;
mod host;
mod scene;

pub use controller::Controller;
pub use error::{AppError, AppResult};
pub use host::{Host, KEYBOARD_REGION, PANEL_REGION, SceneHost};
pub use scene::{LayoutConfig, SceneConfig};
