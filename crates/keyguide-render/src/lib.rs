//! keyguide Render Library
//!
//! Connector routing and the overlay renderer for keyguide.
//! Strokes go to a [`Surface`]; the recording surface backs SVG export and
//! the optional vello surface draws on the GPU.

pub mod diagram;
pub mod recording;
mod renderer;
pub mod router;
pub mod svg;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use diagram::{DiagramRenderer, Phase};
pub use recording::{RecordedStroke, RecordingSurface};
pub use renderer::{DiagramConfig, LineStyle, RenderError, RenderResult, Surface};
pub use router::{DiagramLayout, RoutedLine, Side, route};
pub use svg::to_svg;

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloSurface;
