//! Application errors.

use keyguide_core::{ModelError, UpdateError};
use keyguide_render::RenderError;
use thiserror::Error;

/// Errors surfaced by the application shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No keyboard is registered for model '{model}' (needed by keymap '{keymap}')")]
    MissingKeyboard { keymap: String, model: String },
    #[error("Failed to read scene: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scene file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid keyboard data: {0}")]
    Model(#[from] ModelError),
    #[error("Update rejected: {0}")]
    Update(#[from] UpdateError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
