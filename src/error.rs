use std::io;

use thiserror::Error;

use crate::import::ImportError;

/// Terminal failures of an export. Anything recoverable on a per-block basis
/// is reported as a [`crate::LayoutWarning`] instead and never reaches here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("font error: {0}")]
    Font(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("export cancelled")]
    Cancelled,

    #[error(transparent)]
    Import(#[from] ImportError),
}
