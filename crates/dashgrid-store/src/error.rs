use std::path::PathBuf;

use dashgrid_layout::LayoutError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("unsupported layout schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("snapshot at {path} belongs to key {found:?}, not {expected:?}")]
    KeyMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("unknown card: {id}")]
    UnknownCard { id: String },

    #[error("invalid store key: {message}")]
    InvalidKey { message: String },
}
