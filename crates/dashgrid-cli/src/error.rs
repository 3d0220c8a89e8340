use std::path::PathBuf;

use dashgrid_layout::LayoutError;
use dashgrid_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("logging setup failed: {message}")]
    Logging { message: String },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Usage and input problems exit with 64/65 (`EX_USAGE`/`EX_DATAERR`),
    /// an explicit [`CliError::Exit`] carries its own code, anything else is 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            Self::InvalidArgument { .. } => 64,
            Self::Json(_) | Self::Layout(_) => 65,
            Self::Store(StoreError::Layout(_) | StoreError::UnknownCard { .. }) => 65,
            _ => 1,
        }
    }

    #[must_use]
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
