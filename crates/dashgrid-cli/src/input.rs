use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use dashgrid_layout::{Layout, PlacementTable};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CliError, Result};

/// `-` means stdin.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_text(path: &Path) -> Result<String> {
    let read_error = |source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    };
    if is_stdin(path) {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(read_error)?;
        Ok(text)
    } else {
        fs::read_to_string(path).map_err(read_error)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_text(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read a layout (a JSON array of cards) from a file or stdin.
pub fn read_layout(path: &Path) -> Result<Layout> {
    let layout: Layout = read_json(path)?;
    debug!(path = %path.display(), items = layout.len(), "read layout");
    Ok(layout)
}

pub fn read_placements(path: &Path) -> Result<PlacementTable> {
    read_json(path)
}

/// Write `text` to `path`, or to `out` when no path is given.
pub fn emit(path: Option<&PathBuf>, out: &mut dyn Write, text: &str) -> Result<()> {
    match path {
        Some(path) if !is_stdin(path) => {
            fs::write(path, text)?;
            debug!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        _ => out.write_all(text.as_bytes())?,
    }
    Ok(())
}
