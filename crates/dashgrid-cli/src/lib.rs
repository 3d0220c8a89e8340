#![forbid(unsafe_code)]

//! `dashgrid` command-line front end.
//!
//! Layout files are JSON arrays of cards in the dashboard's own field names
//! (`i`/`id`, `x`, `y`, `w`, `h`, optional `minW`/`maxW`). Output goes to
//! stdout, logs to stderr.

pub mod cli;
pub mod error;
pub mod input;
pub mod logging;
pub mod presets;
pub mod render;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};
