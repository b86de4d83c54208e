//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: sketch error (unknown sketch, bad dimensions, degenerate geometry)
//! - 11: I/O error (PNG, SVG, seed or frame writes)
//! - 12: input error (bad palette, bad JSON params, missing sketch name)
//! - 13: serialization error
//! - 14: plotter error (unreachable server, bad plotter config)

use fresco_core::FrescoError;
use fresco_plotter::PlotterError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    Sketch(FrescoError),
    Io(String),
    Input(String),
    Serialization(String),
    Plotter(PlotterError),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sketch(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Plotter(_) => 14,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Sketch(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
            CliError::Plotter(e) => write!(f, "{e}"),
        }
    }
}

impl From<FrescoError> for CliError {
    fn from(e: FrescoError) -> Self {
        match e {
            FrescoError::Io(msg) => CliError::Io(msg),
            other => CliError::Sketch(other),
        }
    }
}

impl From<PlotterError> for CliError {
    fn from(e: PlotterError) -> Self {
        CliError::Plotter(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
