//! Error type for plotter requests.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotterError {
    /// The address is malformed or the server could not be reached.
    #[error("cannot connect to plotter at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// The connection failed after it was established.
    #[error("plotter request to {path} failed: {source}")]
    Send {
        path: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    #[error("cannot encode plotter request: {0}")]
    Encode(#[from] serde_json::Error),

    /// A configuration file could not be read or parsed.
    #[error("plotter config: {0}")]
    Config(String),
}
