#![deny(unsafe_code)]
//! Client for a pen-plotter control server on the local network.
//!
//! The server accepts JSON bodies on three endpoints: `/draw` (polylines),
//! `/config` (pen and motion settings) and `/canvas_size`. Requests are
//! fire-and-forget: only transport failures are errors, the response status
//! is logged and its body is never read.

pub mod client;
pub mod config;
pub mod error;

pub use client::PlotterClient;
pub use config::PlotterConfig;
pub use error::PlotterError;
