//! The `Sketch` trait every composition implements.
//!
//! The trait is object-safe so the host loop and the CLI can drive any sketch
//! as `dyn Sketch`.

use fresco_core::{FrescoError, Shape};
use serde_json::Value;

use crate::raster::Raster;

/// A self-contained generative composition.
///
/// The host calls [`Sketch::setup`] once, then [`Sketch::draw`] once per
/// frame. Static sketches are drawn exactly once.
pub trait Sketch {
    /// Prepares the canvas before the first frame (background, blend mode).
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError>;

    /// Advances the composition by one frame and paints it.
    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError>;

    /// Vector geometry of the current frame in canvas coordinates, used for
    /// SVG export and plotting.
    fn shapes(&self) -> Vec<Shape>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters: type, default, range and description.
    fn param_schema(&self) -> Value;

    /// Whether a single frame is the whole composition.
    fn is_static(&self) -> bool {
        false
    }

    /// Text rendering of the current frame, for sketches that have one.
    fn text(&self) -> Option<String> {
        None
    }
}
