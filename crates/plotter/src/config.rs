//! Pen and motion settings sent to the plotter's `/config` endpoint.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlotterError;

/// Device settings. Positions and speeds are percentages of the device range.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterConfig {
    pub pen_pos_up: u8,
    pub pen_pos_down: u8,
    pub speed_pen_down: u8,
    pub speed_pen_up: u8,
    pub accel: u8,
    /// Paper name understood by the server, such as `"A4"` or `"letter"`.
    pub paper: String,
    /// Margin around the drawing in millimetres.
    pub margin: f64,
    pub landscape: bool,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            pen_pos_up: 60,
            pen_pos_down: 30,
            speed_pen_down: 25,
            speed_pen_up: 75,
            accel: 75,
            paper: "A4".to_string(),
            margin: 10.0,
            landscape: true,
        }
    }
}

impl PlotterConfig {
    /// Reads a JSON config file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, PlotterError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PlotterError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PlotterError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        log::debug!("loaded plotter config from {}", path.display());
        Ok(config)
    }

    /// Rejects percentages above 100 and a negative margin.
    pub fn validate(&self) -> Result<(), PlotterError> {
        let percentages = [
            ("pen_pos_up", self.pen_pos_up),
            ("pen_pos_down", self.pen_pos_down),
            ("speed_pen_down", self.speed_pen_down),
            ("speed_pen_up", self.speed_pen_up),
            ("accel", self.accel),
        ];
        if let Some((name, value)) = percentages.iter().find(|(_, v)| *v > 100) {
            return Err(PlotterError::Config(format!("{name} must be at most 100, got {value}")));
        }
        if self.margin.is_nan() || self.margin < 0.0 {
            return Err(PlotterError::Config(format!(
                "margin must be non-negative, got {}",
                self.margin
            )));
        }
        Ok(())
    }
}
