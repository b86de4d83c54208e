//! Reproducible description of a rendered sketch.
//!
//! A [`Seed`] captures everything needed to render a composition again:
//! sketch name, canvas size, parameter overrides, PRNG seed and frame count.
//! Seeds are stored as JSON next to rendered images.

use crate::error::FrescoError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Reproducible render description.
///
/// Two identical seeds rendered by the same binary produce identical pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub sketch: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Seed {
    /// Creates a seed with empty params and zero frames.
    pub fn new(sketch: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            sketch: sketch.to_string(),
            width,
            height,
            params: empty_params(),
            seed,
            frames: 0,
        }
    }

    /// Rejects zero dimensions and `width * height` overflow.
    pub fn validate(&self) -> Result<(), FrescoError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(FrescoError::InvalidDimensions)?;
        Ok(())
    }

    /// Reads and validates a seed from a JSON file.
    pub fn load(path: &Path) -> Result<Self, FrescoError> {
        let text = fs::read_to_string(path)
            .map_err(|e| FrescoError::Io(format!("{}: {e}", path.display())))?;
        let seed: Seed = serde_json::from_str(&text)
            .map_err(|e| FrescoError::Io(format!("{}: {e}", path.display())))?;
        seed.validate()?;
        log::debug!(
            "loaded seed for '{}' ({}x{}, seed {}) from {}",
            seed.sketch,
            seed.width,
            seed.height,
            seed.seed,
            path.display()
        );
        Ok(seed)
    }

    /// Writes the seed as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), FrescoError> {
        let text =
            serde_json::to_string_pretty(self).map_err(|e| FrescoError::Io(e.to_string()))?;
        fs::write(path, text).map_err(|e| FrescoError::Io(format!("{}: {e}", path.display())))
    }
}
