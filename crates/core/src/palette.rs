//! Palettes of colors stored in OKLCh and sampled by interpolation.
//!
//! Hue interpolation takes the shortest arc around the color wheel.

use crate::color::{OkLch, Rgba, Srgb};
use crate::error::FrescoError;

/// Built-in palettes as `(name, hex stops)`.
const BUILTIN: &[(&str, &[&str])] = &[
    ("ink", &["#0b0b0f", "#2b2d42", "#8d99ae", "#edf2f4"]),
    ("ocean", &["#001f3f", "#003366", "#005f73", "#0a9396", "#94d2bd"]),
    ("clay", &["#3d2314", "#7f4f24", "#b08968", "#ddb892", "#ede0d4"]),
    ("sunset", &["#2d00f7", "#8900f2", "#e500a4", "#f20089", "#ffb600"]),
    ("mono", &["#000000", "#ffffff"]),
    ("neon", &["#ff00ff", "#00ff41", "#ffff00", "#ff0080", "#00ffff"]),
];

/// Ordered color stops; `sample(0.0)` is the first, `sample(1.0)` the last.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<OkLch>,
}

impl Palette {
    /// Requires at least one color.
    pub fn new(colors: Vec<OkLch>) -> Result<Self, FrescoError> {
        if colors.is_empty() {
            return Err(FrescoError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    pub fn from_hex(hexes: &[&str]) -> Result<Self, FrescoError> {
        let colors = hexes
            .iter()
            .map(|h| Srgb::from_hex(h).map(Srgb::to_oklch))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Looks up a built-in palette, or parses a comma separated list of hex
    /// stops such as `"#102030,#ffeedd"`.
    pub fn from_name(name: &str) -> Result<Self, FrescoError> {
        if let Some((_, hexes)) = BUILTIN.iter().find(|(n, _)| *n == name) {
            return Self::from_hex(hexes);
        }
        if name.contains('#') {
            let stops: Vec<&str> = name.split(',').map(str::trim).collect();
            return Self::from_hex(&stops);
        }
        Err(FrescoError::InvalidPalette(format!(
            "unknown palette '{name}' (expected one of: {})",
            Self::list_names().join(", ")
        )))
    }

    pub fn list_names() -> Vec<&'static str> {
        BUILTIN.iter().map(|(n, _)| *n).collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Samples at `t`, clamped to [0, 1]. NaN samples the first stop.
    pub fn sample(&self, t: f64) -> Srgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.colors.len();
        if n == 1 {
            return self.colors[0].to_srgb();
        }

        let scaled = t * (n - 1) as f64;
        let idx = (scaled as usize).min(n - 2);
        let frac = scaled - idx as f64;
        let (c0, c1) = (self.colors[idx], self.colors[idx + 1]);

        OkLch {
            l: c0.l + frac * (c1.l - c0.l),
            c: c0.c + frac * (c1.c - c0.c),
            h: interpolate_hue(c0.h, c1.h, frac),
        }
        .to_srgb()
    }

    /// Samples at `t` and returns paint with the given alpha.
    pub fn rgba(&self, t: f64, alpha: f64) -> Rgba {
        Rgba::from(self.sample(t)).with_alpha(alpha)
    }
}

fn interpolate_hue(h0: f64, h1: f64, t: f64) -> f64 {
    let delta = match h1 - h0 {
        d if d > 180.0 => d - 360.0,
        d if d < -180.0 => d + 360.0,
        d => d,
    };
    (h0 + t * delta).rem_euclid(360.0)
}
