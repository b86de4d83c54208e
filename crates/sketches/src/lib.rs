#![deny(unsafe_code)]
//! Sketch registry: maps sketch names to implementations, plus the raster,
//! host loop and PNG output they share.
//!
//! This crate sits between the toolkit crates (`fresco-core`,
//! `fresco-particles`) and the CLI, which constructs sketches by name through
//! [`SketchKind::from_name`].

pub mod ascii;
pub mod blobs;
pub mod fountain;
pub mod host;
pub mod noise_circles;
pub mod pixel;
pub mod pottery;
pub mod raster;
pub mod sketch;
pub mod snapshot;
pub mod voronoi;

pub use raster::{BlendMode, Raster};
pub use sketch::Sketch;

use fresco_core::{FrescoError, Palette, Shape};
use serde_json::Value;

/// All available sketch names.
const SKETCH_NAMES: &[&str] = &[
    "noise-circles",
    "fountain",
    "blobs",
    "voronoi",
    "pottery",
    "ascii",
];

/// Every registered sketch.
///
/// Use [`SketchKind::from_name`] for string-based construction.
pub enum SketchKind {
    NoiseCircles(noise_circles::NoiseCircles),
    Fountain(fountain::Fountain),
    Blobs(blobs::Blobs),
    Voronoi(voronoi::VoronoiCells),
    Pottery(pottery::Pottery),
    Ascii(ascii::Ascii),
}

impl SketchKind {
    /// Constructs a sketch by name.
    ///
    /// Returns `FrescoError::UnknownSketch` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FrescoError> {
        let sketch = match name {
            "noise-circles" => SketchKind::NoiseCircles(noise_circles::NoiseCircles::from_json(
                width, height, seed, params,
            )?),
            "fountain" => {
                SketchKind::Fountain(fountain::Fountain::from_json(width, height, seed, params)?)
            }
            "blobs" => SketchKind::Blobs(blobs::Blobs::from_json(width, height, seed, params)?),
            "voronoi" => {
                SketchKind::Voronoi(voronoi::VoronoiCells::from_json(width, height, seed, params)?)
            }
            "pottery" => {
                SketchKind::Pottery(pottery::Pottery::from_json(width, height, seed, params)?)
            }
            "ascii" => SketchKind::Ascii(ascii::Ascii::from_json(width, height, seed, params)?),
            _ => return Err(FrescoError::UnknownSketch(name.to_string())),
        };
        log::debug!("constructed sketch {name} ({width}x{height}, seed {seed})");
        Ok(sketch)
    }

    /// Returns a slice of all recognized sketch names.
    pub fn list_sketches() -> &'static [&'static str] {
        SKETCH_NAMES
    }

    fn inner(&self) -> &dyn Sketch {
        match self {
            SketchKind::NoiseCircles(s) => s,
            SketchKind::Fountain(s) => s,
            SketchKind::Blobs(s) => s,
            SketchKind::Voronoi(s) => s,
            SketchKind::Pottery(s) => s,
            SketchKind::Ascii(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Sketch {
        match self {
            SketchKind::NoiseCircles(s) => s,
            SketchKind::Fountain(s) => s,
            SketchKind::Blobs(s) => s,
            SketchKind::Voronoi(s) => s,
            SketchKind::Pottery(s) => s,
            SketchKind::Ascii(s) => s,
        }
    }
}

impl Sketch for SketchKind {
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        self.inner_mut().setup(raster)
    }

    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        self.inner_mut().draw(raster)
    }

    fn shapes(&self) -> Vec<Shape> {
        self.inner().shapes()
    }

    fn params(&self) -> Value {
        self.inner().params()
    }

    fn param_schema(&self) -> Value {
        self.inner().param_schema()
    }

    fn is_static(&self) -> bool {
        self.inner().is_static()
    }

    fn text(&self) -> Option<String> {
        self.inner().text()
    }
}

/// Folds a 64-bit seed into the 32-bit seed the noise crate takes.
pub(crate) fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Resolves a palette parameter. An unknown name falls back to `default` with
/// a warning, and `name` is rewritten so the sketch reports what it uses.
pub(crate) fn palette_param(name: &mut String, default: &str) -> Result<Palette, FrescoError> {
    match Palette::from_name(name) {
        Ok(palette) => Ok(palette),
        Err(e) => {
            log::warn!("{e}; using '{default}'");
            *name = default.to_string();
            Palette::from_name(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_listed_sketch_constructs() {
        for name in SketchKind::list_sketches() {
            let sketch = SketchKind::from_name(name, 64, 48, 7, &json!({}));
            assert!(sketch.is_ok(), "{name} failed to construct");
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let result = SketchKind::from_name("nonexistent", 32, 32, 42, &json!({}));
        assert!(matches!(result, Err(FrescoError::UnknownSketch(_))));
    }

    #[test]
    fn zero_dimensions_are_an_error_for_every_sketch() {
        for name in SketchKind::list_sketches() {
            assert!(SketchKind::from_name(name, 0, 10, 1, &json!({})).is_err(), "{name}");
        }
    }

    #[test]
    fn every_sketch_runs_and_reports_schema() {
        for name in SketchKind::list_sketches() {
            let mut sketch = SketchKind::from_name(name, 64, 48, 3, &json!({})).unwrap();
            let mut raster = Raster::new(64, 48).unwrap();
            host::run(&mut sketch, &mut raster, 3).unwrap();
            let params = sketch.params();
            let schema = sketch.param_schema();
            for key in params.as_object().unwrap().keys() {
                assert!(schema.get(key).is_some(), "{name}: no schema for {key}");
            }
            assert!(!sketch.shapes().is_empty(), "{name} produced no shapes");
        }
    }

    /// Params object with every numeric key of `schema` pushed to an extreme.
    fn extreme_params(schema: &Value, huge: bool) -> Value {
        let mut params = serde_json::Map::new();
        for (key, spec) in schema.as_object().unwrap() {
            let value = match (spec["type"].as_str().unwrap_or(""), huge) {
                ("number", true) => json!(1e12),
                ("number", false) => json!(-1e12),
                ("integer", true) => json!(1_000_000_000_000u64),
                ("integer", false) => json!(-5),
                ("range", true) => json!([1e12, 1e13]),
                ("range", false) => json!([-1e13, -1e12]),
                _ => continue,
            };
            params.insert(key.clone(), value);
        }
        Value::Object(params)
    }

    fn assert_within_schema(name: &str, params: &Value, schema: &Value) {
        for (key, spec) in schema.as_object().unwrap() {
            let (Some(min), Some(max)) = (spec["min"].as_f64(), spec["max"].as_f64()) else {
                continue;
            };
            let values: Vec<f64> = match &params[key] {
                Value::Array(pair) => pair.iter().filter_map(Value::as_f64).collect(),
                v => v.as_f64().into_iter().collect(),
            };
            for v in values {
                assert!((min..=max).contains(&v), "{name}: {key} = {v} outside [{min}, {max}]");
            }
        }
    }

    #[test]
    fn extreme_params_are_clamped_and_run() {
        for name in SketchKind::list_sketches() {
            let schema = SketchKind::from_name(name, 8, 8, 1, &json!({})).unwrap().param_schema();
            for huge in [true, false] {
                let params = extreme_params(&schema, huge);
                let mut sketch = SketchKind::from_name(name, 32, 24, 5, &params)
                    .unwrap_or_else(|e| panic!("{name} rejected {params}: {e}"));
                assert_within_schema(name, &sketch.params(), &schema);
                let mut raster = Raster::new(32, 24).unwrap();
                host::run(&mut sketch, &mut raster, 2).unwrap();
            }
        }
    }

    #[test]
    fn only_pottery_is_static() {
        for name in SketchKind::list_sketches() {
            let sketch = SketchKind::from_name(name, 32, 32, 1, &json!({})).unwrap();
            assert_eq!(sketch.is_static(), *name == "pottery", "{name}");
        }
    }

    #[test]
    fn determinism_same_seed() {
        for name in SketchKind::list_sketches() {
            let render = || {
                let mut s = SketchKind::from_name(name, 48, 40, 99, &json!({})).unwrap();
                let mut raster = Raster::new(48, 40).unwrap();
                host::run(&mut s, &mut raster, 5).unwrap();
                raster.into_image().into_raw()
            };
            assert_eq!(render(), render(), "{name} is not deterministic");
        }
    }

    #[test]
    fn object_safety() {
        let sketch = SketchKind::from_name("voronoi", 16, 16, 42, &json!({})).unwrap();
        let boxed: Box<dyn Sketch> = Box::new(sketch);
        assert!(boxed.params().is_object());
    }

    #[test]
    fn unknown_palette_falls_back() {
        let mut name = "nope".to_string();
        assert!(palette_param(&mut name, "ink").is_ok());
        assert_eq!(name, "ink");
        let mut hex = "#102030,#ffffff".to_string();
        assert_eq!(palette_param(&mut hex, "ink").unwrap().len(), 2);
        assert_eq!(hex, "#102030,#ffffff");
    }
}
