#![deny(unsafe_code)]
//! CLI binary for fresco sketches.
//!
//! Subcommands:
//! - `render <sketch>`: run a sketch for N frames, write PNG (and optionally
//!   SVG, a frame sequence, text and the seed file)
//! - `plot <sketch>`: run a sketch and send its shapes to a pen plotter
//! - `list`: print available sketches and palettes
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use fresco_core::{Palette, Seed};
use fresco_plotter::{client::DEFAULT_ADDR, PlotterClient, PlotterConfig};
use fresco_sketches::ascii::{field_to_ascii, raster_to_field, DEFAULT_CHARSET};
use fresco_sketches::snapshot::{self, FrameWriter};
use fresco_sketches::{host, Raster, Sketch, SketchKind};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Cell size used when a sketch without its own text output is printed as text.
const TEXT_CELL: usize = 8;
const SVG_STROKE: f64 = 1.0;

#[derive(Parser)]
#[command(name = "fresco", about = "Generative art sketches")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// What to render: either a sketch name with options, or a seed file.
#[derive(Args)]
struct SketchArgs {
    /// Sketch name (e.g. "noise-circles"). Not needed with --seed-file.
    sketch: Option<String>,

    /// Canvas width in pixels.
    #[arg(short = 'W', long, default_value_t = 512)]
    width: usize,

    /// Canvas height in pixels.
    #[arg(short = 'H', long, default_value_t = 512)]
    height: usize,

    /// Number of frames to draw (static sketches always draw one).
    #[arg(short, long, default_value_t = 120)]
    frames: usize,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Palette name (ink, ocean, clay, sunset, mono, neon) or hex stops.
    #[arg(short, long)]
    palette: Option<String>,

    /// Sketch parameters as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Reproduce a render from a seed file; replaces name, size, seed,
    /// frames and params.
    #[arg(long)]
    seed_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a sketch for N frames and write a PNG.
    Render {
        #[command(flatten)]
        sketch: SketchArgs,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Also write the final frame's shapes as SVG.
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Write every frame as a numbered PNG into this directory.
        #[arg(long)]
        frames_dir: Option<PathBuf>,

        /// Print the final frame as ASCII text.
        #[arg(long)]
        text: bool,

        /// Write the seed file next to the PNG (same name, .json).
        #[arg(long)]
        save_seed: bool,
    },
    /// Run a sketch and send the final frame's shapes to a pen plotter.
    Plot {
        #[command(flatten)]
        sketch: SketchArgs,

        /// Plotter server address as host:port.
        #[arg(long, default_value = DEFAULT_ADDR)]
        addr: String,

        /// Plotter settings as a JSON file; defaults are used otherwise.
        #[arg(long)]
        plotter_config: Option<PathBuf>,
    },
    /// List available sketches and palettes.
    List,
}

/// Builds the render description from the arguments or the seed file.
fn resolve_seed(args: &SketchArgs) -> Result<Seed, CliError> {
    let mut seed = match &args.seed_file {
        Some(path) => Seed::load(path)?,
        None => {
            let name = args
                .sketch
                .as_deref()
                .ok_or_else(|| CliError::Input("a sketch name or --seed-file is required".into()))?;
            let params: Value = serde_json::from_str(&args.params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            if !params.is_object() {
                return Err(CliError::Input("--params must be a JSON object".into()));
            }
            let mut seed = Seed::new(name, args.width, args.height, args.seed);
            seed.params = params;
            seed.frames = args.frames;
            seed
        }
    };

    if let Some(palette) = &args.palette {
        Palette::from_name(palette).map_err(|e| CliError::Input(e.to_string()))?;
        if let Some(map) = seed.params.as_object_mut() {
            map.insert("palette".into(), json!(palette));
        }
    }
    seed.validate()?;
    Ok(seed)
}

/// Constructs the sketch and runs it, calling `on_frame` after each frame.
fn render<F>(seed: &Seed, on_frame: F) -> Result<(SketchKind, Raster, usize), CliError>
where
    F: FnMut(usize, &Raster) -> Result<(), fresco_core::FrescoError>,
{
    let mut sketch = SketchKind::from_name(
        &seed.sketch,
        seed.width,
        seed.height,
        seed.seed,
        &seed.params,
    )?;
    let mut raster = Raster::new(seed.width, seed.height)?;
    let drawn = host::run_with(&mut sketch, &mut raster, seed.frames, on_frame)?;
    log::info!(
        "rendered {} ({}x{}, {drawn} frames, seed {})",
        seed.sketch,
        seed.width,
        seed.height,
        seed.seed
    );
    Ok((sketch, raster, drawn))
}

/// The sketch's own text, or the raster reduced to ASCII.
fn frame_text(sketch: &SketchKind, raster: &Raster) -> Result<String, CliError> {
    match sketch.text() {
        Some(text) => Ok(text),
        None => {
            let ramp: Vec<char> = DEFAULT_CHARSET.chars().collect();
            Ok(field_to_ascii(&raster_to_field(raster, TEXT_CELL)?, &ramp))
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let sketches = SketchKind::list_sketches();
            let palettes = Palette::list_names();
            if cli.json {
                let info = json!({
                    "sketches": sketches,
                    "palettes": palettes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Sketches:");
                for name in sketches {
                    println!("  {name}");
                }
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
            }
        }
        Command::Render {
            sketch,
            output,
            svg,
            frames_dir,
            text,
            save_seed,
        } => {
            let mut seed = resolve_seed(&sketch)?;
            let mut writer = frames_dir.as_deref().map(FrameWriter::new).transpose()?;
            let (sketch, raster, drawn) = render(&seed, |_, raster| {
                if let Some(w) = writer.as_mut() {
                    w.write(raster)?;
                }
                Ok(())
            })?;
            seed.frames = drawn;
            seed.params = sketch.params();

            snapshot::write_png(&raster, &output)?;
            if let Some(path) = &svg {
                let shapes = sketch.shapes();
                let doc = fresco_core::svg::to_svg(seed.width, seed.height, &shapes, SVG_STROKE);
                write_file(path, &doc)?;
            }
            let seed_path = output.with_extension("json");
            if save_seed {
                seed.save(&seed_path)?;
            }
            let text = if text { Some(frame_text(&sketch, &raster)?) } else { None };

            if cli.json {
                let info = json!({
                    "sketch": seed.sketch,
                    "width": seed.width,
                    "height": seed.height,
                    "frames": drawn,
                    "seed": seed.seed,
                    "params": seed.params,
                    "output": output.display().to_string(),
                    "svg": svg.as_ref().map(|p| p.display().to_string()),
                    "frames_written": writer.as_ref().map(FrameWriter::written),
                    "seed_file": save_seed.then(|| seed_path.display().to_string()),
                    "text": text,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                if let Some(text) = text {
                    print!("{text}");
                }
                eprintln!(
                    "rendered {} ({}x{}, {drawn} frames, seed {}) -> {}",
                    seed.sketch,
                    seed.width,
                    seed.height,
                    seed.seed,
                    output.display()
                );
            }
        }
        Command::Plot {
            sketch,
            addr,
            plotter_config,
        } => {
            let seed = resolve_seed(&sketch)?;
            let config = match &plotter_config {
                Some(path) => PlotterConfig::load(path)?,
                None => PlotterConfig::default(),
            };
            let (sketch, _, drawn) = render(&seed, |_, _| Ok(()))?;

            let client = PlotterClient::new(addr);
            client.config(&config)?;
            client.canvas_size(seed.width as f64, seed.height as f64)?;
            let paths = client.draw(&sketch.shapes())?;

            if cli.json {
                let info = json!({
                    "sketch": seed.sketch,
                    "frames": drawn,
                    "seed": seed.seed,
                    "plotter": client.addr(),
                    "paths": paths,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "sent {paths} paths from {} ({drawn} frames, seed {}) to {}",
                    seed.sketch,
                    seed.seed,
                    client.addr()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(sketch: Option<&str>) -> SketchArgs {
        SketchArgs {
            sketch: sketch.map(str::to_string),
            width: 40,
            height: 30,
            frames: 3,
            seed: 7,
            palette: None,
            params: "{}".into(),
            seed_file: None,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn seed_from_arguments() {
        let mut a = args(Some("voronoi"));
        a.params = r#"{"sites": 5}"#.into();
        a.palette = Some("neon".into());
        let seed = resolve_seed(&a).unwrap();
        assert_eq!(
            (seed.sketch.as_str(), seed.width, seed.height, seed.seed, seed.frames),
            ("voronoi", 40, 30, 7, 3)
        );
        assert_eq!(seed.params["sites"], 5);
        assert_eq!(seed.params["palette"], "neon");
    }

    #[test]
    fn input_errors_exit_with_12() {
        assert_eq!(resolve_seed(&args(None)).err().map(|e| e.exit_code()), Some(12));

        let mut bad_json = args(Some("fountain"));
        bad_json.params = "{oops".into();
        assert_eq!(resolve_seed(&bad_json).err().map(|e| e.exit_code()), Some(12));

        let mut not_object = args(Some("fountain"));
        not_object.params = "[1, 2]".into();
        assert_eq!(resolve_seed(&not_object).err().map(|e| e.exit_code()), Some(12));

        let mut bad_palette = args(Some("fountain"));
        bad_palette.palette = Some("nope".into());
        assert_eq!(resolve_seed(&bad_palette).err().map(|e| e.exit_code()), Some(12));
    }

    #[test]
    fn zero_size_is_a_sketch_error() {
        let mut a = args(Some("blobs"));
        a.width = 0;
        assert_eq!(resolve_seed(&a).err().map(|e| e.exit_code()), Some(10));
    }

    #[test]
    fn seed_file_reproduces_a_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let mut saved = Seed::new("noise-circles", 32, 24, 5);
        saved.frames = 4;
        saved.save(&path).unwrap();

        let mut a = args(None);
        a.seed_file = Some(path);
        let seed = resolve_seed(&a).unwrap();
        assert_eq!(seed, saved);

        let first = render(&seed, |_, _| Ok(())).unwrap();
        let second = render(&seed, |_, _| Ok(())).unwrap();
        assert_eq!(first.2, 4);
        assert_eq!(first.1.image().as_raw(), second.1.image().as_raw());
    }

    #[test]
    fn unknown_sketch_fails_at_render() {
        let seed = resolve_seed(&args(Some("spirograph"))).unwrap();
        let err = render(&seed, |_, _| Ok(())).err().unwrap();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn text_falls_back_to_raster_ascii() {
        let seed = resolve_seed(&args(Some("pottery"))).unwrap();
        let (sketch, raster, _) = render(&seed, |_, _| Ok(())).unwrap();
        let text = frame_text(&sketch, &raster).unwrap();
        assert_eq!(text.lines().count(), 30usize.div_ceil(TEXT_CELL));

        let seed = resolve_seed(&args(Some("ascii"))).unwrap();
        let (sketch, raster, _) = render(&seed, |_, _| Ok(())).unwrap();
        assert_eq!(frame_text(&sketch, &raster).unwrap(), sketch.text().unwrap());
    }
}
