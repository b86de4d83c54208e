//! The host loop that drives a sketch.

use fresco_core::FrescoError;

use crate::raster::Raster;
use crate::sketch::Sketch;

/// Runs `setup` once and `draw` `frames` times (once for static sketches).
/// Returns the number of frames drawn.
pub fn run(
    sketch: &mut dyn Sketch,
    raster: &mut Raster,
    frames: usize,
) -> Result<usize, FrescoError> {
    run_with(sketch, raster, frames, |_, _| Ok(()))
}

/// Like [`run`], calling `on_frame(index, raster)` after every drawn frame,
/// e.g. to write a frame sequence.
pub fn run_with<F>(
    sketch: &mut dyn Sketch,
    raster: &mut Raster,
    frames: usize,
    mut on_frame: F,
) -> Result<usize, FrescoError>
where
    F: FnMut(usize, &Raster) -> Result<(), FrescoError>,
{
    sketch.setup(raster)?;
    let frames = if sketch.is_static() { 1 } else { frames };
    for index in 0..frames {
        sketch.draw(raster)?;
        on_frame(index, raster)?;
        log::debug!("frame {}/{frames}", index + 1);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresco_core::{DVec2, Rgba, Shape};
    use serde_json::{json, Value};

    struct Counter {
        setups: usize,
        draws: usize,
        still: bool,
    }

    impl Sketch for Counter {
        fn setup(&mut self, _raster: &mut Raster) -> Result<(), FrescoError> {
            self.setups += 1;
            Ok(())
        }

        fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
            self.draws += 1;
            raster.plot(DVec2::ZERO, Rgba::new(self.draws as u8, 0, 0, 255));
            Ok(())
        }

        fn shapes(&self) -> Vec<Shape> {
            Vec::new()
        }

        fn params(&self) -> Value {
            json!({})
        }

        fn param_schema(&self) -> Value {
            json!({})
        }

        fn is_static(&self) -> bool {
            self.still
        }
    }

    #[test]
    fn animated_sketch_draws_every_frame() {
        let mut s = Counter { setups: 0, draws: 0, still: false };
        let mut raster = Raster::new(2, 2).unwrap();
        assert_eq!(run(&mut s, &mut raster, 7).unwrap(), 7);
        assert_eq!((s.setups, s.draws), (1, 7));
        assert_eq!(raster.pixel(0, 0).unwrap().r, 7);
    }

    #[test]
    fn static_sketch_draws_once() {
        let mut s = Counter { setups: 0, draws: 0, still: true };
        let mut raster = Raster::new(2, 2).unwrap();
        assert_eq!(run(&mut s, &mut raster, 50).unwrap(), 1);
        assert_eq!(s.draws, 1);
    }

    #[test]
    fn on_frame_sees_each_index_and_errors_stop_the_run() {
        let mut s = Counter { setups: 0, draws: 0, still: false };
        let mut raster = Raster::new(2, 2).unwrap();
        let mut seen = Vec::new();
        run_with(&mut s, &mut raster, 3, |i, _| {
            seen.push(i);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);

        let err = run_with(&mut s, &mut raster, 10, |i, _| {
            if i == 1 {
                Err(FrescoError::Io("disk full".into()))
            } else {
                Ok(())
            }
        });
        assert!(matches!(err, Err(FrescoError::Io(_))));
        assert_eq!(s.draws, 5);
    }
}
