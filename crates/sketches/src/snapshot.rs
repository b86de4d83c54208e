//! PNG output of a [`Raster`], as single images or numbered frame sequences.

use std::fs;
use std::path::{Path, PathBuf};

use fresco_core::FrescoError;

use crate::raster::Raster;

/// Writes the raster as a PNG.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), FrescoError> {
    raster
        .image()
        .save(path)
        .map_err(|e| FrescoError::Io(format!("{}: {e}", path.display())))
}

/// Writes numbered frames (`frame_00000.png`, ...) into a directory.
pub struct FrameWriter {
    dir: PathBuf,
    written: usize,
}

impl FrameWriter {
    /// Creates `dir` (and parents) if missing.
    pub fn new(dir: &Path) -> Result<Self, FrescoError> {
        fs::create_dir_all(dir).map_err(|e| FrescoError::Io(format!("{}: {e}", dir.display())))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }

    /// Writes the next frame in sequence and returns its path.
    pub fn write(&mut self, raster: &Raster) -> Result<PathBuf, FrescoError> {
        let path = self.frame_path(self.written);
        write_png(raster, &path)?;
        self.written += 1;
        Ok(path)
    }

    pub fn written(&self) -> usize {
        self.written
    }
}
