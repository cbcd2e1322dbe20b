use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::pipeline::FrameOutput;

use super::image_io::{draw_rect, save_frame_image};

/// Consumer of processed frames: a display, an encoder or a file writer.
pub trait FrameSink {
    fn write_frame(&mut self, output: &FrameOutput) -> Result<()>;

    /// Flush anything buffered. Returns the number of frames written.
    fn finish(&mut self) -> Result<usize>;
}

/// Writes each processed frame to `<dir>/<prefix>_<index>.<ext>`.
pub struct ImageSequenceWriter {
    dir: PathBuf,
    prefix: String,
    extension: String,
    draw_overlay: bool,
    written: usize,
}

impl ImageSequenceWriter {
    /// Create `dir` if needed. `extension` is `png` or `tiff`.
    pub fn create(dir: &Path, extension: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: "frame".into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
            draw_overlay: true,
            written: 0,
        })
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Whether the ROI highlight is burned into written frames.
    pub fn with_overlay(mut self, draw_overlay: bool) -> Self {
        self.draw_overlay = draw_overlay;
        self
    }

    /// Path the next frame will be written to.
    pub fn next_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}_{:06}.{}", self.prefix, self.written, self.extension))
    }
}

impl FrameSink for ImageSequenceWriter {
    fn write_frame(&mut self, output: &FrameOutput) -> Result<()> {
        let path = self.next_path();
        match (self.draw_overlay, output.overlay.color) {
            (true, Some(color)) => {
                let mut frame = output.frame.clone();
                draw_rect(&mut frame, &output.overlay.rect, color);
                save_frame_image(&frame, &path)?;
            }
            _ => save_frame_image(&output.frame, &path)?,
        }
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<usize> {
        info!(frames = self.written, dir = %self.dir.display(), "Image sequence written");
        Ok(self.written)
    }
}
