use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::consts::DEFAULT_FPS;
use crate::error::{Result, VidmagError};
use crate::frame::{Frame, SourceInfo};

use super::image_io::load_color_image;
use super::source::FrameSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "jpg", "jpeg", "bmp"];

/// Frames read from a directory of numbered image files, in file name order.
///
/// Loops back to the first file when the last one has been played, unless
/// looping is disabled.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    position: usize,
    frames_emitted: usize,
    first_playback: bool,
    looping: bool,
    info: SourceInfo,
}

impl ImageSequenceSource {
    /// Open every image file in `dir`. The first file fixes the frame size.
    pub fn open(dir: &Path, fps: u32) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image_path(path))
            .collect();
        paths.sort();

        let first = paths.first().ok_or(VidmagError::EmptySequence)?;
        let probe = load_color_image(first)?;

        let info = SourceInfo {
            width: probe.width(),
            height: probe.height(),
            channels: probe.channels(),
            fps: if fps == 0 { DEFAULT_FPS } else { fps },
            total_frames: paths.len(),
        };

        info!(
            dir = %dir.display(),
            frames = info.total_frames,
            width = info.width,
            height = info.height,
            fps = info.fps,
            "Opened image sequence"
        );

        Ok(Self {
            paths,
            position: 0,
            frames_emitted: 0,
            first_playback: true,
            looping: true,
            info,
        })
    }

    /// Stop at the last file instead of wrapping around.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn info(&self) -> SourceInfo {
        self.info.clone()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.position >= self.paths.len() {
            if !self.looping {
                return Ok(None);
            }
            debug!("Image sequence wrapped around");
            self.position = 0;
            self.first_playback = false;
        }

        let path = &self.paths[self.position];
        let mut frame = load_color_image(path)?;
        if frame.width() != self.info.width || frame.height() != self.info.height {
            return Err(VidmagError::ShapeMismatch {
                expected: (self.info.height, self.info.width, self.info.channels),
                found: frame.data.dim(),
            });
        }

        frame.metadata.frame_index = self.frames_emitted;
        frame.metadata.timestamp_us =
            Some(self.frames_emitted as u64 * 1_000_000 / self.info.fps.max(1) as u64);

        self.position += 1;
        self.frames_emitted += 1;
        Ok(Some(frame))
    }

    fn start_from_beginning(&mut self) -> Result<()> {
        self.position = 0;
        self.frames_emitted = 0;
        self.first_playback = true;
        Ok(())
    }

    fn is_first_playback(&self) -> bool {
        self.first_playback
    }
}
