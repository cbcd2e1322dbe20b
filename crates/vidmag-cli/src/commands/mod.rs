pub mod analyze;
pub mod config;
pub mod info;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use vidmag_core::analysis::AnalysisResult;
use vidmag_core::color::ColorSpace;
use vidmag_core::frame::SourceInfo;
use vidmag_core::io::{FrameSource, ImageSequenceSource, SyntheticPulseSource};
use vidmag_core::pipeline::{ParameterStore, SpatialFilterType, TemporalFilterType};
use vidmag_core::roi::{Rect, Selection};

/// Seconds of synthetic video generated when no frame count is given.
const SYNTHETIC_DEFAULT_SECONDS: usize = 10;

#[derive(Args)]
pub struct SourceArgs {
    /// Directory of input frames (PNG, TIFF, JPEG or BMP)
    #[arg(required_unless_present = "synthetic")]
    pub input: Option<PathBuf>,

    /// Generate a pulsing test sequence instead of reading frames
    #[arg(long, conflicts_with = "input")]
    pub synthetic: bool,

    /// Frame rate of the input
    #[arg(long, default_value = "30")]
    pub fps: u32,

    /// Synthetic frame size as WIDTHxHEIGHT
    #[arg(long, default_value = "128x96", value_parser = parse_size)]
    pub size: (usize, usize),

    /// Synthetic pulse frequency in Hz
    #[arg(long, default_value = "1.2")]
    pub pulse_hz: f32,

    /// Number of frames to process (default: the whole input)
    #[arg(long)]
    pub frames: Option<usize>,
}

impl SourceArgs {
    pub fn open(&self) -> Result<Box<dyn FrameSource>> {
        if self.synthetic {
            let (width, height) = self.size;
            let frames = self
                .frames
                .unwrap_or(SYNTHETIC_DEFAULT_SECONDS * self.fps.max(1) as usize);
            let source = SyntheticPulseSource::new(width, height, self.fps)
                .with_pulse(self.pulse_hz, 0.02)
                .with_frame_count(frames);
            return Ok(Box::new(source));
        }

        let Some(dir) = self.input.as_ref() else {
            bail!("No input directory given");
        };
        let source = ImageSequenceSource::open(dir, self.fps)
            .with_context(|| format!("Failed to open image sequence {}", dir.display()))?
            .with_looping(false);
        Ok(Box::new(source))
    }

    /// Frames to process from a source described by `info`.
    pub fn frame_limit(&self, info: &SourceInfo) -> usize {
        match (self.frames, info.is_live()) {
            (Some(frames), _) => frames,
            (None, false) => info.total_frames,
            (None, true) => SYNTHETIC_DEFAULT_SECONDS * info.fps.max(1) as usize,
        }
    }

    pub fn describe(&self) -> String {
        match &self.input {
            Some(dir) if !self.synthetic => dir.display().to_string(),
            _ => format!("synthetic pulse at {} Hz", self.pulse_hz),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SpatialArg {
    None,
    Laplacian,
    Gaussian,
}

impl From<SpatialArg> for SpatialFilterType {
    fn from(arg: SpatialArg) -> Self {
        match arg {
            SpatialArg::None => SpatialFilterType::None,
            SpatialArg::Laplacian => SpatialFilterType::Laplacian,
            SpatialArg::Gaussian => SpatialFilterType::Gaussian,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TemporalArg {
    Ideal,
    Iir,
}

impl From<TemporalArg> for TemporalFilterType {
    fn from(arg: TemporalArg) -> Self {
        match arg {
            TemporalArg::Ideal => TemporalFilterType::Ideal,
            TemporalArg::Iir => TemporalFilterType::Iir,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorSpaceArg {
    Rgb,
    Ycrcb,
    Yuv,
    Xyz,
    Hsv,
    Lab,
    Luv,
}

impl From<ColorSpaceArg> for ColorSpace {
    fn from(arg: ColorSpaceArg) -> Self {
        match arg {
            ColorSpaceArg::Rgb => ColorSpace::Rgb,
            ColorSpaceArg::Ycrcb => ColorSpace::YCrCb,
            ColorSpaceArg::Yuv => ColorSpace::Yuv,
            ColorSpaceArg::Xyz => ColorSpace::Xyz,
            ColorSpaceArg::Hsv => ColorSpace::Hsv,
            ColorSpaceArg::Lab => ColorSpace::Lab,
            ColorSpaceArg::Luv => ColorSpace::Luv,
        }
    }
}

/// Pipeline parameters. Flags override values read from `--config`.
#[derive(Args)]
pub struct FilterArgs {
    /// Parameter file (TOML), as written by `vidmag config`
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Spatial decomposition
    #[arg(long, value_enum)]
    pub spatial: Option<SpatialArg>,

    /// Temporal band-pass
    #[arg(long, value_enum)]
    pub temporal: Option<TemporalArg>,

    /// Working color space
    #[arg(long, value_enum)]
    pub color_space: Option<ColorSpaceArg>,

    /// Number of pyramid layers
    #[arg(long)]
    pub layers: Option<usize>,

    /// Amplification factor
    #[arg(long)]
    pub alpha: Option<f32>,

    /// Spatial wavelength cutoff
    #[arg(long)]
    pub lambda_c: Option<f32>,

    /// Lower band edge in Hz (ideal filter)
    #[arg(long)]
    pub min_freq: Option<f32>,

    /// Upper band edge in Hz (ideal filter)
    #[arg(long)]
    pub max_freq: Option<f32>,

    /// Lower cutoff weight (IIR filter)
    #[arg(long)]
    pub cutoff_lo: Option<f32>,

    /// Upper cutoff weight (IIR filter)
    #[arg(long)]
    pub cutoff_hi: Option<f32>,

    /// Length of the temporal window in seconds
    #[arg(long)]
    pub buffer_seconds: Option<usize>,

    /// Region of interest as x,y,width,height (default: whole frame)
    #[arg(long, value_parser = parse_rect)]
    pub roi: Option<Rect>,

    /// Leave a channel unfiltered (0-based, repeatable)
    #[arg(long = "skip-channel")]
    pub skip_channels: Vec<usize>,
}

impl FilterArgs {
    /// Parameters for a source described by `info`.
    pub fn build(&self, info: &SourceInfo) -> Result<ParameterStore> {
        let mut params = match &self.config {
            Some(path) => load_params(path)?,
            None => ParameterStore::default(),
        };
        params.adopt_source(info);

        if let Some(spatial) = self.spatial {
            params.spatial_filter = spatial.into();
        }
        if let Some(temporal) = self.temporal {
            params.temporal_filter = temporal.into();
        }
        if let Some(color_space) = self.color_space {
            params.color_space = color_space.into();
        }
        if let Some(layers) = self.layers {
            params.n_layers = layers;
        }
        if let Some(alpha) = self.alpha {
            params.alpha = alpha;
        }
        if let Some(lambda_c) = self.lambda_c {
            params.lambda_c = lambda_c;
        }
        if let Some(min_freq) = self.min_freq {
            params.min_freq = min_freq;
        }
        if let Some(max_freq) = self.max_freq {
            params.max_freq = max_freq;
        }
        if let Some(cutoff_lo) = self.cutoff_lo {
            params.cutoff_lo = cutoff_lo;
        }
        if let Some(cutoff_hi) = self.cutoff_hi {
            params.cutoff_hi = cutoff_hi;
        }
        if let Some(seconds) = self.buffer_seconds {
            params.set_buffer_seconds(seconds);
        }
        for &channel in &self.skip_channels {
            if channel >= params.active_channels.len() {
                bail!("Channel {channel} out of range ({} channels)", params.n_channels);
            }
            params.active_channels[channel] = false;
        }
        Ok(params)
    }

    /// Initial selection: a completed selection of `--roi`, if given.
    pub fn selection(&self) -> Selection {
        self.roi.map(Selection::completed).unwrap_or_default()
    }
}

pub fn load_params(path: &Path) -> Result<ParameterStore> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid parameter file")
}

/// Write an analysis result as TOML.
pub fn write_report(path: &Path, result: &AnalysisResult) -> Result<()> {
    let toml_str = toml::to_string_pretty(result)?;
    std::fs::write(path, toml_str)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

fn parse_size(s: &str) -> std::result::Result<(usize, usize), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("invalid width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("invalid height: {e}"))?;
    Ok((w, h))
}

fn parse_rect(s: &str) -> std::result::Result<Rect, String> {
    let values: Vec<usize> = s
        .split(',')
        .map(|v| v.trim().parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("invalid ROI '{s}': {e}"))?;
    match values.as_slice() {
        &[x, y, width, height] => Ok(Rect::new(x, y, width, height)),
        _ => Err(format!("expected x,y,width,height, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_and_rect() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert!(parse_size("640").is_err());
        assert_eq!(parse_rect("4, 8, 32, 16"), Ok(Rect::new(4, 8, 32, 16)));
        assert!(parse_rect("1,2,3").is_err());
    }

    #[test]
    fn maps_every_color_space_name() {
        for (name, expected) in [
            ("rgb", ColorSpace::Rgb),
            ("ycrcb", ColorSpace::YCrCb),
            ("yuv", ColorSpace::Yuv),
            ("xyz", ColorSpace::Xyz),
            ("hsv", ColorSpace::Hsv),
            ("lab", ColorSpace::Lab),
            ("luv", ColorSpace::Luv),
        ] {
            let arg = ColorSpaceArg::from_str(name, false).unwrap();
            assert_eq!(ColorSpace::from(arg), expected);
        }
    }
}
