use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::ColorSpace;
use crate::consts::{
    COLOR_CHANNEL_COUNT, DEFAULT_BUFFER_SECONDS, DEFAULT_FPS, DEFAULT_LAYER_COUNT,
    IIR_CUTOFF_FLOOR,
};
use crate::frame::SourceInfo;
use crate::roi::Rect;

/// Spatial decomposition applied to the ROI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpatialFilterType {
    /// No decomposition; frames pass through unchanged.
    #[default]
    None,
    /// Every pyramid layer is temporally filtered.
    Laplacian,
    /// Only the coarsest layer is temporally filtered; finer layers pass through.
    Gaussian,
}

impl std::fmt::Display for SpatialFilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Laplacian => write!(f, "Laplacian"),
            Self::Gaussian => write!(f, "Gaussian"),
        }
    }
}

/// Temporal band-pass used on each layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalFilterType {
    /// Finite-window frequency-domain band-pass.
    #[default]
    Ideal,
    /// Streaming two-pole band-pass.
    Iir,
}

impl std::fmt::Display for TemporalFilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ideal => write!(f, "Ideal"),
            Self::Iir => write!(f, "IIR"),
        }
    }
}

/// Every tunable of the magnification pipeline.
///
/// The worker treats one value of this type as a frozen snapshot for the
/// whole of a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterStore {
    pub spatial_filter: SpatialFilterType,
    pub temporal_filter: TemporalFilterType,

    /// Working color space for filtering.
    pub color_space: ColorSpace,
    /// Per-channel enable flags; channels past the end of the vector are enabled.
    pub active_channels: Vec<bool>,

    /// Region of interest. Empty means "whole frame".
    pub roi: Rect,
    /// Ring buffer depth in frames.
    pub n_buffered_frames: usize,
    /// Number of pyramid layers.
    pub n_layers: usize,

    /// Amplification factor.
    pub alpha: f32,
    /// Spatial wavelength cutoff.
    pub lambda_c: f32,
    /// Lower band edge in Hz (ideal filter).
    pub min_freq: f32,
    /// Upper band edge in Hz (ideal filter).
    pub max_freq: f32,
    /// Lower per-frame cutoff weight (IIR filter).
    pub cutoff_lo: f32,
    /// Upper per-frame cutoff weight (IIR filter).
    pub cutoff_hi: f32,

    pub fps: u32,
    pub n_channels: usize,
    pub analyze_heartbeat: bool,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self {
            spatial_filter: SpatialFilterType::None,
            temporal_filter: TemporalFilterType::Ideal,
            color_space: ColorSpace::Rgb,
            active_channels: vec![true; COLOR_CHANNEL_COUNT],
            roi: Rect::default(),
            n_buffered_frames: DEFAULT_BUFFER_SECONDS * DEFAULT_FPS as usize,
            n_layers: DEFAULT_LAYER_COUNT,
            alpha: 50.0,
            lambda_c: 100.0,
            min_freq: 1.0,
            max_freq: 2.0,
            cutoff_lo: 0.25,
            cutoff_hi: 0.6,
            fps: DEFAULT_FPS,
            n_channels: COLOR_CHANNEL_COUNT,
            analyze_heartbeat: false,
        }
    }
}

impl ParameterStore {
    /// Defaults adjusted to a frame source: fps, channel count and a ring
    /// buffer holding the default number of seconds.
    pub fn for_source(info: &SourceInfo) -> Self {
        let mut params = Self::default();
        params.adopt_source(info);
        params
    }

    /// Take fps and channel count from a newly opened source, keeping the
    /// buffer length in seconds.
    pub fn adopt_source(&mut self, info: &SourceInfo) {
        let seconds = self.buffer_seconds().max(1);
        self.fps = info.fps.max(1);
        self.n_channels = info.channels;
        self.active_channels.resize(info.channels, true);
        self.n_buffered_frames = seconds * self.fps as usize;
    }

    pub fn buffer_seconds(&self) -> usize {
        self.n_buffered_frames / self.fps.max(1) as usize
    }

    pub fn set_buffer_seconds(&mut self, seconds: usize) {
        self.n_buffered_frames = (seconds * self.fps.max(1) as usize).max(1);
    }

    pub fn channel_active(&self, channel: usize) -> bool {
        self.active_channels.get(channel).copied().unwrap_or(true)
    }

    pub fn spatial_active(&self) -> bool {
        self.spatial_filter != SpatialFilterType::None
    }

    /// Low IIR cutoff with the zero-weight floor applied.
    pub fn effective_cutoff_lo(&self) -> f32 {
        if self.cutoff_lo <= 0.0 {
            IIR_CUTOFF_FLOOR
        } else {
            self.cutoff_lo
        }
    }

    /// Whether moving from `self` to `next` invalidates the buffer layout.
    pub fn requires_reallocation(&self, next: &ParameterStore) -> bool {
        self.n_layers != next.n_layers
            || self.n_buffered_frames != next.n_buffered_frames
            || self.roi.width != next.roi.width
            || self.roi.height != next.roi.height
            || self.n_channels != next.n_channels
            || self.spatial_filter != next.spatial_filter
            || self.temporal_filter != next.temporal_filter
    }

    /// Copy with degenerate values clamped to the nearest usable ones.
    pub fn sanitized(&self) -> ParameterStore {
        let mut params = self.clone();
        if params.fps == 0 {
            warn!("fps of 0 clamped to 1");
            params.fps = 1;
        }
        if params.n_buffered_frames == 0 {
            warn!("Ring buffer depth of 0 clamped to 1");
            params.n_buffered_frames = 1;
        }
        if params.n_layers == 0 {
            warn!("Layer count of 0 clamped to 1");
            params.n_layers = 1;
        }
        if params.n_channels == 0 {
            warn!("Channel count of 0 clamped to 1");
            params.n_channels = 1;
        }
        params.cutoff_lo = params.effective_cutoff_lo();
        params
    }
}
