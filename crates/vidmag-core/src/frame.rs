use ndarray::{s, Array3, ArrayView3, ArrayViewMut3};
use serde::{Deserialize, Serialize};

use crate::roi::Rect;

/// One pyramid level: shape = (height, width, channels).
pub type Layer = Array3<f32>;

/// A multi-channel floating-point video frame.
/// Pixel values are f32, nominally in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major and channel-interleaved, shape = (height, width, channels)
    pub data: Array3<f32>,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array3<f32>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn with_index(data: Array3<f32>, frame_index: usize) -> Self {
        Self {
            data,
            metadata: FrameMetadata {
                frame_index,
                ..Default::default()
            },
        }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// The full-frame rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    pub fn roi(&self, rect: &Rect) -> ArrayView3<'_, f32> {
        self.data
            .slice(s![rect.y..rect.bottom(), rect.x..rect.right(), ..])
    }

    pub fn roi_mut(&mut self, rect: &Rect) -> ArrayViewMut3<'_, f32> {
        self.data
            .slice_mut(s![rect.y..rect.bottom(), rect.x..rect.right(), ..])
    }

    /// Mean of every channel inside `rect`.
    pub fn channel_means(&self, rect: &Rect) -> Vec<f32> {
        let roi = self.roi(rect);
        let count = (rect.width * rect.height).max(1) as f64;
        (0..self.channels())
            .map(|c| {
                let sum: f64 = roi.slice(s![.., .., c]).iter().map(|&v| v as f64).sum();
                (sum / count) as f32
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Metadata reported by a frame source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceInfo {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub fps: u32,
    /// Total number of frames; 0 for live feeds.
    pub total_frames: usize,
}

impl SourceInfo {
    pub fn is_live(&self) -> bool {
        self.total_frames == 0
    }
}
