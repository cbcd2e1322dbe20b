#![allow(dead_code)]

use ndarray::Array3;

use vidmag_core::frame::Frame;
use vidmag_core::pipeline::config::{ParameterStore, SpatialFilterType, TemporalFilterType};
use vidmag_core::roi::Rect;

/// 3-channel frame with a smooth but non-trivial pattern.
pub fn pattern_frame(height: usize, width: usize) -> Frame {
    let data = Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
        0.5 + 0.2 * ((x as f32 * 0.7 + c as f32).sin() * (y as f32 * 0.4).cos())
            + 0.01 * ((x * 7 + y * 13 + c * 3) % 11) as f32
    });
    Frame::new(data)
}

/// 3-channel frame where every sample is `value`.
pub fn constant_frame(height: usize, width: usize, value: f32) -> Frame {
    Frame::new(Array3::from_elem((height, width, 3), value))
}

/// Parameters for a `roi` with the given filters and ring depth.
pub fn params_with(
    roi: Rect,
    spatial: SpatialFilterType,
    temporal: TemporalFilterType,
    n_layers: usize,
    n_buffered_frames: usize,
) -> ParameterStore {
    ParameterStore {
        spatial_filter: spatial,
        temporal_filter: temporal,
        roi,
        n_layers,
        n_buffered_frames,
        ..ParameterStore::default()
    }
}

/// Deterministic uniform noise in [-amplitude, amplitude].
pub struct Noise(u64);

impl Noise {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next(&mut self, amplitude: f32) -> f32 {
        // xorshift64
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        let unit = (self.0 >> 40) as f32 / (1u64 << 24) as f32;
        (unit * 2.0 - 1.0) * amplitude
    }
}

pub fn max_abs_diff(a: &Array3<f32>, b: &Array3<f32>) -> f32 {
    assert_eq!(a.dim(), b.dim());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}
