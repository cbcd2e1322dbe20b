use std::f32::consts::PI;

use ndarray::Array3;

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::Result;
use crate::frame::{Frame, SourceInfo};
use crate::roi::Rect;

use super::source::FrameSource;

/// Generated frames with a sinusoidal brightness pulse.
///
/// Every pixel is `base[c] + ramp * x / width`; pixels inside the pulse
/// region additionally get `amplitude * gain[c] * sin(2 pi f t)`.
#[derive(Clone, Debug)]
pub struct SyntheticPulseSource {
    width: usize,
    height: usize,
    fps: u32,
    total_frames: usize,
    pulse_hz: f32,
    amplitude: f32,
    base: [f32; COLOR_CHANNEL_COUNT],
    gain: [f32; COLOR_CHANNEL_COUNT],
    ramp: f32,
    region: Option<Rect>,
    index: usize,
    first_playback: bool,
}

impl SyntheticPulseSource {
    pub fn new(width: usize, height: usize, fps: u32) -> Self {
        Self {
            width,
            height,
            fps: fps.max(1),
            total_frames: 0,
            pulse_hz: 1.2,
            amplitude: 0.02,
            base: [0.6, 0.4, 0.3],
            gain: [0.3, 1.0, 0.2],
            ramp: 0.1,
            region: None,
            index: 0,
            first_playback: true,
        }
    }

    pub fn with_pulse(mut self, hz: f32, amplitude: f32) -> Self {
        self.pulse_hz = hz;
        self.amplitude = amplitude;
        self
    }

    /// Per-channel pulse gain.
    pub fn with_channel_gain(mut self, gain: [f32; COLOR_CHANNEL_COUNT]) -> Self {
        self.gain = gain;
        self
    }

    /// Per-channel base level.
    pub fn with_base(mut self, base: [f32; COLOR_CHANNEL_COUNT]) -> Self {
        self.base = base;
        self
    }

    /// Horizontal brightness ramp, 0 for flat frames.
    pub fn with_ramp(mut self, ramp: f32) -> Self {
        self.ramp = ramp;
        self
    }

    /// Restrict the pulse to `region`.
    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }

    /// Stop after `frames` frames (0 keeps the source endless, like a camera).
    pub fn with_frame_count(mut self, frames: usize) -> Self {
        self.total_frames = frames;
        self
    }

    /// The pulse value added to channel `c` at frame `index`.
    pub fn pulse(&self, index: usize, c: usize) -> f32 {
        let t = index as f32 / self.fps as f32;
        self.amplitude * self.gain[c] * (2.0 * PI * self.pulse_hz * t).sin()
    }

    fn render(&self, index: usize) -> Frame {
        let region = self
            .region
            .unwrap_or_else(|| Rect::new(0, 0, self.width, self.height));
        let pulse: Vec<f32> = (0..COLOR_CHANNEL_COUNT).map(|c| self.pulse(index, c)).collect();
        let width = self.width.max(1) as f32;

        let data = Array3::from_shape_fn(
            (self.height, self.width, COLOR_CHANNEL_COUNT),
            |(y, x, c)| {
                let inside = x >= region.x && x < region.right() && y >= region.y && y < region.bottom();
                let value = self.base[c] + self.ramp * x as f32 / width;
                if inside { value + pulse[c] } else { value }
            },
        );
        Frame::with_index(data, index)
    }
}

impl FrameSource for SyntheticPulseSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            width: self.width,
            height: self.height,
            channels: COLOR_CHANNEL_COUNT,
            fps: self.fps,
            total_frames: self.total_frames,
        }
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.total_frames > 0 && self.index >= self.total_frames {
            return Ok(None);
        }
        let frame = self.render(self.index);
        self.index += 1;
        Ok(Some(frame))
    }

    fn start_from_beginning(&mut self) -> Result<()> {
        self.index = 0;
        self.first_playback = true;
        Ok(())
    }

    fn is_first_playback(&self) -> bool {
        self.first_playback
    }
}
