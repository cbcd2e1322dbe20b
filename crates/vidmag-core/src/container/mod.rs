//! Frame and layer store.
//!
//! Owns every numeric buffer the pipeline touches between frames: the
//! current and previous frame, per-layer data, the ring-buffered time series
//! used by the ideal filter, the IIR accumulators and the ROI average ring
//! used by the heartbeat analyzer.
//!
//! Reconstruction is additive and follows a two-phase protocol:
//! 1. [`DataContainer::take_roi`] extracts the ROI and clears it to zero.
//! 2. [`DataContainer::accumulate_roi`] adds each reconstructed layer back.

mod buffers;

pub use buffers::TemporalBuffer;

use ndarray::{Array2, Array3, ArrayView1};
use num_complex::Complex32;
use tracing::info;

use crate::error::{Result, VidmagError};
use crate::frame::{Frame, Layer};
use crate::pipeline::config::{ParameterStore, SpatialFilterType, TemporalFilterType};
use crate::roi::{alignment, fit_to_layer, Rect};

pub struct DataContainer {
    params: ParameterStore,

    previous_frame: Option<Frame>,
    current_frame: Option<Frame>,

    /// Layers that bypass the ring buffer.
    current_layers: Vec<Layer>,
    /// IIR accumulators, one per layer (IIR mode only).
    lowpass_lo: Vec<Layer>,
    lowpass_hi: Vec<Layer>,

    /// Ideal-filter series: one per layer (Laplacian) or one for the
    /// coarsest layer (Gaussian).
    temporal: Vec<TemporalBuffer>,

    /// Mean of each channel over the ROI, shape = (channels, n_buffered_frames).
    average_roi_pixels: Array2<f32>,

    /// Ring buffer write cursor: frames popped since the last reallocation.
    frame_id: usize,
}

impl DataContainer {
    pub fn new(params: &ParameterStore) -> Result<Self> {
        validate_roi(params)?;
        let mut container = Self {
            params: params.clone(),
            previous_frame: None,
            current_frame: None,
            current_layers: Vec::new(),
            lowpass_lo: Vec::new(),
            lowpass_hi: Vec::new(),
            temporal: Vec::new(),
            average_roi_pixels: Array2::zeros((0, 0)),
            frame_id: 0,
        };
        container.init_buffers();
        Ok(container)
    }

    /// Accept a new frame together with this frame's configuration snapshot.
    ///
    /// A material configuration change (layer count, ring depth, ROI size,
    /// channel count or filter type) reallocates every buffer and discards
    /// history. All other fields are adopted as-is.
    pub fn push_frame(&mut self, frame: Frame, params: &ParameterStore) -> Result<()> {
        let expected_channels = params.n_channels;
        if frame.channels() != expected_channels {
            return Err(VidmagError::ShapeMismatch {
                expected: (frame.height(), frame.width(), expected_channels),
                found: frame.data.dim(),
            });
        }
        if !params.roi.fits_within(frame.width(), frame.height()) {
            return Err(invalid_roi(&params.roi, "ROI exceeds frame bounds"));
        }

        if self.params.requires_reallocation(params) {
            validate_roi(params)?;
            self.params = params.clone();
            self.init_buffers();
        } else {
            self.params = params.clone();
        }

        self.current_frame = Some(frame);
        Ok(())
    }

    /// Finish the current frame: record ROI averages, advance the ring
    /// cursor and hand the frame out.
    pub fn pop_frame(&mut self) -> Result<Frame> {
        let frame = self.current_frame.take().ok_or(VidmagError::NoCurrentFrame)?;

        if self.params.analyze_heartbeat {
            let slot = self.ring_slot();
            let means = frame.channel_means(&self.params.roi);
            for (channel, mean) in means.into_iter().enumerate().take(self.average_roi_pixels.nrows()) {
                self.average_roi_pixels[[channel, slot]] = mean;
            }
        }

        self.previous_frame = Some(frame.clone());
        self.frame_id += 1;
        Ok(frame)
    }

    /// Extract-and-clear: copy the ROI of the current frame and zero it in place.
    pub fn take_roi(&mut self) -> Result<Layer> {
        let roi = self.params.roi;
        let frame = self.current_frame.as_mut().ok_or(VidmagError::NoCurrentFrame)?;
        let mut view = frame.roi_mut(&roi);
        let copy = view.to_owned();
        view.fill(0.0);
        Ok(copy)
    }

    /// Accumulate: add ROI-sized data onto the current frame's ROI.
    pub fn accumulate_roi(&mut self, data: &Layer) -> Result<()> {
        let roi = self.params.roi;
        let frame = self.current_frame.as_mut().ok_or(VidmagError::NoCurrentFrame)?;
        let mut view = frame.roi_mut(&roi);
        if view.dim() != data.dim() {
            return Err(VidmagError::ShapeMismatch {
                expected: view.dim(),
                found: data.dim(),
            });
        }
        view += data;
        Ok(())
    }

    /// Store the spatial data of layer `scale` for this frame.
    pub fn put_layer(&mut self, scale: usize, layer: Layer) -> Result<()> {
        self.check_scale(scale)?;
        let slot = self.ring_slot();
        match self.route(scale) {
            Some(buffer) => self.temporal[buffer].write_column(slot, &layer),
            None => {
                self.current_layers[scale] = layer;
                Ok(())
            }
        }
    }

    /// The (possibly filtered) spatial data of layer `scale` for this frame.
    pub fn layer(&self, scale: usize) -> Result<Layer> {
        self.check_scale(scale)?;
        match self.route(scale) {
            Some(buffer) => {
                self.temporal[buffer].read_column(self.ring_slot(), self.layer_shape(scale))
            }
            None => Ok(self.current_layers[scale].clone()),
        }
    }

    /// Which temporal buffer layer `scale` is routed through, if any.
    fn route(&self, scale: usize) -> Option<usize> {
        match (self.params.temporal_filter, self.params.spatial_filter) {
            (TemporalFilterType::Ideal, SpatialFilterType::Laplacian) => Some(scale),
            (TemporalFilterType::Ideal, SpatialFilterType::Gaussian)
                if scale + 1 == self.params.n_layers =>
            {
                Some(0)
            }
            _ => None,
        }
    }

    fn check_scale(&self, scale: usize) -> Result<()> {
        if scale >= self.params.n_layers {
            return Err(VidmagError::LayerOutOfRange {
                scale,
                total: self.params.n_layers,
            });
        }
        Ok(())
    }

    /// Shape (height, width, channels) of layer `scale`.
    pub fn layer_shape(&self, scale: usize) -> (usize, usize, usize) {
        let (w, h) = fit_to_layer(self.params.roi.width, self.params.roi.height, scale);
        (h, w, self.params.n_channels)
    }

    /// Input series of `buffer`, pixel `series`, `channel`.
    pub fn input_timeseries(
        &self,
        buffer: usize,
        series: usize,
        channel: usize,
    ) -> Option<ArrayView1<'_, f32>> {
        let row = series * self.params.n_channels + channel;
        self.temporal.get(buffer)?.input_row(row)
    }

    /// Output series of `buffer`, pixel `series`, `channel`.
    pub fn output_timeseries(
        &self,
        buffer: usize,
        series: usize,
        channel: usize,
    ) -> Option<ArrayView1<'_, f32>> {
        let row = series * self.params.n_channels + channel;
        self.temporal.get(buffer)?.output_row(row)
    }

    /// Transform scratch bins of `buffer`, pixel `series`, `channel`.
    pub fn spectrum(&self, buffer: usize, series: usize, channel: usize) -> Option<ArrayView1<'_, Complex32>> {
        let row = series * self.params.n_channels + channel;
        let buffer = self.temporal.get(buffer)?;
        (row < buffer.rows()).then(|| buffer.spectrum.row(row))
    }

    pub fn temporal_buffers(&self) -> &[TemporalBuffer] {
        &self.temporal
    }

    pub fn temporal_buffers_mut(&mut self) -> &mut [TemporalBuffer] {
        &mut self.temporal
    }

    pub fn lowpass_lo(&self, scale: usize) -> Option<&Layer> {
        self.lowpass_lo.get(scale)
    }

    pub fn lowpass_hi(&self, scale: usize) -> Option<&Layer> {
        self.lowpass_hi.get(scale)
    }

    /// Plain layers together with the IIR accumulators, split for
    /// independent per-layer updates.
    pub fn iir_bank_mut(&mut self) -> (&mut [Layer], &mut [Layer], &mut [Layer]) {
        (
            &mut self.current_layers,
            &mut self.lowpass_lo,
            &mut self.lowpass_hi,
        )
    }

    /// ROI average ring, shape = (channels, n_buffered_frames), slot order.
    pub fn average_roi_pixels(&self) -> &Array2<f32> {
        &self.average_roi_pixels
    }

    /// Frames recorded since the last reallocation, counting the one in flight.
    pub fn frames_seen(&self) -> usize {
        self.frame_id + 1
    }

    /// Valid prefix of every ring buffer: `min(n_buffered_frames, frames_seen)`.
    pub fn window_len(&self) -> usize {
        self.frames_seen().min(self.params.n_buffered_frames)
    }

    /// Whether every ring slot holds real data.
    pub fn is_full(&self) -> bool {
        self.frames_seen() >= self.params.n_buffered_frames
    }

    /// Ring slot written by the frame in flight.
    pub fn ring_slot(&self) -> usize {
        self.frame_id % self.params.n_buffered_frames
    }

    /// Frames popped since the last reallocation.
    pub fn frame_count(&self) -> usize {
        self.frame_id
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn roi(&self) -> Rect {
        self.params.roi
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_frame.as_ref()
    }

    pub fn previous_frame(&self) -> Option<&Frame> {
        self.previous_frame.as_ref()
    }

    fn init_buffers(&mut self) {
        let params = &self.params;
        let n_layers = params.n_layers;
        let depth = params.n_buffered_frames;
        let channels = params.n_channels;
        let layer_rows = |scale: usize| {
            let (w, h) = fit_to_layer(params.roi.width, params.roi.height, scale);
            w * h * channels
        };

        info!(
            layers = n_layers,
            depth,
            roi = %params.roi,
            spatial = %params.spatial_filter,
            temporal = %params.temporal_filter,
            "Allocating frame store buffers"
        );

        self.frame_id = 0;
        self.current_layers = (0..n_layers)
            .map(|scale| Array3::zeros(self.layer_shape(scale)))
            .collect();

        self.temporal = match (params.temporal_filter, params.spatial_filter) {
            (TemporalFilterType::Ideal, SpatialFilterType::Laplacian) => (0..n_layers)
                .map(|scale| TemporalBuffer::new(layer_rows(scale), depth))
                .collect(),
            (TemporalFilterType::Ideal, SpatialFilterType::Gaussian) => {
                vec![TemporalBuffer::new(layer_rows(n_layers - 1), depth)]
            }
            _ => Vec::new(),
        };

        if params.temporal_filter == TemporalFilterType::Iir && params.spatial_active() {
            self.lowpass_lo = self.current_layers.iter().map(|l| Array3::zeros(l.dim())).collect();
            self.lowpass_hi = self.current_layers.iter().map(|l| Array3::zeros(l.dim())).collect();
        } else {
            self.lowpass_lo.clear();
            self.lowpass_hi.clear();
        }

        self.average_roi_pixels = Array2::zeros((channels, depth));
    }
}

fn invalid_roi(roi: &Rect, reason: &str) -> VidmagError {
    VidmagError::InvalidRoi {
        x: roi.x,
        y: roi.y,
        width: roi.width,
        height: roi.height,
        reason: reason.to_string(),
    }
}

/// Reject configurations that would produce an unusable buffer layout.
fn validate_roi(params: &ParameterStore) -> Result<()> {
    let roi = &params.roi;
    if roi.is_empty() {
        return Err(invalid_roi(roi, "ROI is empty"));
    }
    if params.n_buffered_frames == 0 || params.n_layers == 0 || params.n_channels == 0 {
        return Err(invalid_roi(
            roi,
            "layer count, buffer depth and channel count must be non-zero",
        ));
    }
    if params.spatial_active() {
        let align = alignment(params.n_layers);
        if roi.width % align != 0 || roi.height % align != 0 {
            return Err(invalid_roi(
                roi,
                &format!("ROI size must be a multiple of {align} for {} layers", params.n_layers),
            ));
        }
    }
    Ok(())
}
