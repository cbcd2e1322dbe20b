use std::ops::Range;

use ndarray::{ArrayView1, ArrayViewMut1, Axis};
use num_complex::Complex32;
use rayon::prelude::*;

use crate::container::{DataContainer, TemporalBuffer};
use crate::error::{Result, VidmagError};
use crate::pipeline::config::{ParameterStore, SpatialFilterType};

use super::effective_amplification;
use super::plans::{PlanHandle, PlanQuality, TransformPlans};

/// Finite-window frequency-domain band-pass.
///
/// Each pixel x channel series is transformed over the valid window, the
/// bins inside `[min_freq, max_freq)` are multiplied by `1 + amplification`,
/// and the series is transformed back and normalized by the window length.
#[derive(Default)]
pub struct IdealFilter {
    plans: TransformPlans,
}

impl IdealFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plans(&self) -> &TransformPlans {
        &self.plans
    }

    /// Filter every temporal buffer held by `container`.
    pub fn apply(&mut self, params: &ParameterStore, container: &mut DataContainer) -> Result<()> {
        let n_buffers = container.temporal_buffers().len();
        if n_buffers == 0 {
            return Ok(());
        }

        let window = container.window_len();
        let quality = if container.is_full() {
            PlanQuality::Measured
        } else {
            PlanQuality::Estimate
        };
        let plan = self.plans.ensure(n_buffers, window, quality);
        let band = band_bins(params, window);

        for (index, buffer) in container.temporal_buffers_mut().iter_mut().enumerate() {
            let scale = match params.spatial_filter {
                SpatialFilterType::Gaussian => params.n_layers - 1,
                _ => index,
            };
            let gain = 1.0 + effective_amplification(params, scale);
            filter_buffer(buffer, &plan, params, band.clone(), gain)?;
        }
        Ok(())
    }
}

/// Bins scaled by the band-pass, or `None` when the band is empty.
///
/// Bin `k` of a `window`-sample transform sits at `k * fps / window` Hz.
pub fn band_bins(params: &ParameterStore, window: usize) -> Option<Range<usize>> {
    if params.min_freq >= params.max_freq {
        return None;
    }
    let bins = window / 2 + 1;
    let to_bin = |freq: f32| -> usize {
        let bin = (freq.max(0.0) * window as f32 / params.fps.max(1) as f32).floor();
        (bin as usize).min(bins)
    };
    let lo = to_bin(params.min_freq);
    let hi = to_bin(params.max_freq);
    (lo < hi).then_some(lo..hi)
}

fn filter_buffer(
    buffer: &mut TemporalBuffer,
    plan: &PlanHandle,
    params: &ParameterStore,
    band: Option<Range<usize>>,
    gain: f32,
) -> Result<()> {
    let n_channels = params.n_channels.max(1);
    let TemporalBuffer {
        input,
        output,
        spectrum,
    } = buffer;

    input
        .axis_iter(Axis(0))
        .into_par_iter()
        .zip(output.axis_iter_mut(Axis(0)).into_par_iter())
        .zip(spectrum.axis_iter_mut(Axis(0)).into_par_iter())
        .enumerate()
        .try_for_each(|(row, ((input, mut output), spectrum))| {
            if !params.channel_active(row % n_channels) {
                output.assign(&input);
                return Ok(());
            }
            filter_series(input, output, spectrum, plan, band.clone(), gain)
        })
}

fn filter_series(
    input: ArrayView1<f32>,
    mut output: ArrayViewMut1<f32>,
    mut spectrum: ArrayViewMut1<Complex32>,
    plan: &PlanHandle,
    band: Option<Range<usize>>,
    gain: f32,
) -> Result<()> {
    let window = plan.window();
    let input = input
        .as_slice()
        .ok_or_else(|| VidmagError::Transform("input series is not contiguous".into()))?;
    let samples = output
        .as_slice_mut()
        .ok_or_else(|| VidmagError::Transform("output series is not contiguous".into()))?;
    let bins = spectrum
        .as_slice_mut()
        .ok_or_else(|| VidmagError::Transform("spectrum is not contiguous".into()))?;

    let samples = &mut samples[..window];
    let bins = &mut bins[..plan.bins()];
    samples.copy_from_slice(&input[..window]);

    plan.forward
        .process(samples, bins)
        .map_err(|e| VidmagError::Transform(e.to_string()))?;

    if let Some(range) = band {
        for bin in &mut bins[range] {
            *bin *= gain;
        }
    }

    // The inverse transform rejects imaginary DC/Nyquist components.
    bins[0].im = 0.0;
    if window % 2 == 0 {
        bins[window / 2].im = 0.0;
    }

    plan.inverse
        .process(bins, samples)
        .map_err(|e| VidmagError::Transform(e.to_string()))?;

    let norm = 1.0 / window as f32;
    for v in samples.iter_mut() {
        *v *= norm;
    }
    Ok(())
}
