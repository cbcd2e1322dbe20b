use ndarray::Zip;
use rayon::prelude::*;

use crate::container::DataContainer;
use crate::error::Result;
use crate::pipeline::config::{ParameterStore, SpatialFilterType};

use super::effective_amplification;

/// Streaming two-pole band-pass.
///
/// Each layer keeps two exponential low-pass accumulators; their difference
/// is the band-passed signal, which is added back scaled by the layer's
/// clamped amplification:
///
/// ```text
/// lowpass_hi <- (1 - cutoff_hi) * lowpass_hi + cutoff_hi * layer
/// lowpass_lo <- (1 - cutoff_lo) * lowpass_lo + cutoff_lo * layer
/// layer      <- layer + amplification * (lowpass_hi - lowpass_lo)
/// ```
///
/// Under Gaussian decomposition only the coarsest layer is filtered.
pub fn iir_filter(params: &ParameterStore, container: &mut DataContainer) -> Result<()> {
    let start = match params.spatial_filter {
        SpatialFilterType::Gaussian => params.n_layers.saturating_sub(1),
        _ => 0,
    };
    let cutoff_hi = params.cutoff_hi;
    let cutoff_lo = params.effective_cutoff_lo();

    let (layers, lowpass_lo, lowpass_hi) = container.iir_bank_mut();
    let end = layers.len().min(lowpass_lo.len()).min(lowpass_hi.len());
    if start >= end {
        return Ok(());
    }

    layers[start..end]
        .par_iter_mut()
        .zip(lowpass_lo[start..end].par_iter_mut())
        .zip(lowpass_hi[start..end].par_iter_mut())
        .enumerate()
        .for_each(|(offset, ((layer, lo), hi))| {
            let amplification = effective_amplification(params, start + offset);
            Zip::from(layer).and(lo).and(hi).for_each(|x, lo, hi| {
                *hi = (1.0 - cutoff_hi) * *hi + cutoff_hi * *x;
                *lo = (1.0 - cutoff_lo) * *lo + cutoff_lo * *x;
                *x += amplification * (*hi - *lo);
            });
        });

    Ok(())
}
