//! Temporal band-pass filters applied to each pyramid layer.

mod ideal;
mod iir;
pub mod plans;

pub use ideal::{band_bins, IdealFilter};
pub use iir::iir_filter;
pub use plans::{PlanHandle, PlanKey, PlanQuality, TransformPlans};

use crate::pipeline::config::ParameterStore;
use crate::roi::fit_to_layer;

/// Diagonal size of layer `scale` of the ROI.
pub fn spatial_wavelength(params: &ParameterStore, scale: usize) -> f32 {
    let (w, h) = fit_to_layer(params.roi.width, params.roi.height, scale);
    ((w * w + h * h) as f32).sqrt()
}

/// Amplification a layer would get from its spatial wavelength alone.
pub fn calculated_alpha(params: &ParameterStore, scale: usize) -> f32 {
    spatial_wavelength(params, scale) / params.lambda_c * (1.0 + params.alpha)
}

/// Amplification actually applied to layer `scale`; never exceeds `alpha`.
/// Layers with a short spatial wavelength end up below `alpha`.
pub fn effective_amplification(params: &ParameterStore, scale: usize) -> f32 {
    calculated_alpha(params, scale).min(params.alpha)
}
