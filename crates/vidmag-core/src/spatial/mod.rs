//! Laplacian pyramid decomposition of the ROI and additive reconstruction.
//!
//! Layers `0..L-1` hold `image - pyr_up(pyr_down(image))` residuals and layer
//! `L-1` holds the coarsest low-pass image. Because both resampling steps are
//! linear, upsampling every layer back to ROI size and summing reproduces the
//! ROI exactly (up to float rounding).

pub mod pyramid;

use crate::container::DataContainer;
use crate::error::Result;
use crate::frame::Layer;
use crate::roi::fit_to_layer;

pub use pyramid::{mirror_index, pyr_down, pyr_up};

/// Decompose `roi` into `n_layers` layers, finest first.
pub fn decompose(roi: &Layer, n_layers: usize) -> Vec<Layer> {
    let mut layers = Vec::with_capacity(n_layers);
    let mut current = roi.clone();

    for _ in 0..n_layers.saturating_sub(1) {
        let (h, w, _) = current.dim();
        let down = pyr_down(&current);
        let up = pyr_up(&down, (h, w));
        layers.push(&current - &up);
        current = down;
    }
    layers.push(current);

    layers
}

/// Upsample layer `scale` back to the ROI size `(height, width)`.
pub fn expand_layer(layer: &Layer, scale: usize, roi_size: (usize, usize)) -> Layer {
    let (roi_h, roi_w) = roi_size;
    let mut expanded = layer.clone();
    for target in (0..scale).rev() {
        let (w, h) = fit_to_layer(roi_w, roi_h, target);
        expanded = pyr_up(&expanded, (h, w));
    }
    expanded
}

/// Sum of all layers expanded to ROI size.
pub fn compose(layers: &[Layer], roi_size: (usize, usize)) -> Option<Layer> {
    let mut iter = layers.iter().enumerate();
    let (_, first) = iter.next()?;
    let mut result = expand_layer(first, 0, roi_size);
    for (scale, layer) in iter {
        result += &expand_layer(layer, scale, roi_size);
    }
    Some(result)
}

/// Extract the ROI from the store (clearing it) and store its pyramid layers.
pub fn spatial_decomp(container: &mut DataContainer) -> Result<()> {
    let n_layers = container.params().n_layers;
    let roi = container.take_roi()?;
    for (scale, layer) in decompose(&roi, n_layers).into_iter().enumerate() {
        container.put_layer(scale, layer)?;
    }
    Ok(())
}

/// Expand every stored layer and accumulate it into the cleared ROI.
pub fn spatial_comp(container: &mut DataContainer) -> Result<()> {
    let roi = container.roi();
    let roi_size = (roi.height, roi.width);
    for scale in 0..container.params().n_layers {
        let layer = container.layer(scale)?;
        container.accumulate_roi(&expand_layer(&layer, scale, roi_size))?;
    }
    Ok(())
}
