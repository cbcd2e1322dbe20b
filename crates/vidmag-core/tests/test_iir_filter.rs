mod common;

use vidmag_core::pipeline::config::{SpatialFilterType, TemporalFilterType};
use vidmag_core::pipeline::Magnifier;
use vidmag_core::roi::{Rect, Selection};

use common::{constant_frame, params_with};

#[test]
fn test_constant_input_converges_to_input() {
    let params = params_with(
        Rect::new(0, 0, 8, 8),
        SpatialFilterType::Laplacian,
        TemporalFilterType::Iir,
        2,
        30,
    );
    let mut magnifier = Magnifier::new();

    let first = magnifier
        .process(constant_frame(8, 8, 0.4), &params, &Selection::default())
        .unwrap();
    // Accumulators start at zero, so the first output is overshooting.
    assert!(first.frame.data.iter().all(|&v| v - 0.4 > 0.01));

    let mut last = first;
    for _ in 0..200 {
        last = magnifier
            .process(constant_frame(8, 8, 0.4), &params, &Selection::default())
            .unwrap();
    }
    assert!(last.frame.data.iter().all(|&v| (v - 0.4).abs() < 1e-4));

    let container = magnifier.container().unwrap();
    let lo = container.lowpass_lo(1).unwrap();
    let hi = container.lowpass_hi(1).unwrap();
    assert!(lo.iter().all(|&v| (v - 0.4).abs() < 1e-4));
    assert!(hi.iter().all(|&v| (v - 0.4).abs() < 1e-4));
}

#[test]
fn test_zero_cutoff_lo_is_floored() {
    let mut params = params_with(
        Rect::new(0, 0, 4, 4),
        SpatialFilterType::Laplacian,
        TemporalFilterType::Iir,
        1,
        10,
    );
    params.cutoff_lo = 0.0;
    let mut magnifier = Magnifier::new();

    for _ in 0..5 {
        magnifier
            .process(constant_frame(4, 4, 0.5), &params, &Selection::default())
            .unwrap();
    }
    let lo = magnifier.container().unwrap().lowpass_lo(0).unwrap();
    // With a zero weight the accumulator would still be exactly zero.
    assert!(lo.iter().all(|&v| v > 0.0 && v < 0.01));
}

#[test]
fn test_gaussian_filters_only_coarsest_layer() {
    let params = params_with(
        Rect::new(0, 0, 8, 8),
        SpatialFilterType::Gaussian,
        TemporalFilterType::Iir,
        2,
        10,
    );
    let mut magnifier = Magnifier::new();
    magnifier
        .process(constant_frame(8, 8, 0.3), &params, &Selection::default())
        .unwrap();

    let container = magnifier.container().unwrap();
    assert!(container.lowpass_hi(0).unwrap().iter().all(|&v| v == 0.0));
    assert!(container.lowpass_hi(1).unwrap().iter().all(|&v| v > 0.0));
}

#[test]
fn test_zero_alpha_passes_input_through() {
    let mut params = params_with(
        Rect::new(0, 0, 8, 8),
        SpatialFilterType::Laplacian,
        TemporalFilterType::Iir,
        3,
        10,
    );
    params.alpha = 0.0;
    let mut magnifier = Magnifier::new();

    for k in 0..5 {
        let value = 0.2 + 0.1 * k as f32;
        let out = magnifier
            .process(constant_frame(8, 8, value), &params, &Selection::default())
            .unwrap();
        assert!(out.frame.data.iter().all(|&v| (v - value).abs() < 1e-5));
    }
}
