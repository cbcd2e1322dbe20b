mod common;

use std::f32::consts::PI;

use vidmag_core::pipeline::config::{ParameterStore, SpatialFilterType, TemporalFilterType};
use vidmag_core::pipeline::Magnifier;
use vidmag_core::roi::{Rect, Selection};
use vidmag_core::temporal::{band_bins, effective_amplification, PlanKey, PlanQuality, TransformPlans};

use common::{constant_frame, max_abs_diff, params_with, pattern_frame};

fn moving_frame(k: usize) -> vidmag_core::frame::Frame {
    let mut frame = pattern_frame(16, 16);
    frame.data.mapv_inplace(|v| v + 0.05 * (k as f32 * 0.9).sin());
    frame
}

#[test]
fn test_zero_alpha_passes_input_through() {
    for spatial in [SpatialFilterType::Laplacian, SpatialFilterType::Gaussian] {
        let mut params = params_with(Rect::new(0, 0, 16, 16), spatial, TemporalFilterType::Ideal, 3, 8);
        params.alpha = 0.0;
        let mut magnifier = Magnifier::new();

        for k in 0..12 {
            let input = moving_frame(k);
            let expected = input.data.clone();
            let out = magnifier.process(input, &params, &Selection::default()).unwrap();
            let err = max_abs_diff(&out.frame.data, &expected);
            assert!(err < 1e-4, "{spatial} frame {k}: max error {err}");
        }
    }
}

#[test]
fn test_empty_band_is_a_no_op() {
    let mut params = params_with(
        Rect::new(0, 0, 16, 16),
        SpatialFilterType::Laplacian,
        TemporalFilterType::Ideal,
        2,
        8,
    );
    params.alpha = 50.0;
    params.min_freq = 3.0;
    params.max_freq = 3.0;
    let mut magnifier = Magnifier::new();

    for k in 0..10 {
        let input = moving_frame(k);
        let expected = input.data.clone();
        let out = magnifier.process(input, &params, &Selection::default()).unwrap();
        assert!(max_abs_diff(&out.frame.data, &expected) < 1e-4);
    }
}

#[test]
fn test_in_band_tone_is_amplified() {
    let fps = 30;
    let mut params = ParameterStore {
        spatial_filter: SpatialFilterType::Laplacian,
        temporal_filter: TemporalFilterType::Ideal,
        roi: Rect::new(0, 0, 4, 4),
        n_layers: 1,
        n_buffered_frames: 30,
        fps,
        min_freq: 1.0,
        max_freq: 3.0,
        ..ParameterStore::default()
    };
    params.alpha = 10.0;
    let gain = 1.0 + effective_amplification(&params, 0);
    assert!(gain > 1.0);

    let tone = |k: usize| 0.1 * (2.0 * PI * 2.0 * k as f32 / fps as f32).sin();
    let mut magnifier = Magnifier::new();
    let mut last = None;
    for k in 0..30 {
        let frame = constant_frame(4, 4, 0.5 + tone(k));
        last = Some(magnifier.process(frame, &params, &Selection::default()).unwrap());
    }

    let out = last.unwrap();
    let expected = 0.5 + gain * tone(29);
    for &v in out.frame.data.iter() {
        assert!((v - expected).abs() < 1e-3, "got {v}, expected {expected}");
    }

    let container = magnifier.container().unwrap();
    let input = container.input_timeseries(0, 0, 0).unwrap();
    let output = container.output_timeseries(0, 0, 0).unwrap();
    assert!((input[29] - (0.5 + tone(29))).abs() < 1e-6);
    assert!((output[29] - expected).abs() < 1e-3);
    assert_eq!(container.spectrum(0, 0, 0).unwrap().len(), 16);
    assert!(container.spectrum(1, 0, 0).is_none());
}

#[test]
fn test_out_of_band_tone_is_untouched() {
    let fps = 30;
    let params = ParameterStore {
        spatial_filter: SpatialFilterType::Laplacian,
        temporal_filter: TemporalFilterType::Ideal,
        roi: Rect::new(0, 0, 4, 4),
        n_layers: 1,
        n_buffered_frames: 30,
        fps,
        min_freq: 1.0,
        max_freq: 2.0,
        alpha: 20.0,
        ..ParameterStore::default()
    };

    // 5 Hz lies above the band.
    let tone = |k: usize| 0.1 * (2.0 * PI * 5.0 * k as f32 / fps as f32).sin();
    let mut magnifier = Magnifier::new();
    let mut last = None;
    for k in 0..30 {
        let frame = constant_frame(4, 4, 0.5 + tone(k));
        last = Some(magnifier.process(frame, &params, &Selection::default()).unwrap());
    }

    let out = last.unwrap();
    let expected = 0.5 + tone(29);
    assert!(out.frame.data.iter().all(|&v| (v - expected).abs() < 1e-3));
}

#[test]
fn test_band_bins() {
    let params = ParameterStore {
        fps: 30,
        min_freq: 1.0,
        max_freq: 2.0,
        ..ParameterStore::default()
    };
    assert_eq!(band_bins(&params, 30), Some(1..2));
    assert_eq!(band_bins(&params, 150), Some(5..10));
    // Too short to resolve 1 Hz.
    assert_eq!(band_bins(&params, 10), None);

    let inverted = ParameterStore {
        min_freq: 2.0,
        max_freq: 1.0,
        ..params.clone()
    };
    assert_eq!(band_bins(&inverted, 150), None);

    let wide = ParameterStore {
        max_freq: 100.0,
        ..params
    };
    assert_eq!(band_bins(&wide, 30), Some(1..16));
}

#[test]
fn test_plans_regenerate_only_on_key_change() {
    let mut plans = TransformPlans::new();
    assert_eq!(plans.key(), None);

    let first = plans.ensure(3, 16, PlanQuality::Estimate);
    assert_eq!(first.window(), 16);
    assert_eq!(first.bins(), 9);
    assert_eq!(plans.generation(), 1);

    plans.ensure(3, 16, PlanQuality::Measured);
    assert_eq!(plans.generation(), 1);

    plans.ensure(3, 17, PlanQuality::Measured);
    plans.ensure(2, 17, PlanQuality::Measured);
    assert_eq!(plans.generation(), 3);
    assert_eq!(plans.key(), Some(PlanKey { n_layers: 2, window: 17 }));
}

#[test]
fn test_magnifier_settles_on_full_window_plans() {
    let params = params_with(
        Rect::new(0, 0, 16, 16),
        SpatialFilterType::Laplacian,
        TemporalFilterType::Ideal,
        3,
        6,
    );
    let mut magnifier = Magnifier::new();
    for k in 0..10 {
        magnifier
            .process(moving_frame(k), &params, &Selection::default())
            .unwrap();
    }

    let plans = magnifier.ideal_filter().plans();
    assert_eq!(plans.key(), Some(PlanKey { n_layers: 3, window: 6 }));
    // One plan per window length while filling, then none.
    assert_eq!(plans.generation(), 6);
}

#[test]
fn test_amplification_never_exceeds_alpha() {
    for &alpha in &[0.0, 1.0, 10.0, 150.0] {
        for &lambda_c in &[1.0, 16.0, 100.0, 1000.0] {
            let params = ParameterStore {
                roi: Rect::new(0, 0, 64, 32),
                n_layers: 4,
                alpha,
                lambda_c,
                ..ParameterStore::default()
            };
            for scale in 0..4 {
                let amp = effective_amplification(&params, scale);
                assert!(amp <= alpha, "alpha={alpha} lambda_c={lambda_c} scale={scale}: {amp}");
                assert!(amp >= 0.0);
            }
        }
    }
}
