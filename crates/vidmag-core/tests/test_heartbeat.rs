mod common;

use std::f32::consts::PI;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use vidmag_core::analysis::{argmax, mean_std, normalize_min_max, HeartbeatAnalyzer};
use vidmag_core::io::{FrameSource, SyntheticPulseSource};
use vidmag_core::pipeline::config::ParameterStore;
use vidmag_core::pipeline::Magnifier;
use vidmag_core::roi::Selection;

use common::Noise;

const FPS: u32 = 16;
const N: usize = 64;
/// Bin 5 of a 64-sample window at 16 fps: 1.25 Hz, 75 per minute.
const PULSE_HZ: f32 = 1.25;

#[test]
fn test_detects_tone_among_noise_channels() {
    let mut noise = Noise::new(7);
    let samples = Array2::from_shape_fn((3, N), |(c, i)| {
        let t = i as f32 / FPS as f32;
        match c {
            1 => 0.5 + 0.05 * (2.0 * PI * PULSE_HZ * t).sin(),
            _ => 0.5 + noise.next(0.4),
        }
    });

    let mut analyzer = HeartbeatAnalyzer::new();
    let result = analyzer.analyze_samples(&samples, 0, FPS).unwrap();

    assert_eq!(result.best_channel, 1);
    let resolution = FPS as f64 / N as f64 * 60.0;
    assert!(
        (result.heartbeat_rate - 75.0).abs() <= resolution,
        "rate {}",
        result.heartbeat_rate
    );
    assert_abs_diff_eq!(result.heartbeat_rate, 75.0, epsilon = 1e-6);

    assert_eq!(result.timedomain_keys.len(), N);
    assert_eq!(result.frequencydomain_keys.len(), N / 2);
    assert_abs_diff_eq!(result.timedomain_keys[16], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(result.frequencydomain_keys[0], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(result.frequencydomain_values[4], 1.0, epsilon = 1e-12);
}

#[test]
fn test_series_are_normalized_and_chronological() {
    // Ramp written into a ring whose oldest sample sits in slot 3.
    let samples = Array2::from_shape_fn((1, 8), |(_, slot)| ((slot + 8 - 3) % 8) as f32);
    let mut analyzer = HeartbeatAnalyzer::new();
    let result = analyzer.analyze_samples(&samples, 3, 8).unwrap();

    let values = &result.timedomain_values;
    assert_abs_diff_eq!(values[0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(values[7], 1.0, epsilon = 1e-12);
    assert!(values.windows(2).all(|w| w[1] > w[0]));

    let spectrum = &result.frequencydomain_values;
    assert!(spectrum.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(spectrum.iter().any(|&v| v == 1.0));
}

#[test]
fn test_degenerate_inputs() {
    let mut analyzer = HeartbeatAnalyzer::new();
    assert!(analyzer.analyze_samples(&Array2::zeros((3, 1)), 0, 30).is_none());
    assert!(analyzer.analyze_samples(&Array2::zeros((0, 8)), 0, 30).is_none());

    let flat = Array2::from_elem((2, 8), 0.5f32);
    let result = analyzer.analyze_samples(&flat, 0, 30).unwrap();
    assert_eq!(result.best_channel, 0);
    assert!(result.timedomain_values.iter().all(|&v| v == 0.0));
    assert!(result.frequencydomain_values.iter().all(|&v| v == 0.0));
}

#[test]
fn test_plan_is_cached_by_length() {
    let mut analyzer = HeartbeatAnalyzer::new();
    let samples = Array2::from_elem((1, 16), 1.0f32);
    analyzer.analyze_samples(&samples, 0, 30);
    analyzer.analyze_samples(&samples, 5, 30);
    assert_eq!(analyzer.generation(), 1);

    analyzer.analyze_samples(&Array2::from_elem((1, 20), 1.0f32), 0, 30);
    assert_eq!(analyzer.generation(), 2);
}

#[test]
fn test_helpers() {
    assert_eq!(normalize_min_max(&[2.0f32, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
    assert_eq!(normalize_min_max(&[1.0f64; 3]), vec![0.0; 3]);

    let (mean, std) = mean_std(&[2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
    assert_abs_diff_eq!(mean, 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(std, 2.0, epsilon = 1e-12);

    assert_eq!(argmax(&[1.0f32, 3.0, 3.0, 2.0]), Some(1));
    assert_eq!(argmax::<f32>(&[]), None);
}

#[test]
fn test_pipeline_reports_pulse_rate() {
    let mut source = SyntheticPulseSource::new(32, 24, FPS)
        .with_pulse(PULSE_HZ, 0.05)
        .with_frame_count(N);
    let mut params = ParameterStore::for_source(&source.info());
    params.n_buffered_frames = N;
    params.analyze_heartbeat = true;

    let mut magnifier = Magnifier::new();
    let mut last = None;
    while let Some(frame) = source.next_frame().unwrap() {
        let out = magnifier.process(frame, &params, &Selection::default()).unwrap();
        assert!(out.analysis.is_some());
        last = out.analysis;
    }

    let result = last.unwrap();
    assert_abs_diff_eq!(result.heartbeat_rate, 75.0, epsilon = 1e-6);
    assert_eq!(result.timedomain_values.len(), N);
    // The ring length never changed, so the plan was built once.
    assert_eq!(magnifier.analyzer().generation(), 1);
}

#[test]
fn test_partial_window_transforms_full_ring() {
    const DEPTH: usize = 16;
    const FRAMES: usize = 5;
    let params = ParameterStore {
        n_buffered_frames: DEPTH,
        analyze_heartbeat: true,
        ..ParameterStore::default()
    };

    let mut magnifier = Magnifier::new();
    let mut last = None;
    for i in 0..FRAMES {
        let frame = common::constant_frame(24, 32, 0.2 + 0.1 * i as f32);
        last = magnifier.process(frame, &params, &Selection::default()).unwrap().analysis;
    }
    assert!(!magnifier.container().unwrap().is_full());

    let result = last.unwrap();
    assert_eq!(result.timedomain_keys.len(), DEPTH);
    assert_eq!(result.timedomain_values.len(), DEPTH);
    assert_eq!(result.frequencydomain_values.len(), DEPTH / 2);

    // Unfilled slots come first, then the recorded frames oldest to newest.
    let (empty, recorded) = result.timedomain_values.split_at(DEPTH - FRAMES);
    assert!(empty.iter().all(|&v| v == 0.0));
    assert!(recorded.windows(2).all(|w| w[1] > w[0]));
    assert_abs_diff_eq!(recorded[FRAMES - 1], 1.0, epsilon = 1e-9);
}
