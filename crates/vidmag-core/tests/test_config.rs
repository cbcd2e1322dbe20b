use vidmag_core::color::ColorSpace;
use vidmag_core::frame::SourceInfo;
use vidmag_core::pipeline::config::{ParameterStore, SpatialFilterType, TemporalFilterType};
use vidmag_core::pipeline::ParameterHandle;
use vidmag_core::roi::Rect;

// ---------------------------------------------------------------------------
// Display / defaults
// ---------------------------------------------------------------------------

#[test]
fn test_filter_type_display() {
    assert_eq!(format!("{}", SpatialFilterType::None), "None");
    assert_eq!(format!("{}", SpatialFilterType::Laplacian), "Laplacian");
    assert_eq!(format!("{}", SpatialFilterType::Gaussian), "Gaussian");
    assert_eq!(format!("{}", TemporalFilterType::Ideal), "Ideal");
    assert_eq!(format!("{}", TemporalFilterType::Iir), "IIR");
    assert_eq!(format!("{}", ColorSpace::YCrCb), "YCrCb");
}

#[test]
fn test_defaults() {
    let params = ParameterStore::default();
    assert_eq!(params.spatial_filter, SpatialFilterType::None);
    assert_eq!(params.temporal_filter, TemporalFilterType::Ideal);
    assert_eq!(params.color_space, ColorSpace::Rgb);
    assert_eq!(params.n_layers, 3);
    assert_eq!(params.fps, 30);
    assert_eq!(params.n_buffered_frames, 150);
    assert_eq!(params.buffer_seconds(), 5);
    assert!(params.roi.is_empty());
    assert!(!params.analyze_heartbeat);
    assert!(!params.spatial_active());
}

// ---------------------------------------------------------------------------
// Source adoption
// ---------------------------------------------------------------------------

#[test]
fn test_for_source_keeps_buffer_seconds() {
    let info = SourceInfo {
        width: 320,
        height: 240,
        channels: 3,
        fps: 25,
        total_frames: 0,
    };
    let params = ParameterStore::for_source(&info);
    assert_eq!(params.fps, 25);
    assert_eq!(params.n_buffered_frames, 125);
    assert_eq!(params.active_channels.len(), 3);
    assert!(info.is_live());
}

#[test]
fn test_set_buffer_seconds_and_channel_flags() {
    let mut params = ParameterStore::default();
    params.set_buffer_seconds(2);
    assert_eq!(params.n_buffered_frames, 60);

    params.active_channels = vec![true, false];
    assert!(params.channel_active(0));
    assert!(!params.channel_active(1));
    // Missing flags default to enabled.
    assert!(params.channel_active(2));
}

// ---------------------------------------------------------------------------
// Sanitizing and reallocation
// ---------------------------------------------------------------------------

#[test]
fn test_sanitized_clamps_degenerate_values() {
    let params = ParameterStore {
        fps: 0,
        n_buffered_frames: 0,
        n_layers: 0,
        cutoff_lo: -1.0,
        ..ParameterStore::default()
    };
    let clean = params.sanitized();
    assert_eq!(clean.fps, 1);
    assert_eq!(clean.n_buffered_frames, 1);
    assert_eq!(clean.n_layers, 1);
    assert!((clean.cutoff_lo - 0.001).abs() < 1e-9);
    assert!((params.effective_cutoff_lo() - 0.001).abs() < 1e-9);
}

#[test]
fn test_requires_reallocation_only_on_layout_changes() {
    let base = ParameterStore {
        roi: Rect::new(0, 0, 32, 32),
        ..ParameterStore::default()
    };

    let tuned = ParameterStore {
        alpha: 5.0,
        min_freq: 0.5,
        color_space: ColorSpace::Yuv,
        roi: Rect::new(8, 8, 32, 32),
        ..base.clone()
    };
    assert!(!base.requires_reallocation(&tuned));

    let changes = [
        ParameterStore { n_layers: 4, ..base.clone() },
        ParameterStore { n_buffered_frames: 10, ..base.clone() },
        ParameterStore { roi: Rect::new(0, 0, 16, 32), ..base.clone() },
        ParameterStore { n_channels: 1, ..base.clone() },
        ParameterStore { spatial_filter: SpatialFilterType::Gaussian, ..base.clone() },
        ParameterStore { temporal_filter: TemporalFilterType::Iir, ..base.clone() },
    ];
    for next in &changes {
        assert!(base.requires_reallocation(next));
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_serde_round_trip() {
    let params = ParameterStore {
        spatial_filter: SpatialFilterType::Laplacian,
        temporal_filter: TemporalFilterType::Iir,
        color_space: ColorSpace::Xyz,
        roi: Rect::new(4, 8, 64, 32),
        alpha: 12.5,
        active_channels: vec![true, false, true],
        ..ParameterStore::default()
    };
    let json = serde_json::to_string(&params).unwrap();
    let restored: ParameterStore = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, params);
}

#[test]
fn test_missing_fields_take_defaults() {
    let restored: ParameterStore =
        serde_json::from_str(r#"{"alpha": 20.0, "spatial_filter": "Gaussian"}"#).unwrap();
    assert!((restored.alpha - 20.0).abs() < 1e-6);
    assert_eq!(restored.spatial_filter, SpatialFilterType::Gaussian);
    assert_eq!(restored.n_layers, 3);
    assert_eq!(restored.temporal_filter, TemporalFilterType::Ideal);
}

// ---------------------------------------------------------------------------
// ParameterHandle
// ---------------------------------------------------------------------------

#[test]
fn test_handle_snapshots_are_frozen() {
    let handle = ParameterHandle::new(ParameterStore::default());
    let before = handle.snapshot();

    handle.update(|p| p.alpha = 99.0);
    assert!((before.alpha - 50.0).abs() < 1e-6);
    assert!((handle.snapshot().alpha - 99.0).abs() < 1e-6);

    let other = handle.clone();
    other.publish(ParameterStore {
        n_layers: 5,
        ..ParameterStore::default()
    });
    assert_eq!(handle.snapshot().n_layers, 5);
}

#[test]
fn test_handle_reset_keeps_source_settings() {
    let handle = ParameterHandle::new(ParameterStore {
        fps: 20,
        n_channels: 1,
        n_buffered_frames: 60,
        alpha: 7.0,
        spatial_filter: SpatialFilterType::Laplacian,
        ..ParameterStore::default()
    });
    handle.reset();

    let params = handle.snapshot();
    assert_eq!(params.fps, 20);
    assert_eq!(params.n_channels, 1);
    assert_eq!(params.active_channels, vec![true]);
    assert_eq!(params.n_buffered_frames, 60);
    assert!((params.alpha - 50.0).abs() < 1e-6);
    assert_eq!(params.spatial_filter, SpatialFilterType::None);
}

#[test]
fn test_handle_is_shared_across_threads() {
    let handle = ParameterHandle::default();
    let writer = handle.clone();
    std::thread::spawn(move || writer.update(|p| p.max_freq = 4.0))
        .join()
        .unwrap();
    assert!((handle.snapshot().max_freq - 4.0).abs() < 1e-6);
}
