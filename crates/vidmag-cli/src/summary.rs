use std::path::Path;

use console::Style;
use vidmag_core::analysis::AnalysisResult;
use vidmag_core::frame::SourceInfo;
use vidmag_core::pipeline::{ParameterStore, SpatialFilterType, TemporalFilterType};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(
    params: &ParameterStore,
    info: &SourceInfo,
    input: &str,
    output: Option<&Path>,
    frames: usize,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Video Magnification"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(19)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(input));
    if let Some(output) = output {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.path.apply_to(output.display())
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(format!(
            "{frames} at {} fps, {}x{}",
            info.fps, info.width, info.height
        ))
    );
    println!();

    println!("  {}", s.header.apply_to("Spatial"));
    if params.spatial_filter == SpatialFilterType::None {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Filter"),
            s.disabled.apply_to("none (pass-through)")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Filter"),
            s.method.apply_to(params.spatial_filter)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Layers"),
            s.value.apply_to(params.n_layers)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Lambda c"),
            s.value.apply_to(params.lambda_c)
        );
    }
    if params.roi.is_empty() {
        println!("    {:<12}{}", s.label.apply_to("ROI"), s.value.apply_to("whole frame"));
    } else {
        println!("    {:<12}{}", s.label.apply_to("ROI"), s.value.apply_to(params.roi));
    }
    println!();

    println!("  {}", s.header.apply_to("Temporal"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Filter"),
        s.method.apply_to(params.temporal_filter)
    );
    match params.temporal_filter {
        TemporalFilterType::Ideal => println!(
            "    {:<12}{}",
            s.label.apply_to("Band"),
            s.value
                .apply_to(format!("{:.2} - {:.2} Hz", params.min_freq, params.max_freq))
        ),
        TemporalFilterType::Iir => println!(
            "    {:<12}{}",
            s.label.apply_to("Cutoffs"),
            s.value.apply_to(format!(
                "{:.3} / {:.3}",
                params.effective_cutoff_lo(),
                params.cutoff_hi
            ))
        ),
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Alpha"),
        s.value.apply_to(params.alpha)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(format!(
            "{} frames ({} s)",
            params.n_buffered_frames,
            params.buffer_seconds()
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Color"),
        s.method.apply_to(params.color_space)
    );
    let skipped: Vec<String> = (0..params.n_channels)
        .filter(|&c| !params.channel_active(c))
        .map(|c| c.to_string())
        .collect();
    if !skipped.is_empty() {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Skipped"),
            s.disabled.apply_to(skipped.join(", "))
        );
    }
    println!();
}

pub fn print_analysis(result: &AnalysisResult) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Heartbeat"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Rate"),
        s.value.apply_to(format!("{:.1} bpm", result.heartbeat_rate))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Channel"),
        s.value.apply_to(result.best_channel)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Samples"),
        s.value.apply_to(result.timedomain_values.len())
    );
    println!();
}
