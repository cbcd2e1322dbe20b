use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use vidmag_core::pipeline::{ParameterHandle, SpatialFilterType};

use crate::summary::print_analysis;
use crate::worker::spawn_worker;

use super::{write_report, FilterArgs, SourceArgs};

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Write the analysis to this file (TOML)
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Feed frames until the temporal window is full, then report the dominant
/// frequency of the ROI brightness.
pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let source = args.source.open()?;
    let info = source.info();
    let mut params = args.filter.build(&info)?;
    params.spatial_filter = SpatialFilterType::None;
    params.analyze_heartbeat = true;

    let window = params.n_buffered_frames;
    let limit = args.source.frame_limit(&info);
    if limit < window {
        tracing::warn!(
            frames = limit,
            window,
            "Fewer frames than the analysis window; the estimate includes empty history"
        );
    }

    let worker = spawn_worker(
        source,
        ParameterHandle::new(params),
        args.filter.selection(),
        None,
        Some(limit),
    )?;

    let pb = ProgressBar::new(window.min(limit) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Filling window");

    let mut received = 0;
    let mut result = None;
    for event in worker.events.iter() {
        received += 1;
        pb.set_position(received as u64);
        result = event.analysis.or(result);
        if received >= window {
            worker.stop();
            break;
        }
    }

    worker.join()?;
    pb.finish_and_clear();

    let Some(result) = result else {
        bail!("No analysis produced; the window must hold at least two frames");
    };
    print_analysis(&result);
    if let Some(ref path) = args.report {
        write_report(path, &result)?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}
