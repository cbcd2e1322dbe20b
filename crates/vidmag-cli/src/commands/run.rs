use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use vidmag_core::io::ImageSequenceWriter;
use vidmag_core::pipeline::ParameterHandle;

use crate::summary::{print_analysis, print_run_summary};
use crate::worker::spawn_worker;

use super::{write_report, FilterArgs, SourceArgs};

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Png,
    Tiff,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Tiff => "tiff",
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output directory for magnified frames
    #[arg(short, long, default_value = "magnified")]
    pub output: PathBuf,

    /// Output image format
    #[arg(long, value_enum, default_value = "png")]
    pub format: OutputFormat,

    /// Do not draw the ROI highlight into written frames
    #[arg(long)]
    pub no_overlay: bool,

    /// Also estimate the heart rate
    #[arg(long)]
    pub analyze: bool,

    /// Write the final heartbeat analysis to this file (TOML)
    #[arg(long, requires = "analyze")]
    pub report: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let source = args.source.open()?;
    let info = source.info();
    let mut params = args.filter.build(&info)?;
    params.analyze_heartbeat = args.analyze;
    let limit = args.source.frame_limit(&info);

    print_run_summary(
        &params,
        &info,
        &args.source.describe(),
        Some(args.output.as_path()),
        limit,
    );

    let sink = ImageSequenceWriter::create(&args.output, args.format.extension())
        .with_context(|| format!("Failed to create {}", args.output.display()))?
        .with_overlay(!args.no_overlay);

    let handle = ParameterHandle::new(params);
    let worker = spawn_worker(
        source,
        handle.clone(),
        args.filter.selection(),
        Some(Box::new(sink)),
        Some(limit),
    )?;

    let pb = ProgressBar::new(limit as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Magnifying");

    let mut last_analysis = None;
    for event in worker.events.iter() {
        pb.set_position(event.index as u64 + 1);
        if event.reallocated {
            pb.set_message(format!("ROI {}", event.roi));
        }
        if let Some(analysis) = event.analysis {
            pb.set_message(format!("{:.1} bpm", analysis.heartbeat_rate));
            last_analysis = Some(analysis);
        }
    }

    let processed = worker.join()?;
    pb.finish_with_message("Done");
    println!(
        "\n{processed} frames written to {} (final ROI {})",
        args.output.display(),
        handle.snapshot().roi
    );

    if let Some(analysis) = last_analysis {
        println!();
        print_analysis(&analysis);
        if let Some(ref path) = args.report {
            write_report(path, &analysis)?;
            println!("Report saved to {}", path.display());
        }
    }

    Ok(())
}
