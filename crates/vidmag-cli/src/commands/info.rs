use anyhow::Result;
use clap::Args;
use vidmag_core::pipeline::ParameterStore;

use super::SourceArgs;

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = args.source.open()?;
    let info = source.info();
    let params = ParameterStore::for_source(&info);

    println!("Source:      {}", args.source.describe());
    if info.is_live() {
        println!("Frames:      live");
    } else {
        println!("Frames:      {}", info.total_frames);
    }
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Channels:    {}", info.channels);
    println!("Frame rate:  {} fps", info.fps);
    if !info.is_live() {
        let seconds = info.total_frames as f64 / info.fps.max(1) as f64;
        println!("Duration:    {:.1} s", seconds);
    }
    println!(
        "Window:      {} frames ({} s)",
        params.n_buffered_frames,
        params.buffer_seconds()
    );

    Ok(())
}
