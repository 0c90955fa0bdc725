mod logging;

use anyhow::Context;
use clap::Parser;
use directories::BaseDirs;
use log::info;
use photo_sorter_core::{process, ExifReader, LogSink, SortOptions};

/// Takes no options: sources, destination and file sets are fixed.
#[derive(Parser)]
#[command(
    name = "photo-sorter",
    version,
    about = "Sort ~/Photos/MobileBackup and ~/Photos/PhotoLibrary into ~/Photos/YYYY/MM by capture date"
)]
struct Cli {}

fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();
    let t_total = std::time::Instant::now();

    let dirs = BaseDirs::new().context("cannot determine the home directory")?;
    let home = dirs.home_dir();
    logging::init(&home.join(logging::LOG_FILE_NAME), true)?;

    let options = SortOptions::for_home(home);
    for root in &options.source_roots {
        info!("Source: {}", root.display());
    }
    info!("Destination: {}", options.output.display());

    let result = process(&options, &ExifReader, &LogSink);

    info!(
        "Done! {} moved, {} unknown extension, {} undated, {} failed, {} directories removed ({:.2}s)",
        result.moved,
        result.skipped_unknown,
        result.skipped_undated,
        result.failed,
        result.directories_removed,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
