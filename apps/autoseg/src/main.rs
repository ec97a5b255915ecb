use anyhow::{bail, Result};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

mod cli;
mod config;
mod result;
mod runner;

use cli::Cli;
use config::{FileConfig, RunConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = RunConfig::resolve(cli, file)?;

    let batch = runner::run(&config)?;
    batch.analyze()?;
    if batch.failed() > 0 {
        bail!("{} of {} images failed", batch.failed(), batch.total());
    }
    Ok(())
}
