mod json;
mod options;
mod plot;
mod progress;

use anyhow::{bail, Error as AnyError};
use clap::Parser;
use indicatif::MultiProgress;
use log::info;
use options::{Cli, Command as CliCmd};
use sampler::{
    export,
    raster::ascii,
    source::{ElevationSource, SceneDir},
    terrain::{TileMode, Tiles},
    Config, Output, Sources,
};
use std::sync::Arc;

fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();
    env_logger::init();

    let config = cli.config()?;
    let sites = cli.sites()?;
    let bars = MultiProgress::new();
    let sources = sources(&cli, &bars)?;

    let output = sampler::run(&sites, &sources, &config)?;

    match cli.cmd.unwrap_or(CliCmd::Export) {
        CliCmd::Export => export_all(&output, &config)?,
        CliCmd::Csv => export::write_table(&output.records, std::io::stdout().lock())?,
        CliCmd::Json => json::print_json(&output.records)?,
        CliCmd::Plot => plot::terminal(&output),
    };

    if let Some(dir) = &cli.charts {
        for path in plot::svg(&output, dir)? {
            info!("wrote {path:?}");
        }
    }
    Ok(())
}

fn sources(cli: &Cli, bars: &MultiProgress) -> Result<Sources, AnyError> {
    let elevation: Box<dyn ElevationSource> = match (&cli.elevation, &cli.srtm_dir) {
        (Some(path), _) => Box::new(ascii::read(path)?),
        (None, Some(dir)) => {
            let tile_mode = if cli.memmap {
                TileMode::MemMap
            } else {
                TileMode::InMem
            };
            Box::new(Arc::new(Tiles::new(dir.clone(), tile_mode)?))
        }
        (None, None) => bail!("one of --srtm-dir or --elevation is required"),
    };
    let ndvi = progress::track(SceneDir::new(cli.ndvi_dir.clone())?, "ndvi", bars);
    let precip = progress::track(SceneDir::new(cli.precip_dir.clone())?, "precip", bars);
    Ok(Sources {
        elevation,
        ndvi: Box::new(ndvi),
        precip: Box::new(precip),
    })
}

fn export_all(output: &Output, config: &Config) -> Result<(), AnyError> {
    let exported = export::export(
        &output.records,
        output.region(),
        &output.time_series,
        config,
    )?;
    println!("{}", exported.table.display());
    println!("{}", exported.region.display());
    println!("{}", exported.time_series.display());
    plot::terminal(output);
    Ok(())
}
