use anyhow::{bail, Error as AnyError};
use clap::{Parser, Subcommand};
use sampler::{site, Config, Site};
use std::path::PathBuf;

/// Sample elevation, slope, vegetation and precipitation layers at
/// points.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Site "lon,lat[,id]". May be repeated.
    #[arg(long = "site")]
    pub sites: Vec<Site>,

    /// CSV (`longitude,latitude[,id]`) or GeoJSON file of sites.
    #[arg(long = "sites")]
    pub sites_file: Option<PathBuf>,

    /// First year of the analysis window.
    #[arg(long, default_value_t = 2012)]
    pub start_year: i32,

    /// Last year of the analysis window.
    #[arg(long, default_value_t = 2017)]
    pub end_year: i32,

    /// Directory containing SRTM hgt tiles.
    #[arg(short, long, required_unless_present = "elevation")]
    pub srtm_dir: Option<PathBuf>,

    /// Memory map SRTM tiles instead of loading them.
    #[arg(long, default_value_t = false)]
    pub memmap: bool,

    /// Single ESRI ASCII elevation grid, instead of SRTM tiles.
    #[arg(short, long, conflicts_with = "srtm_dir")]
    pub elevation: Option<PathBuf>,

    /// Directory of dated vegetation index scenes (`.asc`).
    #[arg(short, long)]
    pub ndvi_dir: PathBuf,

    /// Directory of dated precipitation scenes (`.asc`).
    #[arg(short, long)]
    pub precip_dir: PathBuf,

    /// Distance, in meters, the region extends past the outermost
    /// sites.
    #[arg(short, long, default_value_t = 10_000.0)]
    pub buffer: f64,

    /// How far, in meters, sampling may look from a site.
    #[arg(short, long, default_value_t = 5.0)]
    pub tolerance: f64,

    /// Keep exact zeros instead of writing them as 1e-10.
    #[arg(long, default_value_t = false)]
    pub keep_zeros: bool,

    /// Number of vegetation histogram buckets.
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Export folder.
    #[arg(short, long, default_value = "export")]
    pub folder: PathBuf,

    /// Export file name prefix.
    #[arg(long, default_value = "rs_to_points")]
    pub file_name: String,

    /// Also render SVG charts into this directory.
    #[arg(short, long)]
    pub charts: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

impl Cli {
    pub fn config(&self) -> Result<Config, AnyError> {
        let config = Config::builder()
            .years(self.start_year, self.end_year)
            .buffer(self.buffer)
            .tolerance(self.tolerance)
            .rewrite_zeros(!self.keep_zeros, 1e-10)
            .histogram_bins(self.bins)
            .folder(self.folder.clone())
            .file_name(self.file_name.clone())
            .build()?;
        Ok(config)
    }

    /// Sites given with `--site`, followed by those in `--sites`.
    pub fn sites(&self) -> Result<Vec<Site>, AnyError> {
        let mut sites = self.sites.clone();
        if let Some(path) = &self.sites_file {
            sites.extend(site::load(path)?);
        }
        if sites.is_empty() {
            bail!("no sites, use --site or --sites");
        }
        Ok(sites)
    }
}

#[derive(Debug, Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Write the table, region and precipitation series to the export
    /// folder (default).
    Export,

    /// Print the table to stdout.
    Csv,

    /// Print sampled values to stdout as JSON.
    Json,

    /// Plot reports to terminal.
    Plot,
}
