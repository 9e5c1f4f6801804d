use crate::{
    compose::{compose, Composition, Sources},
    extract::{extract, Record},
    report::{Histogram, TimeSeries},
    site::Site,
    Config, SamplerError,
};
use log::{info, warn};
use raster::Region;
use std::time::Instant;

/// Everything a run produces.
pub struct Output {
    pub composition: Composition,
    pub records: Vec<Record>,
    pub time_series: TimeSeries,
    pub histogram: Option<Histogram>,
}

impl Output {
    pub fn region(&self) -> &Region {
        &self.composition.region
    }
}

/// Builds the region around `sites`, composes every layer over it,
/// samples each site and summarizes the result.
pub fn run(sites: &[Site], sources: &Sources, config: &Config) -> Result<Output, SamplerError> {
    if sites.is_empty() {
        return Err(SamplerError::NoSites);
    }
    let coords: Vec<_> = sites.iter().map(|site| site.coord).collect();
    let region = Region::from_coords(&coords, config.buffer_m())?;
    info!(
        "{} sites, region {:?} to {:?}",
        sites.len(),
        region.min(),
        region.max()
    );

    let composition = compose(region, sources, config)?;

    let now = Instant::now();
    let records = extract(sites, &composition.layers, config.tolerance_m());
    info!("sampled {} sites in {:?}", records.len(), now.elapsed());

    let time_series = TimeSeries::new(
        composition
            .annual_precip
            .iter()
            .map(|(year, grid)| (*year, grid)),
    );
    let histogram = Histogram::new(&composition.ndvi_mean, config.histogram_bins());
    if histogram.is_none() {
        warn!("ndvi_mean has no data over the region");
    }

    Ok(Output {
        composition,
        records,
        time_series,
        histogram,
    })
}
