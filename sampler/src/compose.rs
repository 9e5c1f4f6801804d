use crate::{
    layer::Layers,
    source::{ElevationSource, Scene, SceneSource},
    Config, SamplerError,
};
use log::{debug, info, warn};
use raster::{reduce, Grid, Raster, Region};
use rayon::prelude::*;
use std::{collections::BTreeMap, sync::Arc, time::Instant};
use terrain::Slope;

/// Inputs layers are built from.
pub struct Sources {
    pub elevation: Box<dyn ElevationSource>,
    pub ndvi: Box<dyn SceneSource>,
    pub precip: Box<dyn SceneSource>,
}

/// Every layer over a region, plus the intermediate grids reports are
/// drawn from.
pub struct Composition {
    pub region: Region,
    pub layers: Layers,
    /// Scaled vegetation index mean, before any zero rewrite.
    pub ndvi_mean: Arc<Grid>,
    /// Total precipitation of each year that had scenes, oldest first.
    pub annual_precip: Vec<(i32, Grid)>,
}

/// Builds the elevation, slope, `ndvi_mean` and `precip_mean` layers
/// over `region` for the years in `config`.
pub fn compose(
    region: Region,
    sources: &Sources,
    config: &Config,
) -> Result<Composition, SamplerError> {
    let now = Instant::now();
    let elevation = sources.elevation.elevation(&region)?;
    let slope: Arc<dyn Raster> = Arc::new(Slope::new(Arc::clone(&elevation)));
    debug!("elevation grid {:?} in {:?}", elevation.spec(), now.elapsed());

    let now = Instant::now();
    let ndvi_mean = Arc::new(ndvi_mean(&region, sources.ndvi.as_ref(), config)?);
    debug!("ndvi_mean in {:?}", now.elapsed());

    let now = Instant::now();
    let annual_precip = annual_precip(&region, sources.precip.as_ref(), config)?;
    let precip_mean = reduce::mean(annual_precip.iter().map(|(_, grid)| grid))?;
    debug!("precip_mean in {:?}", now.elapsed());

    let mut layers = Layers::new(
        elevation,
        slope,
        Arc::clone(&ndvi_mean) as Arc<dyn Raster>,
        Arc::new(precip_mean),
    );
    if config.rewrite_zeros() {
        layers = layers.rewrite_zeros(config.zero_sentinel());
    }
    info!("composed layers over {region:?}");

    Ok(Composition {
        region,
        layers,
        ndvi_mean,
        annual_precip,
    })
}

/// Cellwise mean of every vegetation index scene in range, scaled.
fn ndvi_mean(
    region: &Region,
    source: &dyn SceneSource,
    config: &Config,
) -> Result<Grid, SamplerError> {
    let scenes = clipped(region, source, config, "ndvi")?;
    info!("averaging {} ndvi scenes", scenes.len());
    let mean = reduce::mean(scenes.iter().map(|scene| &scene.grid))?;
    Ok(mean.scale(config.ndvi_scale()))
}

/// Per year cellwise sums of the precipitation scenes in range.
fn annual_precip(
    region: &Region,
    source: &dyn SceneSource,
    config: &Config,
) -> Result<Vec<(i32, Grid)>, SamplerError> {
    let scenes = clipped(region, source, config, "precip")?;
    let mut by_year: BTreeMap<i32, Vec<&Grid>> = BTreeMap::new();
    for scene in &scenes {
        by_year.entry(scene.year).or_default().push(&scene.grid);
    }
    let mut annual = Vec::with_capacity(by_year.len());
    for year in config.years() {
        match by_year.get(&year) {
            Some(grids) => {
                debug!("summing {} precip scenes for {year}", grids.len());
                annual.push((year, reduce::sum(grids.iter().copied())?));
            }
            None => warn!("no precip scenes for {year}"),
        }
    }
    Ok(annual)
}

/// Loads the scenes of `source` in range and crops them to `region`.
fn clipped(
    region: &Region,
    source: &dyn SceneSource,
    config: &Config,
    source_name: &'static str,
) -> Result<Vec<Scene>, SamplerError> {
    let scenes = source.scenes(config.years())?;
    if scenes.is_empty() {
        return Err(SamplerError::NoScenes {
            source_name,
            start: config.start_year(),
            end: config.end_year(),
        });
    }
    let scenes: Vec<Scene> = scenes
        .into_par_iter()
        .map(|Scene { year, name, grid }| Scene {
            year,
            name,
            grid: grid.clip(region),
        })
        .collect();
    if scenes.iter().all(|scene| scene.grid.valid_count() == 0) {
        warn!("no {source_name} data over {region:?}");
    }
    Ok(scenes)
}

#[cfg(test)]
mod tests {
    use super::{compose, Sources};
    use crate::{
        layer::LayerLabel,
        source::{tests::constant, Scene},
        Config, SamplerError,
    };
    use approx::assert_relative_eq;
    use geo::geometry::Coord;
    use raster::{Grid, GridSpec, Raster, Region};

    fn scene(year: i32, name: &str, grid: Grid) -> Scene {
        Scene {
            year,
            name: name.into(),
            grid,
        }
    }

    /// Fine enough for slope to have interior cells.
    fn flat(v: f64) -> Grid {
        let spec = GridSpec::new(33.0, -1.0, 0.01, 300, 200).unwrap();
        Grid::from_fn(spec, |_, _| Some(v))
    }

    fn sources() -> Sources {
        Sources {
            elevation: Box::new(flat(1500.0)),
            ndvi: Box::new(vec![
                scene(2012, "a", constant(4000.0)),
                scene(2013, "b", constant(6000.0)),
                scene(2020, "c", constant(9000.0)),
            ]),
            precip: Box::new(vec![
                scene(2012, "01", constant(10.0)),
                scene(2012, "02", constant(30.0)),
                scene(2014, "01", constant(20.0)),
            ]),
        }
    }

    fn region() -> Region {
        Region::from_coords(&[Coord { x: 34.0, y: -2.0 }], 10_000.0).unwrap()
    }

    #[test]
    fn test_compose() {
        let config = Config::builder().years(2012, 2017).build().unwrap();
        let composition = compose(region(), &sources(), &config).unwrap();
        let at = |label| {
            composition
                .layers
                .get(label)
                .raster
                .value_at(Coord { x: 34.0, y: -2.0 })
        };
        assert_eq!(at(LayerLabel::Elevation), Some(1500.0));
        // Flat ground has a slope of exactly zero, rewritten.
        assert_eq!(at(LayerLabel::Slope), Some(1e-10));
        assert_relative_eq!(at(LayerLabel::NdviMean).unwrap(), 0.5);
        // 2012 sums to 40 and 2014 to 20; the other years have no
        // scenes.
        assert_relative_eq!(at(LayerLabel::PrecipMean).unwrap(), 30.0);
        let years: Vec<_> = composition.annual_precip.iter().map(|(y, _)| *y).collect();
        assert_eq!(years, [2012, 2014]);
    }

    #[test]
    fn test_layers_are_clipped() {
        let config = Config::builder().build().unwrap();
        let composition = compose(region(), &sources(), &config).unwrap();
        let spec = composition.ndvi_mean.spec();
        assert!(spec.cols() < constant(0.0).spec().cols());
        assert!(spec.west() <= composition.region.min().x);
        assert!(composition.region.max().x <= spec.east());
    }

    #[test]
    fn test_no_scenes_in_range() {
        let config = Config::builder().years(2000, 2005).build().unwrap();
        assert!(matches!(
            compose(region(), &sources(), &config),
            Err(SamplerError::NoScenes {
                source_name: "ndvi",
                start: 2000,
                end: 2005
            })
        ));
    }

    #[test]
    fn test_ndvi_outside_region() {
        let config = Config::builder().build().unwrap();
        let mut sources = sources();
        let spec = GridSpec::new(100.0, 10.0, 0.5, 4, 4).unwrap();
        sources.ndvi = Box::new(vec![scene(2012, "a", Grid::from_fn(spec, |_, _| Some(5000.0)))]);
        let composition = compose(region(), &sources, &config).unwrap();
        let ndvi = &composition.layers.get(LayerLabel::NdviMean).raster;
        assert_eq!(ndvi.sample(Coord { x: 34.0, y: -2.0 }, 5.0), None);
        assert_eq!(composition.ndvi_mean.valid_count(), 0);
        // The other layers are unaffected.
        let elevation = &composition.layers.get(LayerLabel::Elevation).raster;
        assert_eq!(elevation.value_at(Coord { x: 34.0, y: -2.0 }), Some(1500.0));
    }
}
