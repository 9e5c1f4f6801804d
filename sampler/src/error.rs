use raster::RasterError;
use std::path::PathBuf;
use terrain::TerrainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no sites to sample")]
    NoSites,

    #[error("invalid site {0:?}")]
    Site(String),

    #[error("no {source_name} scenes between {start} and {end}")]
    NoScenes {
        source_name: &'static str,
        start: i32,
        end: i32,
    },

    #[error("no such directory {0:?}")]
    Dir(PathBuf),

    #[error("scene file name must start with a year: {0}")]
    SceneName(PathBuf),

    #[error("{path}: {source}")]
    Scene {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Raster(#[from] RasterError),

    #[error("{0}")]
    Terrain(#[from] TerrainError),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    GeoJson(#[from] geojson::Error),
}
