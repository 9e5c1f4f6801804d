//! Where layer data comes from.

use crate::SamplerError;
use log::{debug, warn};
use raster::{ascii, Grid, Raster, Region};
use rayon::prelude::*;
use std::{
    ffi::OsStr,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::Arc,
};
use terrain::{TileRaster, Tiles};

/// Provides elevation, in meters, over a region.
pub trait ElevationSource {
    fn elevation(&self, region: &Region) -> Result<Arc<dyn Raster>, SamplerError>;
}

/// SRTM tiles, read lazily as cells are sampled.
impl ElevationSource for Arc<Tiles> {
    fn elevation(&self, region: &Region) -> Result<Arc<dyn Raster>, SamplerError> {
        Ok(Arc::new(TileRaster::new(Arc::clone(self), region)?))
    }
}

/// A single elevation grid, cropped to the region.
impl ElevationSource for Grid {
    fn elevation(&self, region: &Region) -> Result<Arc<dyn Raster>, SamplerError> {
        Ok(Arc::new(self.clip(region)))
    }
}

/// One dated observation of a time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub year: i32,
    pub name: String,
    pub grid: Grid,
}

/// Provides the scenes of a time series.
pub trait SceneSource {
    /// Returns every scene dated within `years`, oldest first.
    fn scenes(&self, years: RangeInclusive<i32>) -> Result<Vec<Scene>, SamplerError>;
}

impl SceneSource for Vec<Scene> {
    fn scenes(&self, years: RangeInclusive<i32>) -> Result<Vec<Scene>, SamplerError> {
        let mut scenes: Vec<Scene> = self
            .iter()
            .filter(|scene| years.contains(&scene.year))
            .cloned()
            .collect();
        scenes.sort_by(|a, b| (a.year, &a.name).cmp(&(b.year, &b.name)));
        Ok(scenes)
    }
}

type OnLoad = dyn Fn(&Path, usize) + Send + Sync;

/// A directory of ESRI ASCII grid scenes.
///
/// Every `.asc` file is a scene, and its file name must start with
/// the four digit year it was observed in (`2014-03-01.asc`,
/// `2014_p12.asc`). Other files are ignored.
pub struct SceneDir {
    dir: PathBuf,
    on_load: Option<Arc<OnLoad>>,
}

impl SceneDir {
    pub fn new(dir: PathBuf) -> Result<Self, SamplerError> {
        if !dir.is_dir() {
            return Err(SamplerError::Dir(dir));
        }
        Ok(Self { dir, on_load: None })
    }

    /// Calls `f` with each file's path, and the number of files being
    /// loaded, after the file has been read.
    #[must_use]
    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path, usize) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(f));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the (year, path) of every scene in `years`, sorted.
    pub fn scan(&self, years: &RangeInclusive<i32>) -> Result<Vec<(i32, PathBuf)>, SamplerError> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_asc = path
                .extension()
                .and_then(OsStr::to_str)
                .map_or(false, |ext| ext.eq_ignore_ascii_case("asc"));
            if !is_asc {
                debug!("skipping {path:?}");
                continue;
            }
            let year = scene_year(&path)?;
            if years.contains(&year) {
                found.push((year, path));
            }
        }
        found.sort();
        Ok(found)
    }
}

impl SceneSource for SceneDir {
    fn scenes(&self, years: RangeInclusive<i32>) -> Result<Vec<Scene>, SamplerError> {
        let found = self.scan(&years)?;
        if found.is_empty() {
            warn!("no scenes in {:?} between {years:?}", self.dir);
        }
        let total = found.len();
        found
            .into_par_iter()
            .map(|(year, path)| -> Result<Scene, SamplerError> {
                let grid = ascii::read(&path).map_err(|source| SamplerError::Scene {
                    path: path.clone(),
                    source,
                })?;
                if let Some(f) = &self.on_load {
                    f(&path, total);
                }
                let name = path
                    .file_stem()
                    .and_then(OsStr::to_str)
                    .unwrap_or_default()
                    .to_owned();
                Ok(Scene { year, name, grid })
            })
            .collect()
    }
}

/// Parses the leading four digit year of a scene's file name.
fn scene_year(path: &Path) -> Result<i32, SamplerError> {
    path.file_stem()
        .and_then(OsStr::to_str)
        .and_then(|stem| stem.get(..4))
        .filter(|prefix| prefix.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|prefix| prefix.parse().ok())
        .ok_or_else(|| SamplerError::SceneName(path.to_owned()))
}
