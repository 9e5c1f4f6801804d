//! NASADEM file aggregator.

use crate::TerrainError;
use dashmap::DashMap;
use geo::geometry::Coord;
use log::debug;
use nasadem::{NasademError, Tile};
use raster::{Region, C};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

pub struct Tiles {
    /// Directory containing NASADEM HGT tile files.
    tile_dir: PathBuf,

    /// How to load tiles (in-memory or mapped).
    tile_mode: TileMode,

    /// Arcseconds per sample of the tiles in `tile_dir`.
    resolution: u8,

    /// Tiles which have been loaded on demand.
    tiles: DashMap<Coord<i16>, Arc<Tile>>,
}

impl Tiles {
    pub fn new(tile_dir: PathBuf, tile_mode: TileMode) -> Result<Self, TerrainError> {
        let mut resolution = None;

        // Let's try to fail early be checking that tile_dir has at
        // least one `hgt` file, and learn the resolution from it.
        for entry in std::fs::read_dir(&tile_dir)? {
            let path = entry?.path();
            if path
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .map_or(false, |ext| ext.eq_ignore_ascii_case("hgt"))
            {
                resolution = Some(Tile::memmap(&path)?.resolution());
                break;
            }
        }

        match resolution {
            Some(resolution) => Ok(Self {
                tile_dir,
                tile_mode,
                resolution,
                tiles: DashMap::new(),
            }),
            None => Err(TerrainError::Path(tile_dir)),
        }
    }

    /// Returns the resolution, in arcseconds per sample, of the tiles
    /// in this source.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Returns the distance between samples in degrees.
    pub fn cell_size(&self) -> C {
        C::from(self.resolution) / 3600.0
    }

    /// Returns the tile containing `coord`.
    ///
    /// `Tiles` will attempt to fetch the tile from disk if it doesn't
    /// already have it in memory. Tiles missing from disk are void.
    pub fn get(&self, coord: Coord<C>) -> Result<Arc<Tile>, TerrainError> {
        let sw_corner = sw_corner(coord);
        self.tiles
            .entry(sw_corner)
            .or_try_insert_with(|| match self.load_tile(sw_corner) {
                Ok(tile) => Ok(Arc::new(tile)),
                Err(TerrainError::Nasadem(NasademError::Io(e)))
                    if e.kind() == ErrorKind::NotFound =>
                {
                    Ok(Arc::new(Self::load_tombstone(sw_corner)))
                }
                Err(e) => Err(e),
            })
            .map(|r| r.clone())
    }

    /// Loads every tile overlapping `region`, returning the number of
    /// tiles that exist on disk.
    ///
    /// Surfaces unreadable tiles up front instead of on first lookup.
    pub fn preload(&self, region: &Region) -> Result<usize, TerrainError> {
        let (min, max) = (sw_corner(region.min()), sw_corner(region.max()));
        let mut found = 0;
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let tile = self.get(Coord {
                    x: C::from(x) + 0.5,
                    y: C::from(y) + 0.5,
                })?;
                if !tile.is_tombstone() {
                    found += 1;
                }
            }
        }
        debug!("preloaded {found} tiles for {region:?}");
        Ok(found)
    }
}

/// Private API.
impl Tiles {
    fn load_tile(&self, sw_corner: Coord<i16>) -> Result<Tile, TerrainError> {
        let tile_path = {
            let file_name = file_name(sw_corner);
            let mut tile_path: PathBuf = [&self.tile_dir, Path::new(&file_name)].iter().collect();
            if !tile_path.exists() {
                let file_name = file_name.to_lowercase();
                tile_path = [&self.tile_dir, Path::new(&file_name)].iter().collect();
            }
            tile_path
        };
        debug!("loading {tile_path:?}");
        match self.tile_mode {
            TileMode::InMem => Ok(Tile::load(tile_path)?),
            TileMode::MemMap => Ok(Tile::memmap(tile_path)?),
        }
    }

    fn load_tombstone(sw_corner: Coord<i16>) -> Tile {
        debug!("loading tombstone in lieu of missing tile for {sw_corner:?}");
        Tile::tombstone(sw_corner)
    }
}

/// How to handle tile.
///
/// The trade off between loading tile data into memory versus memory
/// mapping is not obvious, and you should measure both before
/// deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// Parse tile and load into memory.
    ///
    /// Note that this can consume gigabytes of RAM when loading many
    /// tiles.
    InMem,

    /// Memory map file contents.
    MemMap,
}

/// Returns the southwest corner as integers for coord.
fn sw_corner(Coord { x, y }: Coord<C>) -> Coord<i16> {
    #[allow(clippy::cast_possible_truncation)]
    Coord {
        x: (x.floor() as i16),
        y: (y.floor() as i16),
    }
}

/// Returns the expected file name for coord
fn file_name(Coord { x, y }: Coord<i16>) -> String {
    let (n_s, lat) = {
        let lat = y.abs();
        let n_s = if y.is_negative() { 'S' } else { 'N' };
        (n_s, lat)
    };
    let (e_w, lon) = {
        let lon = x.abs();
        let e_w = if x.is_negative() { 'W' } else { 'E' };
        (e_w, lon)
    };
    format!("{n_s}{lat:02}{e_w}{lon:03}.hgt")
}
