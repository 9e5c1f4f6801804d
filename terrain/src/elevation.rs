use crate::{TerrainError, Tiles};
use log::warn;
use raster::{GridSpec, Raster, Region, C};
use std::sync::Arc;

/// Elevation, in meters, read straight from SRTM tiles over a region.
///
/// Cells are the tiles' own samples, so nothing is resampled. Voids
/// and missing tiles have no data.
pub struct TileRaster {
    tiles: Arc<Tiles>,
    spec: GridSpec,
}

impl TileRaster {
    pub fn new(tiles: Arc<Tiles>, region: &Region) -> Result<Self, TerrainError> {
        tiles.preload(region)?;
        let spec = GridSpec::aligned(region, tiles.cell_size())?;
        Ok(Self { tiles, spec })
    }
}

impl Raster for TileRaster {
    fn spec(&self) -> &GridSpec {
        &self.spec
    }

    fn get(&self, col: usize, row: usize) -> Option<C> {
        if col >= self.spec.cols() || row >= self.spec.rows() {
            return None;
        }
        let center = self.spec.cell_center(col, row);
        match self.tiles.get(center) {
            Ok(tile) => tile.get(center).map(C::from),
            Err(e) => {
                warn!("elevation lookup at {center:?} failed: {e}");
                None
            }
        }
    }
}
