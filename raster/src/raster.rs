use crate::{GridSpec, C, M_PER_DEG};
use geo::geometry::Coord;
use std::sync::Arc;

/// A single band raster addressed by cell.
pub trait Raster: Send + Sync {
    /// Geometry of this raster.
    fn spec(&self) -> &GridSpec;

    /// Returns the value of cell (`col`, `row`), or `None` if the cell
    /// is outside this raster or has no data.
    fn get(&self, col: usize, row: usize) -> Option<C>;

    /// Returns the value of the cell containing `coord`.
    fn value_at(&self, coord: Coord<C>) -> Option<C> {
        let (col, row) = self.spec().cell_at(coord)?;
        self.get(col, row)
    }

    /// Samples this raster at `coord`, looking up to `tolerance_m`
    /// meters away.
    ///
    /// The cell containing `coord` wins if it has data. Otherwise
    /// every cell intersecting the square of half-side `tolerance_m`
    /// centered on `coord` is visited north row first, west column
    /// first, and the first one with data is returned.
    fn sample(&self, coord: Coord<C>, tolerance_m: C) -> Option<C> {
        if let Some(value) = self.value_at(coord) {
            return Some(value);
        }
        let d_lat = tolerance_m / M_PER_DEG;
        let d_lon = tolerance_m / (M_PER_DEG * coord.y.to_radians().cos().max(f64::EPSILON));
        let window = self.spec().span(
            Coord {
                x: coord.x - d_lon,
                y: coord.y - d_lat,
            },
            Coord {
                x: coord.x + d_lon,
                y: coord.y + d_lat,
            },
        )?;
        (window.row..window.row + window.rows)
            .flat_map(|row| (window.col..window.col + window.cols).map(move |col| (col, row)))
            .find_map(|(col, row)| self.get(col, row))
    }
}

impl<R: Raster + ?Sized> Raster for Arc<R> {
    fn spec(&self) -> &GridSpec {
        (**self).spec()
    }

    fn get(&self, col: usize, row: usize) -> Option<C> {
        (**self).get(col, row)
    }
}

impl<R: Raster + ?Sized> Raster for Box<R> {
    fn spec(&self) -> &GridSpec {
        (**self).spec()
    }

    fn get(&self, col: usize, row: usize) -> Option<C> {
        (**self).get(col, row)
    }
}
