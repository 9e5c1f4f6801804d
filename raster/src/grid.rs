use crate::{Raster, RasterError, Region, C};
use geo::geometry::Coord;

/// Geometry of a north-up grid of square cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Longitude of the western edge of the first column.
    west: C,

    /// Latitude of the northern edge of the first row.
    north: C,

    /// Cell width and height in degrees.
    cell_size: C,

    cols: usize,

    rows: usize,
}

/// A rectangular range of cells within a [GridSpec].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col: usize,
    pub row: usize,
    pub cols: usize,
    pub rows: usize,
}

impl GridSpec {
    pub fn new(
        west: C,
        north: C,
        cell_size: C,
        cols: usize,
        rows: usize,
    ) -> Result<Self, RasterError> {
        if !(west.is_finite() && north.is_finite()) {
            return Err(RasterError::Geometry(format!("origin ({west}, {north})")));
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(RasterError::Geometry(format!("cell size {cell_size}")));
        }
        if cols == 0 || rows == 0 {
            return Err(RasterError::Geometry(format!("{cols}x{rows} cells")));
        }
        Ok(Self {
            west,
            north,
            cell_size,
            cols,
            rows,
        })
    }

    /// Returns a grid covering `region` whose cell centers fall on
    /// integer multiples of `cell_size`, the layout SRTM tiles use.
    pub fn aligned(region: &Region, cell_size: C) -> Result<Self, RasterError> {
        let index = |deg: C| (deg / cell_size + 0.5).floor();
        let (min, max) = (region.min(), region.max());
        let (col0, col1) = (index(min.x), index(max.x));
        let (row_s, row_n) = (index(min.y), index(max.y));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (cols, rows) = ((col1 - col0) as usize + 1, (row_n - row_s) as usize + 1);
        Self::new(
            (col0 - 0.5) * cell_size,
            (row_n + 0.5) * cell_size,
            cell_size,
            cols,
            rows,
        )
    }

    pub fn west(&self) -> C {
        self.west
    }

    pub fn north(&self) -> C {
        self.north
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn east(&self) -> C {
        self.west + self.cols as C * self.cell_size
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn south(&self) -> C {
        self.north - self.rows as C * self.cell_size
    }

    pub fn cell_size(&self) -> C {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of cells.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// Returns the center of cell (`col`, `row`).
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, col: usize, row: usize) -> Coord<C> {
        Coord {
            x: self.west + (col as C + 0.5) * self.cell_size,
            y: self.north - (row as C + 0.5) * self.cell_size,
        }
    }

    /// Returns the cell containing `coord`, if any.
    ///
    /// The east and south edges belong to the last column and row so
    /// that the full extent, edges included, maps to a cell.
    pub fn cell_at(&self, coord: Coord<C>) -> Option<(usize, usize)> {
        let col = self.col_of(coord.x)?;
        let row = self.row_of(coord.y)?;
        Some((col, row))
    }

    /// Returns the cells overlapping `region`.
    ///
    /// Edges count as overlap, so a region of zero width or height
    /// still selects the cell [`GridSpec::cell_at`] would pick.
    pub fn window(&self, region: &Region) -> Option<Window> {
        self.span(region.min(), region.max())
    }

    /// Returns a grid on this grid's lattice covering `region`, which
    /// may lie partly or wholly outside this grid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cover(&self, region: &Region) -> Self {
        let cs = self.cell_size;
        let (min, max) = (region.min(), region.max());
        let col0 = ((min.x - self.west) / cs).floor();
        let col1 = ((max.x - self.west) / cs).ceil();
        let row0 = ((self.north - max.y) / cs).floor();
        let row1 = ((self.north - min.y) / cs).ceil();
        Self {
            west: self.west + col0 * cs,
            north: self.north - row0 * cs,
            cell_size: cs,
            cols: ((col1 - col0) as usize).max(1),
            rows: ((row1 - row0) as usize).max(1),
        }
    }

    /// Returns the geometry of `window` as a grid of its own.
    #[allow(clippy::cast_precision_loss)]
    pub fn crop(&self, window: &Window) -> Self {
        Self {
            west: self.west + window.col as C * self.cell_size,
            north: self.north - window.row as C * self.cell_size,
            cell_size: self.cell_size,
            cols: window.cols,
            rows: window.rows,
        }
    }

    /// Returns the (col, row) index range of cells intersecting the
    /// rectangle `min`..`max`, clamped to this grid.
    ///
    /// Corners may lie past the antimeridian or a pole.
    pub(crate) fn span(&self, min: Coord<C>, max: Coord<C>) -> Option<Window> {
        let cs = self.cell_size;
        let (col, cols) = cell_range(
            (min.x - self.west) / cs,
            (max.x - self.west) / cs,
            self.cols,
        )?;
        let (row, rows) = cell_range(
            (self.north - max.y) / cs,
            (self.north - min.y) / cs,
            self.rows,
        )?;
        Some(Window {
            col,
            row,
            cols,
            rows,
        })
    }
}

/// Private API.
impl GridSpec {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn col_of(&self, x: C) -> Option<usize> {
        let f = (x - self.west) / self.cell_size;
        if !(0.0..=self.cols as C).contains(&f) {
            return None;
        }
        Some((f.floor() as usize).min(self.cols - 1))
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn row_of(&self, y: C) -> Option<usize> {
        let f = (self.north - y) / self.cell_size;
        if !(0.0..=self.rows as C).contains(&f) {
            return None;
        }
        Some((f.floor() as usize).min(self.rows - 1))
    }
}

/// Returns (first, count) of the cells among `n` touched by the
/// fractional index range `lo..=hi`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn cell_range(lo: C, hi: C, n: usize) -> Option<(usize, usize)> {
    if !(lo <= hi && hi >= 0.0 && lo <= n as C) {
        return None;
    }
    let first = (lo.floor().max(0.0) as usize).min(n - 1);
    let end = (hi.ceil().min(n as C) as usize).max(first + 1);
    Some((first, end - first))
}

/// A single band raster held in memory.
///
/// Cells without data are stored as `NaN`.
#[derive(Debug, Clone)]
pub struct Grid {
    spec: GridSpec,
    values: Box<[C]>,
}

impl Grid {
    /// Returns a grid over `spec` with `values` laid out north row
    /// first, west column first.
    pub fn new(spec: GridSpec, values: Vec<C>) -> Result<Self, RasterError> {
        if values.len() != spec.len() {
            return Err(RasterError::Dimensions {
                expected: spec.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            spec,
            values: values.into_boxed_slice(),
        })
    }

    /// Returns a grid whose cells are `f(col, row)`.
    pub fn from_fn<F>(spec: GridSpec, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Option<C>,
    {
        let mut values = Vec::with_capacity(spec.len());
        for row in 0..spec.rows {
            for col in 0..spec.cols {
                values.push(f(col, row).unwrap_or(C::NAN));
            }
        }
        Self {
            spec,
            values: values.into_boxed_slice(),
        }
    }

    /// Copies every cell of `raster` into memory.
    pub fn from_raster<R: Raster + ?Sized>(raster: &R) -> Self {
        Self::from_fn(*raster.spec(), |col, row| raster.get(col, row))
    }

    /// Returns an iterator over every cell that has data.
    pub fn valid(&self) -> impl Iterator<Item = C> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }

    /// Returns the number of cells that have data.
    pub fn valid_count(&self) -> usize {
        self.valid().count()
    }

    /// Returns the mean of every cell that has data.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<C> {
        let (sum, n) = self
            .valid()
            .fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
        (n > 0).then(|| sum / n as C)
    }

    /// Returns (min, max) over every cell that has data.
    pub fn min_max(&self) -> Option<(C, C)> {
        self.valid().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Applies `f` to every cell that has data.
    #[must_use]
    pub fn map_valid<F: Fn(C) -> C>(&self, f: F) -> Self {
        let values = self
            .values
            .iter()
            .map(|&v| if v.is_nan() { v } else { f(v) })
            .collect();
        Self {
            spec: self.spec,
            values,
        }
    }

    /// Multiplies every cell by `factor`.
    #[must_use]
    pub fn scale(&self, factor: C) -> Self {
        self.map_valid(|v| v * factor)
    }

    /// Replaces cells exactly equal to zero with `sentinel`.
    #[must_use]
    pub fn rewrite_zeros(&self, sentinel: C) -> Self {
        self.map_valid(|v| if v == 0.0 { sentinel } else { v })
    }

    /// Crops this grid to the cells overlapping `region`.
    ///
    /// A region this grid does not reach yields a grid on the same
    /// lattice covering the region with no data in any cell.
    pub fn clip(&self, region: &Region) -> Self {
        match self.spec.window(region) {
            Some(window) => {
                let spec = self.spec.crop(&window);
                Self::from_fn(spec, |col, row| self.get(window.col + col, window.row + row))
            }
            None => Self::from_fn(self.spec.cover(region), |_, _| None),
        }
    }

    pub(crate) fn raw(&self) -> &[C] {
        &self.values
    }
}

impl PartialEq for Grid {
    /// Grids are equal when they share a geometry and agree on every
    /// cell, with no-data equal to no-data.
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

impl Raster for Grid {
    fn spec(&self) -> &GridSpec {
        &self.spec
    }

    fn get(&self, col: usize, row: usize) -> Option<C> {
        if col >= self.spec.cols || row >= self.spec.rows {
            return None;
        }
        let v = self.values[row * self.spec.cols + col];
        (!v.is_nan()).then_some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Grid, GridSpec, Raster, Region, Window};
    use crate::RasterError;
    use approx::assert_relative_eq;

    /// 4x3 grid of 1° cells, west 10, north 20.
    fn spec() -> GridSpec {
        GridSpec::new(10.0, 20.0, 1.0, 4, 3).unwrap()
    }

    #[allow(clippy::cast_precision_loss)]
    fn grid() -> Grid {
        Grid::from_fn(spec(), |col, row| {
            (col != 3 || row != 2).then_some((row * 4 + col) as f64)
        })
    }

    #[test]
    fn test_invalid_spec() {
        assert!(GridSpec::new(0.0, 0.0, 0.0, 1, 1).is_err());
        assert!(GridSpec::new(0.0, 0.0, 1.0, 0, 1).is_err());
        assert!(GridSpec::new(f64::NAN, 0.0, 1.0, 1, 1).is_err());
    }

    #[test]
    fn test_new_checks_len() {
        assert!(matches!(
            Grid::new(spec(), vec![0.0; 5]),
            Err(RasterError::Dimensions {
                expected: 12,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_cell_at() {
        let spec = spec();
        assert_eq!(spec.cell_at(Coord { x: 10.5, y: 19.5 }), Some((0, 0)));
        assert_eq!(spec.cell_at(Coord { x: 13.2, y: 17.1 }), Some((3, 2)));
        // Far edges belong to the last column/row.
        assert_eq!(spec.cell_at(Coord { x: 14.0, y: 17.0 }), Some((3, 2)));
        assert_eq!(spec.cell_at(Coord { x: 14.01, y: 18.0 }), None);
        assert_eq!(spec.cell_at(Coord { x: 11.0, y: 20.01 }), None);
    }

    #[test]
    fn test_cell_center() {
        let center = spec().cell_center(1, 2);
        assert_relative_eq!(center.x, 11.5);
        assert_relative_eq!(center.y, 17.5);
    }

    #[test]
    fn test_aligned() {
        let region =
            Region::from_corners(Coord { x: 0.01, y: -0.02 }, Coord { x: 0.05, y: 0.0 }).unwrap();
        let cs = 3.0 / 3600.0;
        let spec = GridSpec::aligned(&region, cs).unwrap();
        // Every cell center sits on a multiple of the cell size.
        let center = spec.cell_center(0, 0);
        assert_relative_eq!((center.x / cs).round() * cs, center.x, epsilon = 1e-12);
        assert_relative_eq!((center.y / cs).round() * cs, center.y, epsilon = 1e-12);
        assert!(spec.west() <= region.min().x && region.max().x <= spec.east());
        assert!(spec.south() <= region.min().y && region.max().y <= spec.north());
    }

    #[test]
    fn test_get_and_nodata() {
        let grid = grid();
        assert_eq!(grid.get(1, 1), Some(5.0));
        assert_eq!(grid.get(3, 2), None);
        assert_eq!(grid.get(4, 0), None);
        assert_eq!(grid.valid_count(), 11);
        assert_eq!(grid.min_max(), Some((0.0, 10.0)));
        assert_relative_eq!(grid.mean().unwrap(), 55.0 / 11.0);
    }

    #[test]
    fn test_clip() {
        let grid = grid();
        let region =
            Region::from_corners(Coord { x: 11.5, y: 17.5 }, Coord { x: 12.5, y: 18.5 }).unwrap();
        let window = grid.spec().window(&region).unwrap();
        assert_eq!(
            window,
            Window {
                col: 1,
                row: 1,
                cols: 2,
                rows: 2
            }
        );
        let clipped = grid.clip(&region);
        assert_eq!(clipped.spec().cols(), 2);
        assert_relative_eq!(clipped.spec().west(), 11.0);
        assert_relative_eq!(clipped.spec().north(), 19.0);
        assert_eq!(clipped.get(0, 0), Some(5.0));
        assert_eq!(clipped.get(1, 1), Some(10.0));
    }

    #[test]
    fn test_clip_outside() {
        let region =
            Region::from_corners(Coord { x: 50.2, y: 0.5 }, Coord { x: 51.5, y: 1.0 }).unwrap();
        let clipped = grid().clip(&region);
        assert_eq!(clipped.valid_count(), 0);
        // Same lattice, shifted to cover the region.
        let spec = clipped.spec();
        assert_relative_eq!(spec.west(), 50.0);
        assert_relative_eq!(spec.north(), 1.0);
        assert_eq!((spec.cols(), spec.rows()), (2, 1));
        assert_eq!(clipped.value_at(Coord { x: 51.0, y: 0.7 }), None);
    }

    #[test]
    fn test_window_of_a_point() {
        let spec = spec();
        // On the shared edge of two columns and two rows.
        let on_edge = Coord { x: 12.0, y: 19.0 };
        let region = Region::from_corners(on_edge, on_edge).unwrap();
        let (col, row) = spec.cell_at(on_edge).unwrap();
        assert_eq!(
            spec.window(&region),
            Some(Window {
                col,
                row,
                cols: 1,
                rows: 1
            })
        );
        // On the far corner of the grid.
        let corner = Coord { x: 14.0, y: 17.0 };
        let region = Region::from_corners(corner, corner).unwrap();
        assert_eq!(
            spec.window(&region),
            Some(Window {
                col: 3,
                row: 2,
                cols: 1,
                rows: 1
            })
        );
        assert_eq!(grid().clip(&region).get(0, 0), None);
    }

    #[test]
    fn test_span_past_antimeridian() {
        let spec = GridSpec::new(178.0, 1.0, 1.0, 2, 2).unwrap();
        let window = spec
            .span(Coord { x: 179.5, y: -0.5 }, Coord { x: 180.5, y: 0.5 })
            .unwrap();
        assert_eq!(
            window,
            Window {
                col: 1,
                row: 0,
                cols: 1,
                rows: 2
            }
        );
    }

    #[test]
    fn test_scale_keeps_nodata() {
        let scaled = grid().scale(0.5);
        assert_eq!(scaled.get(2, 0), Some(1.0));
        assert_eq!(scaled.get(3, 2), None);
    }

    #[test]
    fn test_rewrite_zeros() {
        let grid = grid();
        let once = grid.rewrite_zeros(1e-10);
        assert_eq!(once.get(0, 0), Some(1e-10));
        assert_eq!(once.get(1, 0), Some(1.0));
        assert_eq!(once.get(3, 2), None);
        assert_eq!(once.rewrite_zeros(1e-10), once);
    }
}
