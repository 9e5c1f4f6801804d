//! Cellwise reductions over stacks of grids sharing one geometry.
//!
//! Cells without data are skipped; a cell with no data in every grid
//! has no data in the result.

use crate::{Grid, Raster, RasterError, C};

/// Returns the cellwise mean of `grids`.
pub fn mean<'a, I>(grids: I) -> Result<Grid, RasterError>
where
    I: IntoIterator<Item = &'a Grid>,
{
    #[allow(clippy::cast_precision_loss)]
    let mean = |sum: C, n: usize| sum / n as C;
    reduce(grids, mean)
}

/// Returns the cellwise sum of `grids`.
pub fn sum<'a, I>(grids: I) -> Result<Grid, RasterError>
where
    I: IntoIterator<Item = &'a Grid>,
{
    reduce(grids, |sum, _n| sum)
}

fn reduce<'a, I, F>(grids: I, finish: F) -> Result<Grid, RasterError>
where
    I: IntoIterator<Item = &'a Grid>,
    F: Fn(C, usize) -> C,
{
    let mut grids = grids.into_iter();
    let first = grids.next().ok_or(RasterError::NoGrids)?;
    let spec = *first.spec();
    let mut acc: Vec<(C, usize)> = first
        .raw()
        .iter()
        .map(|&v| if v.is_nan() { (0.0, 0) } else { (v, 1) })
        .collect();
    for grid in grids {
        if *grid.spec() != spec {
            return Err(RasterError::GridMismatch);
        }
        for ((sum, n), &v) in acc.iter_mut().zip(grid.raw()) {
            if !v.is_nan() {
                *sum += v;
                *n += 1;
            }
        }
    }
    let values = acc
        .into_iter()
        .map(|(sum, n)| if n == 0 { C::NAN } else { finish(sum, n) })
        .collect();
    Grid::new(spec, values)
}

#[cfg(test)]
mod tests {
    use super::{mean, sum};
    use crate::{Grid, GridSpec, Raster, RasterError};

    fn spec() -> GridSpec {
        GridSpec::new(0.0, 1.0, 1.0, 3, 1).unwrap()
    }

    fn grids() -> [Grid; 2] {
        [
            Grid::new(spec(), vec![1.0, f64::NAN, f64::NAN]).unwrap(),
            Grid::new(spec(), vec![3.0, 4.0, f64::NAN]).unwrap(),
        ]
    }

    #[test]
    fn test_mean_skips_nodata() {
        let m = mean(&grids()).unwrap();
        assert_eq!(m.get(0, 0), Some(2.0));
        assert_eq!(m.get(1, 0), Some(4.0));
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn test_sum_skips_nodata() {
        let s = sum(&grids()).unwrap();
        assert_eq!(s.get(0, 0), Some(4.0));
        assert_eq!(s.get(1, 0), Some(4.0));
        assert_eq!(s.get(2, 0), None);
    }

    #[test]
    fn test_empty_and_mismatch() {
        assert!(matches!(mean(std::iter::empty::<&Grid>()), Err(RasterError::NoGrids)));
        let other = GridSpec::new(0.5, 1.0, 1.0, 3, 1).unwrap();
        let stack = [
            Grid::new(spec(), vec![0.0; 3]).unwrap(),
            Grid::new(other, vec![0.0; 3]).unwrap(),
        ];
        assert!(matches!(sum(&stack), Err(RasterError::GridMismatch)));
    }
}
