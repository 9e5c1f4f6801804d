use crate::{GridSpec, Raster, C};

/// Wraps a raster so that cells exactly equal to zero read as
/// `sentinel`.
///
/// Lets a true zero measurement survive consumers that treat a zero
/// sample as missing.
pub struct ZeroRewrite<R> {
    inner: R,
    sentinel: C,
}

impl<R: Raster> ZeroRewrite<R> {
    pub fn new(inner: R, sentinel: C) -> Self {
        Self { inner, sentinel }
    }
}

impl<R: Raster> Raster for ZeroRewrite<R> {
    fn spec(&self) -> &GridSpec {
        self.inner.spec()
    }

    fn get(&self, col: usize, row: usize) -> Option<C> {
        self.inner
            .get(col, row)
            .map(|v| if v == 0.0 { self.sentinel } else { v })
    }
}

#[cfg(test)]
mod tests {
    use super::ZeroRewrite;
    use crate::{Grid, GridSpec, Raster};

    fn grid() -> Grid {
        let spec = GridSpec::new(0.0, 2.0, 1.0, 2, 2).unwrap();
        Grid::new(spec, vec![0.0, -0.0, f64::NAN, 3.5]).unwrap()
    }

    #[test]
    fn test_zero_reads_as_sentinel() {
        let rewritten = ZeroRewrite::new(grid(), 1e-10);
        assert_eq!(rewritten.get(0, 0), Some(1e-10));
        assert_eq!(rewritten.get(1, 0), Some(1e-10));
        assert_eq!(rewritten.get(0, 1), None);
        assert_eq!(rewritten.get(1, 1), Some(3.5));
    }

    #[test]
    fn test_idempotent() {
        let once = ZeroRewrite::new(grid(), 1e-10);
        let twice = ZeroRewrite::new(ZeroRewrite::new(grid(), 1e-10), 1e-10);
        assert_eq!(Grid::from_raster(&once), Grid::from_raster(&twice));
        assert_eq!(Grid::from_raster(&once), grid().rewrite_zeros(1e-10));
    }
}
