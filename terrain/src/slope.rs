use raster::{GridSpec, Raster, C, M_PER_DEG};

/// Terrain slope, in degrees, derived from an elevation raster.
///
/// Uses Horn's 3x3 finite difference. Cells on the edge of the
/// elevation raster, or next to a cell without data, have no data.
pub struct Slope<R> {
    elevation: R,
}

impl<R: Raster> Slope<R> {
    pub fn new(elevation: R) -> Self {
        Self { elevation }
    }
}

impl<R: Raster> Raster for Slope<R> {
    fn spec(&self) -> &GridSpec {
        self.elevation.spec()
    }

    #[allow(clippy::many_single_char_names)]
    fn get(&self, col: usize, row: usize) -> Option<C> {
        let spec = self.elevation.spec();
        if col == 0 || row == 0 || col + 1 >= spec.cols() || row + 1 >= spec.rows() {
            return None;
        }
        let z = |dc: usize, dr: usize| self.elevation.get(col + dc - 1, row + dr - 1);
        // a b c
        // d e f
        // g h i
        let (a, b, c) = (z(0, 0)?, z(1, 0)?, z(2, 0)?);
        let (d, _e, f) = (z(0, 1)?, z(1, 1)?, z(2, 1)?);
        let (g, h, i) = (z(0, 2)?, z(1, 2)?, z(2, 2)?);

        let lat = spec.cell_center(col, row).y;
        let dy = spec.cell_size() * M_PER_DEG;
        let dx = dy * lat.to_radians().cos();

        let dz_dx = ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / (8.0 * dx);
        let dz_dy = ((a + 2.0 * b + c) - (g + 2.0 * h + i)) / (8.0 * dy);
        Some(dz_dx.hypot(dz_dy).atan().to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::{Slope, M_PER_DEG};
    use approx::assert_relative_eq;
    use raster::{Grid, GridSpec, Raster};

    const CS: f64 = 0.001;

    fn spec() -> GridSpec {
        GridSpec::new(0.0, 0.0025, CS, 5, 5).unwrap()
    }

    #[test]
    fn test_flat() {
        let slope = Slope::new(Grid::from_fn(spec(), |_, _| Some(120.0)));
        assert_eq!(slope.get(2, 2), Some(0.0));
    }

    #[test]
    fn test_north_facing_ramp() {
        // Rises 1 m for every 10 m travelled north.
        #[allow(clippy::cast_precision_loss)]
        let ramp = Grid::from_fn(spec(), |_, row| {
            Some((5 - row) as f64 * CS * M_PER_DEG * 0.1)
        });
        let slope = Slope::new(ramp);
        assert_relative_eq!(
            slope.get(2, 2).unwrap(),
            0.1_f64.atan().to_degrees(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_east_facing_ramp_accounts_for_latitude() {
        let spec = GridSpec::new(10.0, 60.0025, CS, 5, 5).unwrap();
        let lat = spec.cell_center(2, 2).y;
        let dx = CS * M_PER_DEG * lat.to_radians().cos();
        #[allow(clippy::cast_precision_loss)]
        let ramp = Grid::from_fn(spec, |col, _| Some(col as f64 * dx));
        assert_relative_eq!(
            Slope::new(ramp).get(2, 2).unwrap(),
            45.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_edges_and_gaps_have_no_data() {
        let grid = Grid::from_fn(spec(), |col, row| (col, row).ne(&(3, 3)).then_some(1.0));
        let slope = Slope::new(grid);
        assert_eq!(slope.get(0, 2), None);
        assert_eq!(slope.get(4, 2), None);
        assert_eq!(slope.get(2, 0), None);
        assert_eq!(slope.get(2, 2), None);
        assert_eq!(slope.get(1, 1), Some(0.0));
    }
}
