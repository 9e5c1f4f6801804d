//! Summaries drawn from built layers.

use raster::{Grid, C};

/// Least squares line through a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    /// Change per year.
    pub slope: C,
    pub intercept: C,
}

impl Trend {
    /// Fits a line through `points`.
    ///
    /// Returns `None` for fewer than two points or when every point
    /// shares one x.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(points: &[(C, C)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as C;
        let mean_x = points.iter().map(|(x, _)| x).sum::<C>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<C>() / n;
        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn at(&self, x: C) -> C {
        self.slope * x + self.intercept
    }
}

/// Mean annual precipitation over the region, one point per year.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub points: Vec<(i32, C)>,
    pub trend: Option<Trend>,
}

impl TimeSeries {
    /// Averages each annual grid over every cell with data. Years
    /// whose grid has no data at all are left out.
    pub fn new<'a, I>(annual: I) -> Self
    where
        I: IntoIterator<Item = (i32, &'a Grid)>,
    {
        let points: Vec<(i32, C)> = annual
            .into_iter()
            .filter_map(|(year, grid)| grid.mean().map(|mean| (year, mean)))
            .collect();
        let xy: Vec<(C, C)> = points.iter().map(|&(y, v)| (C::from(y), v)).collect();
        Self {
            trend: Trend::fit(&xy),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Equal width buckets of the values of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: C,
    max: C,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bins every cell of `grid` that has data into `bins` buckets
    /// spanning its min to max. The max lands in the last bucket.
    ///
    /// Returns `None` if no cell has data.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(grid: &Grid, bins: usize) -> Option<Self> {
        let (min, max) = grid.min_max()?;
        let bins = bins.max(1);
        let mut counts = vec![0; bins];
        let width = (max - min) / bins as C;
        for v in grid.valid() {
            let idx = if width > 0.0 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let idx = ((v - min) / width).floor() as usize;
                idx.min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }
        Some(Self { min, max, counts })
    }

    pub fn min(&self) -> C {
        self.min
    }

    pub fn max(&self) -> C {
        self.max
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width(&self) -> C {
        (self.max - self.min) / self.counts.len() as C
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns (lower edge, upper edge, count) of each bucket.
    #[allow(clippy::cast_precision_loss)]
    pub fn bins(&self) -> impl Iterator<Item = (C, C, usize)> + '_ {
        let width = self.bin_width();
        self.counts.iter().enumerate().map(move |(i, &count)| {
            let lo = self.min + i as C * width;
            (lo, lo + width, count)
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
