//! Single band, geo-referenced rasters.
//!
//! A [Grid] stores one `f64` per cell, north row first, with `NaN`
//! marking cells that have no data. Anything that can answer "what is
//! the value of cell (col, row)" for a [GridSpec] implements [Raster],
//! which is where point sampling lives.

pub mod ascii;
mod constants;
mod error;
mod grid;
mod raster;
pub mod reduce;
mod region;
mod rewrite;

pub use crate::{
    constants::{MEAN_EARTH_RADIUS, M_PER_DEG},
    error::RasterError,
    grid::{Grid, GridSpec, Window},
    raster::Raster,
    region::Region,
    rewrite::ZeroRewrite,
};
pub use geo;

/// Base floating point type used for all coordinates and samples.
pub type C = f64;
