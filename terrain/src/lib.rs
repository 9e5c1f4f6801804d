mod elevation;
mod error;
mod slope;
mod tiles;

pub use crate::{
    elevation::TileRaster,
    error::TerrainError,
    slope::Slope,
    tiles::{TileMode, Tiles},
};
pub use {nasadem, raster};
