//! Compose remote-sensing layers over the region around a set of
//! sites, and sample every layer at every site.
//!
//! ```text
//! sites ─► Region ─► compose ─► Layers ─► extract ─► Records ─► export
//!                       │
//!                       └─► TimeSeries, Histogram
//! ```

mod compose;
mod config;
mod error;
pub mod export;
mod extract;
mod layer;
mod pipeline;
pub mod report;
pub mod site;
pub mod source;

pub use crate::{
    compose::{compose, Composition, Sources},
    config::{Config, ConfigBuilder},
    error::SamplerError,
    extract::{extract, Record, Sample},
    layer::{Layer, LayerLabel, Layers},
    pipeline::{run, Output},
    site::Site,
};
pub use {raster, terrain};
