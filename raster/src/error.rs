use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("a region needs at least one coordinate")]
    EmptyRegion,

    #[error("invalid coordinate ({0}, {1})")]
    InvalidCoord(f64, f64),

    #[error("invalid grid geometry: {0}")]
    Geometry(String),

    #[error("expected {expected} cells, got {actual}")]
    Dimensions { expected: usize, actual: usize },

    #[error("grids do not share the same geometry")]
    GridMismatch,

    #[error("nothing to reduce")]
    NoGrids,

    #[error("ascii grid header: {0}")]
    AsciiHeader(String),

    #[error("ascii grid value {0:?}")]
    AsciiValue(String),
}
