//! ESRI ASCII grid (`.asc`) files.
//!
//! ```text
//! ncols         4
//! nrows         2
//! xllcorner     33.0
//! yllcorner     -3.0
//! cellsize      0.05
//! NODATA_value  -9999
//! 1 2 3 4
//! 5 6 7 -9999
//! ```
//!
//! `xllcenter`/`yllcenter` are accepted in place of the corner keys.
//! Rows are listed north to south.

use crate::{Grid, GridSpec, Raster, RasterError, C};
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

/// No-data marker used when writing.
pub const NODATA: C = -9999.0;

/// Reads the grid at `path`.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Grid, RasterError> {
    let file = BufReader::new(File::open(path)?);
    read_from(file)
}

pub fn read_from<R: BufRead>(rdr: R) -> Result<Grid, RasterError> {
    let mut header = Header::default();
    let mut values = Vec::new();
    for line in rdr.lines() {
        let line = line?;
        let mut tokens = line.split_whitespace().peekable();
        let is_header = values.is_empty() && tokens.peek().map_or(false, |t| Header::is_key(t));
        if is_header {
            let (key, value) = match (tokens.next(), tokens.next()) {
                (Some(key), Some(value)) => (key, value),
                _ => return Err(RasterError::AsciiHeader(line.clone())),
            };
            header.set(key, value)?;
        } else {
            for token in tokens {
                let value = token
                    .parse::<C>()
                    .map_err(|_| RasterError::AsciiValue(token.to_owned()))?;
                values.push(value);
            }
        }
    }
    let (spec, nodata) = header.finish()?;
    let values = values
        .into_iter()
        .map(|v| if Some(v) == nodata { C::NAN } else { v })
        .collect();
    Grid::new(spec, values)
}

/// Writes `grid` to `wtr`, cells without data as [NODATA].
pub fn write<W: Write>(grid: &Grid, mut wtr: W) -> Result<(), RasterError> {
    let spec = grid.spec();
    writeln!(wtr, "ncols {}", spec.cols())?;
    writeln!(wtr, "nrows {}", spec.rows())?;
    writeln!(wtr, "xllcorner {}", spec.west())?;
    writeln!(wtr, "yllcorner {}", spec.south())?;
    writeln!(wtr, "cellsize {}", spec.cell_size())?;
    writeln!(wtr, "NODATA_value {NODATA}")?;
    for row in 0..spec.rows() {
        let line = (0..spec.cols())
            .map(|col| grid.get(col, row).unwrap_or(NODATA).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(wtr, "{line}")?;
    }
    Ok(())
}

#[derive(Default)]
struct Header {
    cols: Option<usize>,
    rows: Option<usize>,
    x: Option<(C, bool)>,
    y: Option<(C, bool)>,
    cell_size: Option<C>,
    nodata: Option<C>,
}

impl Header {
    const KEYS: [&'static str; 8] = [
        "ncols",
        "nrows",
        "xllcorner",
        "xllcenter",
        "yllcorner",
        "yllcenter",
        "cellsize",
        "nodata_value",
    ];

    fn is_key(token: &str) -> bool {
        Self::KEYS.iter().any(|key| key.eq_ignore_ascii_case(token))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RasterError> {
        let err = || RasterError::AsciiHeader(format!("{key} {value}"));
        let float = || value.parse::<C>().map_err(|_| err());
        let int = || value.parse::<usize>().map_err(|_| err());
        match key.to_ascii_lowercase().as_str() {
            "ncols" => self.cols = Some(int()?),
            "nrows" => self.rows = Some(int()?),
            "xllcorner" => self.x = Some((float()?, false)),
            "xllcenter" => self.x = Some((float()?, true)),
            "yllcorner" => self.y = Some((float()?, false)),
            "yllcenter" => self.y = Some((float()?, true)),
            "cellsize" => self.cell_size = Some(float()?),
            "nodata_value" => self.nodata = Some(float()?),
            _ => return Err(err()),
        }
        Ok(())
    }

    fn finish(self) -> Result<(GridSpec, Option<C>), RasterError> {
        let missing = |key: &str| RasterError::AsciiHeader(format!("missing {key}"));
        let cols = self.cols.ok_or_else(|| missing("ncols"))?;
        let rows = self.rows.ok_or_else(|| missing("nrows"))?;
        let cell_size = self.cell_size.ok_or_else(|| missing("cellsize"))?;
        let (x, x_center) = self.x.ok_or_else(|| missing("xllcorner"))?;
        let (y, y_center) = self.y.ok_or_else(|| missing("yllcorner"))?;
        let half = cell_size / 2.0;
        let west = if x_center { x - half } else { x };
        let south = if y_center { y - half } else { y };
        #[allow(clippy::cast_precision_loss)]
        let north = south + rows as C * cell_size;
        let spec = GridSpec::new(west, north, cell_size, cols, rows)?;
        Ok((spec, self.nodata))
    }
}
