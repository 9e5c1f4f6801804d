use crate::SamplerError;
use raster::C;
use std::{ops::RangeInclusive, path::PathBuf};

/// Everything a run needs besides its inputs.
///
/// Built once with [Config::builder] and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    start_year: i32,
    end_year: i32,
    buffer_m: C,
    tolerance_m: C,
    ndvi_scale: C,
    zero_sentinel: C,
    rewrite_zeros: bool,
    histogram_bins: usize,
    folder: PathBuf,
    file_name: String,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            start_year: 2012,
            end_year: 2017,
            buffer_m: 10_000.0,
            tolerance_m: 5.0,
            ndvi_scale: 0.0001,
            zero_sentinel: 1e-10,
            rewrite_zeros: true,
            histogram_bins: 20,
            folder: PathBuf::from("export"),
            file_name: String::from("rs_to_points"),
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// Every year of the analysis window, both ends included.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    /// Distance, in meters, the region extends past the outermost
    /// sites.
    pub fn buffer_m(&self) -> C {
        self.buffer_m
    }

    /// How far, in meters, sampling may look from a site.
    pub fn tolerance_m(&self) -> C {
        self.tolerance_m
    }

    /// Factor applied to raw vegetation index values.
    pub fn ndvi_scale(&self) -> C {
        self.ndvi_scale
    }

    /// Value written in place of an exact zero.
    pub fn zero_sentinel(&self) -> C {
        self.zero_sentinel
    }

    pub fn rewrite_zeros(&self) -> bool {
        self.rewrite_zeros
    }

    pub fn histogram_bins(&self) -> usize {
        self.histogram_bins
    }

    pub fn folder(&self) -> &PathBuf {
        &self.folder
    }

    /// Export description, `<file name>_<start>_<end>`.
    pub fn description(&self) -> String {
        format!("{}_{}_{}", self.file_name, self.start_year, self.end_year)
    }

    /// Path of the exported table.
    pub fn table_path(&self) -> PathBuf {
        self.folder.join(format!("{}.csv", self.description()))
    }

    /// Path of an auxiliary export named `<description>_<suffix>`.
    pub fn aux_path(&self, suffix: &str) -> PathBuf {
        self.folder.join(format!("{}_{suffix}", self.description()))
    }
}

pub struct ConfigBuilder {
    start_year: i32,
    end_year: i32,
    buffer_m: C,
    tolerance_m: C,
    ndvi_scale: C,
    zero_sentinel: C,
    rewrite_zeros: bool,
    histogram_bins: usize,
    folder: PathBuf,
    file_name: String,
}

impl ConfigBuilder {
    /// First and last year of the analysis window (defaults to
    /// 2012–2017).
    #[must_use]
    pub fn years(mut self, start: i32, end: i32) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }

    /// Region buffer in meters (defaults to 10 km).
    #[must_use]
    pub fn buffer(mut self, meters: C) -> Self {
        self.buffer_m = meters;
        self
    }

    /// Sampling tolerance in meters (defaults to 5 m).
    #[must_use]
    pub fn tolerance(mut self, meters: C) -> Self {
        self.tolerance_m = meters;
        self
    }

    /// Vegetation index scale factor (defaults to 0.0001).
    #[must_use]
    pub fn ndvi_scale(mut self, factor: C) -> Self {
        self.ndvi_scale = factor;
        self
    }

    /// Replace exact zeros with `sentinel` before sampling (defaults
    /// to on, with 1e-10).
    #[must_use]
    pub fn rewrite_zeros(mut self, enabled: bool, sentinel: C) -> Self {
        self.rewrite_zeros = enabled;
        self.zero_sentinel = sentinel;
        self
    }

    /// Histogram bucket count (defaults to 20).
    #[must_use]
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Export folder (defaults to `export`).
    #[must_use]
    pub fn folder(mut self, folder: PathBuf) -> Self {
        self.folder = folder;
        self
    }

    /// Export file name prefix (defaults to `rs_to_points`).
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn build(self) -> Result<Config, SamplerError> {
        let err = |msg: String| Err(SamplerError::Config(msg));
        if self.start_year > self.end_year {
            return err(format!(
                "start year {} is after end year {}",
                self.start_year, self.end_year
            ));
        }
        if !(self.buffer_m.is_finite() && self.buffer_m >= 0.0) {
            return err(format!("buffer {} m", self.buffer_m));
        }
        if !(self.tolerance_m.is_finite() && self.tolerance_m > 0.0) {
            return err(format!("tolerance {} m", self.tolerance_m));
        }
        if !self.ndvi_scale.is_finite() {
            return err(format!("ndvi scale {}", self.ndvi_scale));
        }
        if self.rewrite_zeros && (self.zero_sentinel == 0.0 || !self.zero_sentinel.is_finite()) {
            return err(format!("zero sentinel {}", self.zero_sentinel));
        }
        if self.histogram_bins == 0 {
            return err(String::from("histogram needs at least one bin"));
        }
        if self.file_name.is_empty() {
            return err(String::from("empty file name"));
        }
        Ok(Config {
            start_year: self.start_year,
            end_year: self.end_year,
            buffer_m: self.buffer_m,
            tolerance_m: self.tolerance_m,
            ndvi_scale: self.ndvi_scale,
            zero_sentinel: self.zero_sentinel,
            rewrite_zeros: self.rewrite_zeros,
            histogram_bins: self.histogram_bins,
            folder: self.folder,
            file_name: self.file_name,
        })
    }
}
