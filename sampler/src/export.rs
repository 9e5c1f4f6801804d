//! Writing results to disk.
//!
//! Every file is written beside its destination first and renamed
//! into place once complete.

use crate::{extract::Record, layer::LayerLabel, report::TimeSeries, Config, SamplerError};
use geojson::{Feature, GeoJson, Geometry, JsonObject, JsonValue, Value};
use log::info;
use raster::Region;
use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Columns preceding the layer columns.
pub const SITE_COLUMNS: [&str; 3] = ["id", "longitude", "latitude"];

/// Writes one row per record, `id,longitude,latitude` followed by
/// one column per layer.
pub fn write_table<W: Write>(records: &[Record], wtr: W) -> Result<(), SamplerError> {
    let mut wtr = csv::Writer::from_writer(wtr);
    wtr.write_record(
        SITE_COLUMNS
            .iter()
            .copied()
            .chain(LayerLabel::ALL.iter().map(|label| label.as_str())),
    )?;
    for record in records {
        let mut row = Vec::with_capacity(SITE_COLUMNS.len() + LayerLabel::COUNT);
        row.push(record.site.id.clone().unwrap_or_default());
        row.push(record.site.lon().to_string());
        row.push(record.site.lat().to_string());
        row.extend(record.samples.iter().map(ToString::to_string));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `region` as a GeoJSON polygon feature.
pub fn write_region<W: Write>(region: &Region, mut wtr: W) -> Result<(), SamplerError> {
    let (min, max) = (region.min(), region.max());
    let mut properties = JsonObject::new();
    for (key, value) in [
        ("west", min.x),
        ("south", min.y),
        ("east", max.x),
        ("north", max.y),
    ] {
        properties.insert(key.to_owned(), JsonValue::from(value));
    }
    let feature = Feature {
        bbox: Some(vec![min.x, min.y, max.x, max.y]),
        geometry: Some(Geometry::new(Value::from(&region.polygon()))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    };
    writeln!(wtr, "{}", GeoJson::Feature(feature))?;
    Ok(())
}

/// Writes `year,mean,trend` rows, `trend` empty when the series is too
/// short to fit one.
pub fn write_time_series<W: Write>(series: &TimeSeries, wtr: W) -> Result<(), SamplerError> {
    let mut wtr = csv::Writer::from_writer(wtr);
    wtr.write_record(["year", "mean", "trend"])?;
    for &(year, mean) in &series.points {
        let trend = series
            .trend
            .map(|t| t.at(f64::from(year)).to_string())
            .unwrap_or_default();
        wtr.write_record([year.to_string(), mean.to_string(), trend])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Paths written by [export].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub table: PathBuf,
    pub region: PathBuf,
    pub time_series: PathBuf,
}

/// Writes the table, the region outline and the precipitation series
/// into the configured export folder.
pub fn export(
    records: &[Record],
    region: &Region,
    series: &TimeSeries,
    config: &Config,
) -> Result<Exported, SamplerError> {
    fs::create_dir_all(config.folder())?;
    let exported = Exported {
        table: config.table_path(),
        region: config.aux_path("region.geojson"),
        time_series: config.aux_path("annual_precip.csv"),
    };
    write_atomic(&exported.table, |wtr| write_table(records, wtr))?;
    write_atomic(&exported.region, |wtr| write_region(region, wtr))?;
    write_atomic(&exported.time_series, |wtr| {
        write_time_series(series, wtr)
    })?;
    info!("exported {} rows to {:?}", records.len(), exported.table);
    Ok(exported)
}

fn write_atomic<F>(path: &Path, f: F) -> Result<(), SamplerError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), SamplerError>,
{
    let tmp = {
        let mut name = OsString::from(".");
        name.push(path.file_name().unwrap_or_default());
        name.push(".tmp");
        path.with_file_name(name)
    };
    let result = File::create(&tmp)
        .map_err(SamplerError::from)
        .and_then(|file| {
            let mut wtr = BufWriter::new(file);
            f(&mut wtr)?;
            wtr.flush()?;
            Ok(())
        });
    match result {
        Ok(()) => Ok(fs::rename(&tmp, path)?),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}
