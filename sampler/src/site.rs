use crate::SamplerError;
use geo::geometry::Coord;
use geojson::{feature::Id, GeoJson, JsonValue, Value};
use raster::C;
use std::{fs::File, io::Read, path::Path, str::FromStr};

/// A location to sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: Option<String>,
    pub coord: Coord<C>,
}

impl Site {
    pub fn new(id: Option<String>, lon: C, lat: C) -> Self {
        Self {
            id,
            coord: Coord { x: lon, y: lat },
        }
    }

    pub fn lon(&self) -> C {
        self.coord.x
    }

    pub fn lat(&self) -> C {
        self.coord.y
    }
}

/// Parses `"lon,lat"` or `"lon,lat,id"`.
impl FromStr for Site {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self, SamplerError> {
        let mut fields = s.splitn(3, ',').map(str::trim);
        let mut coord = || {
            fields
                .next()
                .and_then(|f| f.parse::<C>().ok())
                .ok_or_else(|| SamplerError::Site(s.to_owned()))
        };
        let lon = coord()?;
        let lat = coord()?;
        let id = fields.next().filter(|f| !f.is_empty()).map(str::to_owned);
        Ok(Self::new(id, lon, lat))
    }
}

/// Reads sites from `path`.
///
/// `.json` and `.geojson` files are read as GeoJSON, anything else
/// as CSV.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Site>, SamplerError> {
    let is_json = path
        .as_ref()
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("geojson")
        });
    let file = File::open(path)?;
    if is_json {
        read_geojson(file)
    } else {
        read_csv(file)
    }
}

/// Reads `longitude,latitude[,id]` rows.
///
/// A first row that doesn't parse as coordinates is taken to be a
/// header.
pub fn read_csv<R: Read>(rdr: R) -> Result<Vec<Site>, SamplerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let mut sites = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let line = record.iter().collect::<Vec<_>>().join(",");
        match line.parse::<Site>() {
            Ok(site) => sites.push(site),
            Err(_) if idx == 0 => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(sites)
}

/// Reads the `Point` features of a GeoJSON document.
///
/// The site id is the feature id, or else its `id` property.
pub fn read_geojson<R: Read>(mut rdr: R) -> Result<Vec<Site>, SamplerError> {
    let mut text = String::new();
    rdr.read_to_string(&mut text)?;
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => {
            return match geometry.value {
                Value::Point(pos) => Ok(vec![point(None, &pos)?]),
                other => Err(SamplerError::Site(kind(&other).to_owned())),
            }
        }
    };
    features
        .into_iter()
        .map(|feature| {
            let id = match (&feature.id, feature.property("id")) {
                (Some(Id::String(s)), _) => Some(s.clone()),
                (Some(Id::Number(n)), _) => Some(n.to_string()),
                (None, Some(JsonValue::String(s))) => Some(s.clone()),
                (None, Some(JsonValue::Null)) | (None, None) => None,
                (None, Some(other)) => Some(other.to_string()),
            };
            match feature.geometry.map(|g| g.value) {
                Some(Value::Point(pos)) => point(id, &pos),
                Some(other) => Err(SamplerError::Site(kind(&other).to_owned())),
                None => Err(SamplerError::Site(String::from("feature without geometry"))),
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn point(id: Option<String>, pos: &[f64]) -> Result<Site, SamplerError> {
    match pos {
        [lon, lat, ..] => Ok(Site::new(id, *lon, *lat)),
        _ => Err(SamplerError::Site(format!("{pos:?}"))),
    }
}
