use crate::{
    layer::{LayerLabel, Layers},
    site::Site,
};
use raster::C;
use rayon::prelude::*;
use std::fmt;

/// The value of one layer at one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(C),
    NoData,
}

impl Sample {
    pub fn value(self) -> Option<C> {
        match self {
            Self::Value(v) => Some(v),
            Self::NoData => None,
        }
    }
}

impl From<Option<C>> for Sample {
    fn from(value: Option<C>) -> Self {
        value.map_or(Self::NoData, Self::Value)
    }
}

/// Values print in full decimal notation, never in exponent form;
/// missing values print as `No data`.
impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::NoData => f.write_str("No data"),
        }
    }
}

/// A site and its sample from every layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub site: Site,
    pub samples: [Sample; LayerLabel::COUNT],
}

impl Record {
    pub fn get(&self, label: LayerLabel) -> Sample {
        self.samples[label.index()]
    }

    /// Returns (label, sample) pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerLabel, Sample)> + '_ {
        LayerLabel::ALL.into_iter().zip(self.samples.iter().copied())
    }
}

/// Samples every layer at every site.
///
/// Records come back in the same order as `sites`.
pub fn extract(sites: &[Site], layers: &Layers, tolerance_m: C) -> Vec<Record> {
    sites
        .par_iter()
        .map(|site| record(site, layers, tolerance_m))
        .collect()
}

fn record(site: &Site, layers: &Layers, tolerance_m: C) -> Record {
    let samples = layers
        .iter()
        .fold([Sample::NoData; LayerLabel::COUNT], |mut samples, layer| {
            samples[layer.label.index()] = layer.raster.sample(site.coord, tolerance_m).into();
            samples
        });
    Record {
        site: site.clone(),
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::{extract, Sample};
    use crate::{
        layer::{LayerLabel, Layers},
        site::Site,
    };
    use geo::geometry::Coord;
    use raster::{Grid, GridSpec, Raster, Region};
    use std::sync::Arc;

    /// Covers the region around both sites with 0.01° cells.
    fn layer<F>(f: F) -> Arc<dyn Raster>
    where
        F: FnMut(usize, usize) -> Option<f64>,
    {
        let spec = GridSpec::new(33.0, -1.0, 0.01, 300, 200).unwrap();
        Arc::new(Grid::from_fn(spec, f))
    }

    fn sites() -> Vec<Site> {
        vec![
            Site::new(Some("1".into()), 33.10, -2.73),
            Site::new(Some("2".into()), 35.10, -1.73),
        ]
    }

    #[allow(clippy::cast_precision_loss)]
    fn layers() -> Layers {
        Layers::new(
            layer(|col, _| Some(1000.0 + col as f64)),
            layer(|_, _| Some(0.0)),
            // No vegetation data east of 34°.
            layer(|col, _| (col < 100).then_some(0.4)),
            layer(|_, _| Some(612.5)),
        )
        .rewrite_zeros(1e-10)
    }

    #[test]
    fn test_one_record_per_site_in_order() {
        let records = extract(&sites(), &layers(), 5.0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].site.id.as_deref(), Some("1"));
        assert_eq!(records[1].site.id.as_deref(), Some("2"));
        for record in &records {
            let labels: Vec<_> = record.iter().map(|(label, _)| label).collect();
            assert_eq!(labels, LayerLabel::ALL);
        }
    }

    #[test]
    fn test_samples() {
        let records = extract(&sites(), &layers(), 5.0);
        let first = &records[0];
        assert_eq!(first.get(LayerLabel::Elevation), Sample::Value(1010.0));
        assert_eq!(first.get(LayerLabel::NdviMean), Sample::Value(0.4));
        assert_eq!(first.get(LayerLabel::PrecipMean), Sample::Value(612.5));
        assert_eq!(records[1].get(LayerLabel::NdviMean), Sample::NoData);
    }

    #[test]
    fn test_zero_is_not_missing() {
        let records = extract(&sites(), &layers(), 5.0);
        let slope = records[0].get(LayerLabel::Slope);
        assert_eq!(slope, Sample::Value(1e-10));
        assert_eq!(slope.to_string(), "0.0000000001");
    }

    #[test]
    fn test_display() {
        assert_eq!(Sample::NoData.to_string(), "No data");
        assert_eq!(Sample::Value(1234.5).to_string(), "1234.5");
        assert_eq!(Sample::from(None), Sample::NoData);
        let text = Sample::Value(0.123_456).to_string();
        assert_eq!(text.parse::<f64>().unwrap(), 0.123_456);
    }

    #[test]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn test_site_on_region_edge() {
        let sites = sites();
        let coords: Vec<_> = sites.iter().map(|s| s.coord).collect();
        let region = Region::from_coords(&coords, 10_000.0).unwrap();
        let spec = GridSpec::new(
            region.min().x,
            region.max().y,
            0.01,
            ((region.max().x - region.min().x) / 0.01).ceil() as usize,
            ((region.max().y - region.min().y) / 0.01).ceil() as usize,
        )
        .unwrap();
        let grid: Arc<dyn Raster> = Arc::new(Grid::from_fn(spec, |_, _| Some(7.0)));
        assert!(region.contains(Coord { x: region.min().x, y: region.max().y }));
        let layers = Layers::new(grid.clone(), grid.clone(), grid.clone(), grid);
        let corner = Site::new(None, region.min().x, region.max().y);
        let records = extract(&[corner], &layers, 5.0);
        assert!(records[0].iter().all(|(_, s)| s == Sample::Value(7.0)));
    }

    #[test]
    fn test_deterministic() {
        let many: Vec<Site> = (0..500)
            .map(|i| Site::new(Some(i.to_string()), 33.0 + f64::from(i) * 0.005, -2.0))
            .collect();
        let layers = layers();
        let first = extract(&many, &layers, 5.0);
        let second = extract(&many, &layers, 5.0);
        assert_eq!(first, second);
        let ids: Vec<_> = first.iter().map(|r| r.site.id.clone().unwrap()).collect();
        let expected: Vec<_> = (0..500).map(|i: i32| i.to_string()).collect();
        assert_eq!(ids, expected);
    }
}
