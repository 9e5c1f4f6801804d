use raster::{Raster, ZeroRewrite, C};
use std::{fmt, sync::Arc};

/// Names of the layers a site is sampled from, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerLabel {
    Elevation,
    Slope,
    NdviMean,
    PrecipMean,
}

impl LayerLabel {
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Elevation,
        Self::Slope,
        Self::NdviMean,
        Self::PrecipMean,
    ];

    /// Column name this layer is exported under.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elevation => "elevation",
            Self::Slope => "slope",
            Self::NdviMean => "ndvi_mean",
            Self::PrecipMean => "precip_mean",
        }
    }

    /// Position of this label in [LayerLabel::ALL].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LayerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single band raster covering the region, with its label.
#[derive(Clone)]
pub struct Layer {
    pub label: LayerLabel,
    pub raster: Arc<dyn Raster>,
}

impl Layer {
    pub fn new<R: Raster + 'static>(label: LayerLabel, raster: R) -> Self {
        Self {
            label,
            raster: Arc::new(raster),
        }
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("label", &self.label)
            .field("spec", self.raster.spec())
            .finish()
    }
}

/// One layer per [LayerLabel], in label order.
#[derive(Debug, Clone)]
pub struct Layers([Layer; LayerLabel::COUNT]);

impl Layers {
    pub fn new(
        elevation: Arc<dyn Raster>,
        slope: Arc<dyn Raster>,
        ndvi_mean: Arc<dyn Raster>,
        precip_mean: Arc<dyn Raster>,
    ) -> Self {
        let layer = |label, raster| Layer { label, raster };
        Self([
            layer(LayerLabel::Elevation, elevation),
            layer(LayerLabel::Slope, slope),
            layer(LayerLabel::NdviMean, ndvi_mean),
            layer(LayerLabel::PrecipMean, precip_mean),
        ])
    }

    pub fn get(&self, label: LayerLabel) -> &Layer {
        &self.0[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.0.iter()
    }

    /// Makes every layer read exact zeros as `sentinel`.
    #[must_use]
    pub fn rewrite_zeros(self, sentinel: C) -> Self {
        Self(self.0.map(|Layer { label, raster }| Layer {
            label,
            raster: Arc::new(ZeroRewrite::new(raster, sentinel)),
        }))
    }
}
