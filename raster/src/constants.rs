use crate::C;

/// Mean earth radius in meters.
pub const MEAN_EARTH_RADIUS: C = 6_371_008.8;

/// Meters per degree of latitude on a sphere of [MEAN_EARTH_RADIUS].
pub const M_PER_DEG: C = MEAN_EARTH_RADIUS * std::f64::consts::PI / 180.0;
