use crate::{RasterError, C, M_PER_DEG};
use geo::{
    geometry::{Coord, MultiPoint, Point, Polygon, Rect},
    BoundingRect,
};

/// An axis-aligned, buffered bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    min: Coord<C>,
    max: Coord<C>,
}

impl Region {
    /// Returns the bounding box of `coords` grown outward by
    /// `buffer_m` meters on every side.
    ///
    /// The longitude margin is computed at the latitude farthest from
    /// the equator, so every edge is at least `buffer_m` away from the
    /// nearest coordinate.
    pub fn from_coords(coords: &[Coord<C>], buffer_m: C) -> Result<Self, RasterError> {
        if let Some(bad) = coords.iter().find(|c| !valid_coord(c)) {
            return Err(RasterError::InvalidCoord(bad.x, bad.y));
        }
        if !(buffer_m.is_finite() && buffer_m >= 0.0) {
            return Err(RasterError::Geometry(format!("buffer {buffer_m}")));
        }
        let bounds = MultiPoint::from(coords.iter().copied().map(Point::from).collect::<Vec<_>>())
            .bounding_rect()
            .ok_or(RasterError::EmptyRegion)?;
        Ok(Self::from_rect(bounds).buffered(buffer_m))
    }

    /// Returns a region spanning `min` to `max` without any buffer.
    pub fn from_corners(min: Coord<C>, max: Coord<C>) -> Result<Self, RasterError> {
        if !(valid_coord(&min) && valid_coord(&max)) || min.x > max.x || min.y > max.y {
            return Err(RasterError::Geometry(format!("corners {min:?} {max:?}")));
        }
        Ok(Self { min, max })
    }

    /// Southwest corner.
    pub fn min(&self) -> Coord<C> {
        self.min
    }

    /// Northeast corner.
    pub fn max(&self) -> Coord<C> {
        self.max
    }

    /// Returns `true` if `coord` is inside or on the edge of this region.
    pub fn contains(&self, coord: Coord<C>) -> bool {
        self.min.x <= coord.x
            && coord.x <= self.max.x
            && self.min.y <= coord.y
            && coord.y <= self.max.y
    }

    pub fn polygon(&self) -> Polygon<C> {
        Rect::new(self.min, self.max).to_polygon()
    }
}

/// Private API.
impl Region {
    fn from_rect(rect: Rect<C>) -> Self {
        Self {
            min: rect.min(),
            max: rect.max(),
        }
    }

    fn buffered(self, buffer_m: C) -> Self {
        let d_lat = buffer_m / M_PER_DEG;
        let widest = self.min.y.abs().max(self.max.y.abs());
        // Longitude degrees shrink toward the poles; past ~89.9° any
        // margin spans the globe.
        let d_lon = (buffer_m / (M_PER_DEG * widest.to_radians().cos())).min(360.0);
        Self {
            min: Coord {
                x: self.min.x - d_lon,
                y: (self.min.y - d_lat).max(-90.0),
            },
            max: Coord {
                x: self.max.x + d_lon,
                y: (self.max.y + d_lat).min(90.0),
            },
        }
    }
}

fn valid_coord(c: &Coord<C>) -> bool {
    (-180.0..=180.0).contains(&c.x) && (-90.0..=90.0).contains(&c.y)
}
