use crate::error::SpatialResult;
use crate::filter::{IntersectsFilter, NearFilter, WithinFilter};
use crate::geometry::{Geometry, Point};
use potash::filter::Filter;

/// Starts a spatial filter on `field_name`.
///
/// ```rust
/// use potash_spatial::{spatial_field, Geometry, Point};
///
/// # fn main() -> Result<(), potash_spatial::SpatialError> {
/// let in_area = spatial_field("location").within(Geometry::envelope(0.0, 0.0, 10.0, 10.0)?);
/// let nearby = spatial_field("location").near(Point::new(5.0, 5.0)?, 2.5)?;
/// let combined = in_area.and(nearby);
/// # Ok(())
/// # }
/// ```
pub fn spatial_field(field_name: &str) -> SpatialFluentFilter {
    SpatialFluentFilter {
        field_name: field_name.to_string(),
    }
}

pub struct SpatialFluentFilter {
    field_name: String,
}

impl SpatialFluentFilter {
    pub fn intersects(self, geometry: Geometry) -> Filter {
        Filter::new(IntersectsFilter::new(self.field_name, geometry))
    }

    pub fn within(self, geometry: Geometry) -> Filter {
        Filter::new(WithinFilter::new(self.field_name, geometry))
    }

    /// # Errors
    /// `InvalidDistance` when `distance` is negative or not finite.
    pub fn near(self, center: Point, distance: f64) -> SpatialResult<Filter> {
        Ok(Filter::new(NearFilter::new(self.field_name, center, distance)?))
    }

    pub fn intersects_envelope(self, x1: f64, y1: f64, x2: f64, y2: f64) -> SpatialResult<Filter> {
        Ok(self.intersects(Geometry::envelope(x1, y1, x2, y2)?))
    }

    pub fn within_envelope(self, x1: f64, y1: f64, x2: f64, y2: f64) -> SpatialResult<Filter> {
        Ok(self.within(Geometry::envelope(x1, y1, x2, y2)?))
    }
}
