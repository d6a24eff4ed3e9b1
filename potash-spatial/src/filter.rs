//! Spatial filters.
//!
//! A spatial filter is answered in two phases when the field carries a
//! spatial index: the R-tree yields the documents whose bounding box can
//! match, and the filter is then applied to each candidate's stored
//! geometry. Without an index the second phase runs over every document.

use crate::bounding_box::BoundingBox;
use crate::error::{SpatialError, SpatialResult};
use crate::geometry::{Geometry, Point};
use potash::collection::Document;
use potash::errors::PotashResult;
use potash::filter::{Filter, FilterContext, FilterProvider};
use std::any::Any;
use std::fmt::{self, Display};

/// How candidate boxes are selected from the R-tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BoxQuery {
    /// Boxes sharing any point with the search box.
    Intersecting,
    /// Boxes lying entirely inside the search box.
    Contained,
}

pub(crate) trait SpatialFilterOps {
    fn field(&self) -> &str;

    fn search_box(&self) -> BoundingBox;

    fn box_query(&self) -> BoxQuery;

    /// The precise test against a stored geometry.
    fn matches_geometry(&self, stored: &Geometry) -> bool;
}

fn apply_spatial(ops: &dyn SpatialFilterOps, document: &Document, context: &FilterContext) -> bool {
    let value = context.resolve(document, ops.field());
    match Geometry::from_value(&value) {
        Ok(stored) => ops.matches_geometry(&stored),
        Err(_) => false,
    }
}

/// Matches documents whose geometry shares at least one point with the
/// search geometry.
#[derive(Clone, Debug)]
pub struct IntersectsFilter {
    field: String,
    geometry: Geometry,
}

impl IntersectsFilter {
    pub fn new(field: impl Into<String>, geometry: Geometry) -> Self {
        IntersectsFilter {
            field: field.into(),
            geometry,
        }
    }
}

impl SpatialFilterOps for IntersectsFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn search_box(&self) -> BoundingBox {
        self.geometry.bounding_box()
    }

    fn box_query(&self) -> BoxQuery {
        BoxQuery::Intersecting
    }

    fn matches_geometry(&self, stored: &Geometry) -> bool {
        stored.intersects(&self.geometry)
    }
}

impl FilterProvider for IntersectsFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        Ok(apply_spatial(self, document, context))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for IntersectsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} intersects {})", self.field, self.geometry)
    }
}

/// Matches documents whose geometry lies entirely inside the search
/// geometry, boundary included.
#[derive(Clone, Debug)]
pub struct WithinFilter {
    field: String,
    geometry: Geometry,
}

impl WithinFilter {
    pub fn new(field: impl Into<String>, geometry: Geometry) -> Self {
        WithinFilter {
            field: field.into(),
            geometry,
        }
    }
}

impl SpatialFilterOps for WithinFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn search_box(&self) -> BoundingBox {
        self.geometry.bounding_box()
    }

    fn box_query(&self) -> BoxQuery {
        BoxQuery::Contained
    }

    fn matches_geometry(&self, stored: &Geometry) -> bool {
        stored.within(&self.geometry)
    }
}

impl FilterProvider for WithinFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        Ok(apply_spatial(self, document, context))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for WithinFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} within {})", self.field, self.geometry)
    }
}

/// Matches documents whose geometry comes within `distance` of a point.
#[derive(Clone, Debug)]
pub struct NearFilter {
    field: String,
    center: Point,
    distance: f64,
}

impl NearFilter {
    /// # Errors
    /// `InvalidDistance` when `distance` is negative or not finite.
    pub fn new(field: impl Into<String>, center: Point, distance: f64) -> SpatialResult<Self> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(SpatialError::InvalidDistance(distance));
        }
        Ok(NearFilter {
            field: field.into(),
            center,
            distance,
        })
    }

    pub fn center(&self) -> &Point {
        &self.center
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }
}

impl SpatialFilterOps for NearFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn search_box(&self) -> BoundingBox {
        BoundingBox::new(self.center.x(), self.center.y(), self.center.x(), self.center.y()).expand(self.distance)
    }

    fn box_query(&self) -> BoxQuery {
        BoxQuery::Intersecting
    }

    fn matches_geometry(&self, stored: &Geometry) -> bool {
        stored.distance_to(&self.center) <= self.distance
    }
}

impl FilterProvider for NearFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        Ok(apply_spatial(self, document, context))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for NearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} near POINT ({}) within {})", self.field, self.center, self.distance)
    }
}

pub fn is_spatial_filter(filter: &Filter) -> bool {
    as_spatial_filter(filter).is_some()
}

pub(crate) fn as_spatial_filter(filter: &Filter) -> Option<&dyn SpatialFilterOps> {
    let any = filter.as_any();
    if let Some(f) = any.downcast_ref::<IntersectsFilter>() {
        Some(f)
    } else if let Some(f) = any.downcast_ref::<WithinFilter>() {
        Some(f)
    } else if let Some(f) = any.downcast_ref::<NearFilter>() {
        Some(f)
    } else {
        None
    }
}
