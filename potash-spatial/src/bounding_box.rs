use crate::geometry::Point;
use potash::collection::PotashId;
use potash::common::Value;
use rstar::{RTreeObject, AABB};
use std::fmt::{Display, Formatter};

/// An axis aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates a box from two opposite corners in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        BoundingBox {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// The smallest box holding every point of `points`.
    ///
    /// `points` must not be empty.
    pub(crate) fn of_points(points: &[Point]) -> Self {
        let mut bbox = BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for point in points {
            bbox.min_x = bbox.min_x.min(point.x());
            bbox.min_y = bbox.min_y.min(point.y());
            bbox.max_x = bbox.max_x.max(point.x());
            bbox.max_y = bbox.max_y.max(point.y());
        }
        bbox
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Grows the box by `distance` on every side.
    pub fn expand(&self, distance: f64) -> Self {
        BoundingBox {
            min_x: self.min_x - distance,
            min_y: self.min_y - distance,
            max_x: self.max_x + distance,
            max_y: self.max_y + distance,
        }
    }

    pub(crate) fn to_aabb(self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }

    /// Encodes the box as the value of a spatial index entry.
    pub(crate) fn to_value(self) -> Value {
        Value::Array(vec![
            Value::F64(self.min_x),
            Value::F64(self.min_y),
            Value::F64(self.max_x),
            Value::F64(self.max_y),
        ])
    }

    pub(crate) fn from_value(value: &Value) -> Option<BoundingBox> {
        let bounds = value.as_array()?;
        if bounds.len() != 4 {
            return None;
        }
        let mut corners = [0.0; 4];
        for (slot, bound) in corners.iter_mut().zip(bounds) {
            *slot = bound.as_f64()?;
        }
        Some(BoundingBox::new(corners[0], corners[1], corners[2], corners[3]))
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox({}, {}, {}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// A document's bounding box as stored in the R-tree.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct IndexedBox {
    pub(crate) id: PotashId,
    pub(crate) envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}
