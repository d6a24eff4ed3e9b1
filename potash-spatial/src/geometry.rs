//! Planar geometries and the predicates spatial filters evaluate.
//!
//! A geometry is stored in a document field as an embedded document in
//! GeoJSON layout:
//!
//! ```text
//! { "type": "Point",      "coordinates": [x, y] }
//! { "type": "LineString", "coordinates": [[x, y], [x, y], ...] }
//! { "type": "Polygon",    "coordinates": [[[x, y], [x, y], [x, y], ...]] }
//! ```
//!
//! Polygons have a single ring and no holes. The ring may repeat its first
//! point at the end.

use crate::bounding_box::BoundingBox;
use crate::error::{SpatialError, SpatialResult};
use potash::collection::Document;
use potash::common::Value;
use std::fmt::{self, Display};

pub const GEOMETRY_TYPE: &str = "type";
pub const GEOMETRY_COORDINATES: &str = "coordinates";

const POINT: &str = "Point";
const LINE_STRING: &str = "LineString";
const POLYGON: &str = "Polygon";

const EPSILON: f64 = 1e-9;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// # Errors
    /// `NonFiniteCoordinate` when either coordinate is NaN or infinite.
    pub fn new(x: f64, y: f64) -> SpatialResult<Point> {
        if !x.is_finite() || !y.is_finite() {
            return Err(SpatialError::NonFiniteCoordinate { x, y });
        }
        Ok(Point { x, y })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn same_as(&self, other: &Point) -> bool {
        self.distance(other) <= EPSILON
    }

    fn to_value(self) -> Value {
        Value::Array(vec![Value::F64(self.x), Value::F64(self.y)])
    }

    fn from_value(value: &Value, kind: &'static str) -> SpatialResult<Point> {
        match value.as_array().map(|v| v.as_slice()) {
            Some([x, y]) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => Point::new(x, y),
                _ => Err(SpatialError::MalformedCoordinates(kind)),
            },
            _ => Err(SpatialError::MalformedCoordinates(kind)),
        }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// A planar geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    /// A closed ring, stored without the repeated closing point.
    Polygon(Vec<Point>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Inside,
    Boundary,
    Outside,
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> SpatialResult<Geometry> {
        Ok(Geometry::Point(Point::new(x, y)?))
    }

    /// # Errors
    /// `TooFewPoints` for fewer than two points.
    pub fn line_string(coordinates: &[(f64, f64)]) -> SpatialResult<Geometry> {
        let points = to_points(coordinates)?;
        Self::checked_line_string(points)
    }

    /// # Errors
    /// `TooFewPoints` for fewer than three distinct ring points.
    pub fn polygon(coordinates: &[(f64, f64)]) -> SpatialResult<Geometry> {
        let points = to_points(coordinates)?;
        Self::checked_polygon(points)
    }

    /// The rectangle spanned by two opposite corners.
    pub fn envelope(x1: f64, y1: f64, x2: f64, y2: f64) -> SpatialResult<Geometry> {
        let bbox = BoundingBox::new(x1, y1, x2, y2);
        Geometry::polygon(&[
            (bbox.min_x, bbox.min_y),
            (bbox.max_x, bbox.min_y),
            (bbox.max_x, bbox.max_y),
            (bbox.min_x, bbox.max_y),
        ])
    }

    fn checked_line_string(points: Vec<Point>) -> SpatialResult<Geometry> {
        if points.len() < 2 {
            return Err(SpatialError::TooFewPoints {
                kind: LINE_STRING,
                required: 2,
                actual: points.len(),
            });
        }
        Ok(Geometry::LineString(points))
    }

    fn checked_polygon(mut points: Vec<Point>) -> SpatialResult<Geometry> {
        if points.len() > 1 && points[0].same_as(&points[points.len() - 1]) {
            points.pop();
        }
        if points.len() < 3 {
            return Err(SpatialError::TooFewPoints {
                kind: POLYGON,
                required: 3,
                actual: points.len(),
            });
        }
        Ok(Geometry::Polygon(points))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => POINT,
            Geometry::LineString(_) => LINE_STRING,
            Geometry::Polygon(_) => POLYGON,
        }
    }

    fn vertices(&self) -> &[Point] {
        match self {
            Geometry::Point(p) => std::slice::from_ref(p),
            Geometry::LineString(points) | Geometry::Polygon(points) => points,
        }
    }

    /// The segments of the geometry; a polygon includes its closing edge.
    fn segments(&self) -> Vec<(Point, Point)> {
        match self {
            Geometry::Point(_) => Vec::new(),
            Geometry::LineString(points) => points.windows(2).map(|w| (w[0], w[1])).collect(),
            Geometry::Polygon(ring) => (0..ring.len())
                .map(|i| (ring[i], ring[(i + 1) % ring.len()]))
                .collect(),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::of_points(self.vertices())
    }

    /// Whether the two geometries share at least one point.
    pub fn intersects(&self, other: &Geometry) -> bool {
        if !self.bounding_box().intersects(&other.bounding_box()) {
            return false;
        }

        match (self, other) {
            (Geometry::Point(p), Geometry::Point(q)) => p.same_as(q),
            (Geometry::Point(p), shape) | (shape, Geometry::Point(p)) => shape.locate(p) != Location::Outside,
            _ => {
                let theirs = other.segments();
                let crosses = self
                    .segments()
                    .iter()
                    .any(|a| theirs.iter().any(|b| segments_intersect(a, b)));
                // No edges meet: one shape can only hold the other entirely.
                crosses
                    || (matches!(other, Geometry::Polygon(_)) && other.locate(&self.vertices()[0]) != Location::Outside)
                    || (matches!(self, Geometry::Polygon(_)) && self.locate(&other.vertices()[0]) != Location::Outside)
            }
        }
    }

    /// Whether every point of this geometry lies in `other`, boundary
    /// included.
    pub fn within(&self, other: &Geometry) -> bool {
        if !other.bounding_box().contains(&self.bounding_box()) {
            return false;
        }

        match other {
            Geometry::Point(q) => self.vertices().iter().all(|p| p.same_as(q)),
            Geometry::LineString(_) => {
                !matches!(self, Geometry::Polygon(_))
                    && self.vertices().iter().all(|p| other.locate(p) != Location::Outside)
                    && self
                        .segments()
                        .iter()
                        .all(|(a, b)| other.locate(&midpoint(a, b)) != Location::Outside)
            }
            Geometry::Polygon(_) => {
                let theirs = other.segments();
                let inside = self.vertices().iter().all(|p| other.locate(p) != Location::Outside);
                let no_crossing = self.segments().iter().all(|a| {
                    theirs.iter().all(|b| !segments_cross(a, b))
                        && other.locate(&midpoint(&a.0, &a.1)) != Location::Outside
                });
                let not_pierced = match self {
                    Geometry::Polygon(_) => other.vertices().iter().all(|p| self.locate(p) != Location::Inside),
                    _ => true,
                };
                inside && no_crossing && not_pierced
            }
        }
    }

    /// The shortest distance from `point` to this geometry; zero for a
    /// point inside a polygon.
    pub fn distance_to(&self, point: &Point) -> f64 {
        match self {
            Geometry::Point(p) => p.distance(point),
            Geometry::LineString(_) => self.edge_distance(point),
            Geometry::Polygon(_) => match self.locate(point) {
                Location::Outside => self.edge_distance(point),
                _ => 0.0,
            },
        }
    }

    fn edge_distance(&self, point: &Point) -> f64 {
        self.segments()
            .iter()
            .map(|(a, b)| segment_distance(point, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    fn locate(&self, point: &Point) -> Location {
        match self {
            Geometry::Point(p) => {
                if p.same_as(point) {
                    Location::Boundary
                } else {
                    Location::Outside
                }
            }
            Geometry::LineString(_) => {
                if self.segments().iter().any(|(a, b)| on_segment(point, a, b)) {
                    Location::Boundary
                } else {
                    Location::Outside
                }
            }
            Geometry::Polygon(ring) => {
                if self.segments().iter().any(|(a, b)| on_segment(point, a, b)) {
                    return Location::Boundary;
                }
                // Ray casting towards +x.
                let mut inside = false;
                let mut j = ring.len() - 1;
                for i in 0..ring.len() {
                    let (a, b) = (ring[i], ring[j]);
                    if (a.y > point.y) != (b.y > point.y) {
                        let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                        if point.x < x {
                            inside = !inside;
                        }
                    }
                    j = i;
                }
                if inside {
                    Location::Inside
                } else {
                    Location::Outside
                }
            }
        }
    }

    /// Encodes the geometry as an embedded document.
    pub fn to_document(&self) -> Document {
        let coordinates = match self {
            Geometry::Point(p) => p.to_value(),
            Geometry::LineString(points) => Value::Array(points.iter().map(|p| p.to_value()).collect()),
            Geometry::Polygon(ring) => {
                let mut closed: Vec<Value> = ring.iter().map(|p| p.to_value()).collect();
                closed.push(ring[0].to_value());
                Value::Array(vec![Value::Array(closed)])
            }
        };
        let mut document = Document::new();
        document.put_raw(GEOMETRY_TYPE, Value::from(self.type_name()));
        document.put_raw(GEOMETRY_COORDINATES, coordinates);
        document
    }

    /// Reads a geometry from its embedded document form.
    ///
    /// # Errors
    /// `NotAGeometry` when `value` is not a document, `UnknownType` or
    /// `MalformedCoordinates` when the document does not describe a
    /// geometry.
    pub fn from_value(value: &Value) -> SpatialResult<Geometry> {
        let document = value
            .as_document()
            .ok_or_else(|| SpatialError::NotAGeometry(value.type_name()))?;
        let kind = document
            .get(GEOMETRY_TYPE)
            .and_then(|v| v.as_str())
            .ok_or(SpatialError::NotAGeometry("document"))?;
        let coordinates = document.get(GEOMETRY_COORDINATES).unwrap_or(&Value::Null);

        match kind {
            POINT => Ok(Geometry::Point(Point::from_value(coordinates, POINT)?)),
            LINE_STRING => {
                let points = point_list(coordinates, LINE_STRING)?;
                Self::checked_line_string(points)
            }
            POLYGON => {
                let ring = match coordinates.as_array().map(|v| v.as_slice()) {
                    Some([ring]) => ring,
                    _ => return Err(SpatialError::MalformedCoordinates(POLYGON)),
                };
                Self::checked_polygon(point_list(ring, POLYGON)?)
            }
            other => Err(SpatialError::UnknownType(other.to_string())),
        }
    }
}

impl From<Geometry> for Value {
    fn from(geometry: Geometry) -> Self {
        Value::Document(geometry.to_document())
    }
}

impl TryFrom<&Value> for Geometry {
    type Error = SpatialError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Geometry::from_value(value)
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |points: &[Point]| points.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ");
        match self {
            Geometry::Point(p) => write!(f, "POINT ({})", p),
            Geometry::LineString(points) => write!(f, "LINESTRING ({})", join(points)),
            Geometry::Polygon(ring) => write!(f, "POLYGON (({}, {}))", join(ring), ring[0]),
        }
    }
}

fn to_points(coordinates: &[(f64, f64)]) -> SpatialResult<Vec<Point>> {
    coordinates.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn point_list(value: &Value, kind: &'static str) -> SpatialResult<Vec<Point>> {
    value
        .as_array()
        .ok_or(SpatialError::MalformedCoordinates(kind))?
        .iter()
        .map(|v| Point::from_value(v, kind))
        .collect()
}

fn midpoint(a: &Point, b: &Point) -> Point {
    Point {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

fn cross(o: &Point, a: &Point, b: &Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    segment_distance(p, a, b) <= EPSILON
}

fn segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length = dx * dx + dy * dy;
    if length == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length).clamp(0.0, 1.0);
    p.distance(&Point {
        x: a.x + t * dx,
        y: a.y + t * dy,
    })
}

fn segments_intersect((a, b): &(Point, Point), (c, d): &(Point, Point)) -> bool {
    segments_cross(&(*a, *b), &(*c, *d))
        || on_segment(a, c, d)
        || on_segment(b, c, d)
        || on_segment(c, a, b)
        || on_segment(d, a, b)
}

/// Whether the segments cross at a single point interior to both.
fn segments_cross((a, b): &(Point, Point), (c, d): &(Point, Point)) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Geometry {
        Geometry::envelope(x, y, x + size, y + size).unwrap()
    }

    #[test]
    fn test_invalid_geometries() {
        assert!(matches!(
            Point::new(f64::NAN, 1.0),
            Err(SpatialError::NonFiniteCoordinate { y, .. }) if y == 1.0
        ));
        assert!(Geometry::point(f64::INFINITY, 0.0).is_err());
        assert!(matches!(
            Geometry::line_string(&[(0.0, 0.0)]),
            Err(SpatialError::TooFewPoints { required: 2, .. })
        ));
        assert!(matches!(
            Geometry::polygon(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            Err(SpatialError::TooFewPoints { required: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_point_predicates() {
        let area = square(0.0, 0.0, 10.0);
        let inside = Geometry::point(5.0, 5.0).unwrap();
        let edge = Geometry::point(10.0, 3.0).unwrap();
        let outside = Geometry::point(11.0, 3.0).unwrap();

        assert!(inside.intersects(&area));
        assert!(area.intersects(&inside));
        assert!(edge.intersects(&area));
        assert!(!outside.intersects(&area));

        assert!(inside.within(&area));
        assert!(edge.within(&area));
        assert!(!outside.within(&area));
        assert!(!area.within(&inside));
    }

    #[test]
    fn test_concave_polygon_point() {
        // A "U" shape; the notch at the top middle is outside.
        let u = Geometry::polygon(&[
            (0.0, 0.0),
            (6.0, 0.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 6.0),
            (0.0, 6.0),
        ])
        .unwrap();
        assert!(!Geometry::point(3.0, 4.0).unwrap().intersects(&u));
        assert!(Geometry::point(1.0, 4.0).unwrap().intersects(&u));
        assert!(Geometry::point(3.0, 1.0).unwrap().within(&u));

        let bridge = Geometry::line_string(&[(1.0, 4.0), (5.0, 4.0)]).unwrap();
        assert!(bridge.intersects(&u));
        assert!(!bridge.within(&u));
    }

    #[test]
    fn test_line_predicates() {
        let a = Geometry::line_string(&[(0.0, 0.0), (10.0, 10.0)]).unwrap();
        let b = Geometry::line_string(&[(0.0, 10.0), (10.0, 0.0)]).unwrap();
        let c = Geometry::line_string(&[(20.0, 0.0), (20.0, 10.0)]).unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let part = Geometry::line_string(&[(2.0, 2.0), (3.0, 3.0)]).unwrap();
        assert!(part.within(&a));
        assert!(!b.within(&a));
        assert!(Geometry::point(4.0, 4.0).unwrap().within(&a));
    }

    #[test]
    fn test_polygon_predicates() {
        let big = square(0.0, 0.0, 10.0);
        let small = square(2.0, 2.0, 2.0);
        let overlapping = square(8.0, 8.0, 5.0);
        let far = square(20.0, 20.0, 1.0);

        assert!(small.within(&big));
        assert!(big.within(&big));
        assert!(!big.within(&small));
        assert!(!overlapping.within(&big));
        assert!(overlapping.intersects(&big));
        assert!(big.intersects(&small));
        assert!(small.intersects(&big));
        assert!(!far.intersects(&big));
    }

    #[test]
    fn test_distance() {
        let area = square(0.0, 0.0, 10.0);
        let origin = Point::new(0.0, 0.0).unwrap();
        assert_eq!(area.distance_to(&Point::new(5.0, 5.0).unwrap()), 0.0);
        assert!((area.distance_to(&Point::new(13.0, 14.0).unwrap()) - 5.0).abs() < 1e-12);

        let line = Geometry::line_string(&[(0.0, 3.0), (10.0, 3.0)]).unwrap();
        assert!((line.distance_to(&origin) - 3.0).abs() < 1e-12);
        assert!((Geometry::point(3.0, 4.0).unwrap().distance_to(&origin) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_document_form() {
        let polygon = Geometry::polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)]).unwrap();
        let value = Value::from(polygon.clone());
        let document = value.as_document().unwrap();
        assert_eq!(document.get(GEOMETRY_TYPE), Some(&Value::from("Polygon")));
        assert_eq!(Geometry::from_value(&value).unwrap(), polygon);

        let mut point = Document::new();
        point.put_raw(GEOMETRY_TYPE, Value::from("Point"));
        point.put_raw(GEOMETRY_COORDINATES, Value::Array(vec![Value::from(1), Value::F64(2.5)]));
        assert_eq!(
            Geometry::from_value(&Value::Document(point)).unwrap(),
            Geometry::point(1.0, 2.5).unwrap()
        );
    }

    #[test]
    fn test_rejected_documents() {
        assert_eq!(
            Geometry::from_value(&Value::from("POINT (1 2)")).unwrap_err(),
            SpatialError::NotAGeometry("string")
        );

        let mut circle = Document::new();
        circle.put_raw(GEOMETRY_TYPE, Value::from("Circle"));
        assert_eq!(
            Geometry::from_value(&Value::Document(circle)).unwrap_err(),
            SpatialError::UnknownType("Circle".to_string())
        );

        let mut point = Document::new();
        point.put_raw(GEOMETRY_TYPE, Value::from("Point"));
        point.put_raw(GEOMETRY_COORDINATES, Value::Array(vec![Value::from(1)]));
        assert_eq!(
            Geometry::from_value(&Value::Document(point)).unwrap_err(),
            SpatialError::MalformedCoordinates("Point")
        );
    }

    #[test]
    fn test_display() {
        let line = Geometry::line_string(&[(0.0, 0.0), (1.0, 2.0)]).unwrap();
        assert_eq!(line.to_string(), "LINESTRING (0 0, 1 2)");
        assert_eq!(square(0.0, 0.0, 1.0).to_string(), "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))");
    }
}
