use potash::errors::{ErrorKind, PotashError};
use thiserror::Error;

/// Errors raised while reading or validating geometries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Coordinate ({x}, {y}) is not finite")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("{kind} needs at least {required} points, got {actual}")]
    TooFewPoints {
        kind: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Distance {0} must be finite and non-negative")]
    InvalidDistance(f64),

    #[error("Value of type {0} is not a geometry")]
    NotAGeometry(&'static str),

    #[error("Unknown geometry type {0}")]
    UnknownType(String),

    #[error("Malformed coordinates for {0}")]
    MalformedCoordinates(&'static str),

    #[error("Spatial index covers exactly one field, got {0}")]
    CompoundIndex(usize),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

impl From<SpatialError> for PotashError {
    fn from(err: SpatialError) -> Self {
        let kind = match err {
            SpatialError::CompoundIndex(_) => ErrorKind::IndexValidationError,
            _ => ErrorKind::Extension("spatial".to_string()),
        };
        PotashError::new(&err.to_string(), kind)
    }
}
