//! Error types for cube packing.

use thiserror::Error;

use crate::geometry::Point;

/// Result type alias for cube packing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised for invalid input or failed output.
///
/// A volume that cannot be tiled is not an error; see
/// [`Outcome`](crate::solver::Outcome).
#[derive(Debug, Error)]
pub enum Error {
    /// A shape needs at least one point.
    #[error("shape has no points")]
    EmptyShape,

    /// The same cell appears twice in a shape.
    #[error("shape contains point {0} more than once")]
    DuplicatePoint(Point),

    /// A shape coordinate lies outside the supported range.
    #[error("point {0} is out of range, coordinates must be within ±{max}", max = crate::shape::MAX_COORDINATE)]
    CoordinateOutOfRange(Point),

    /// Box extents must all be positive and the box no larger than
    /// [`MAX_CELLS`](crate::shape::MAX_CELLS).
    #[error("invalid box extents {0}x{1}x{2}, every extent must be at least 1 and the box at most {max} cells", max = crate::shape::MAX_CELLS)]
    InvalidExtent(usize, usize, usize),

    /// Cube side length must be in `1..=MAX_LENGTH`.
    #[error("invalid cube length {0}, must be between 1 and {max}", max = crate::solver::MAX_LENGTH)]
    InvalidLength(usize),

    /// A shape could not be parsed from text.
    #[error("could not parse shape: {0}")]
    ParseShape(String),

    /// No preset shape with this name exists.
    #[error("unknown preset shape `{0}`")]
    UnknownPreset(String),

    /// Writing a result failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
