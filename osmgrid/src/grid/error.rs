//! Error types for grid partitioning.

use crate::coord::BoundingBox;
use thiserror::Error;

/// Errors that can occur while partitioning a bounding box.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Tile width or height is zero, negative or not a finite number
    #[error("Invalid tile dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions {
        /// Requested tile width
        width: f64,
        /// Requested tile height
        height: f64,
    },

    /// One of the bounding box edges is infinite or NaN
    #[error("Bounding box {0} has non-finite edges")]
    NonFiniteBounds(BoundingBox),

    /// The grid would hold more tiles than the partitioner allows
    #[error("Grid of {rows}x{columns} tiles exceeds the limit of {limit} tiles; use larger tiles or a smaller area")]
    TooManyTiles {
        /// Rows needed to cover the box
        rows: usize,
        /// Columns needed to cover the box
        columns: usize,
        /// Maximum number of tiles
        limit: usize,
    },
}
