//! Geographic coordinate types
//!
//! Bounding boxes and grid step sizes in decimal degrees, as used by the
//! partitioner and the map API.

mod types;

pub use types::{BoundingBox, TileDimensions, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
