//! Grid partitioning of a bounding box into tiles.
//!
//! The partitioner is a pure function: it owns no state and always yields
//! the same ordered sequence for the same inputs.
//!
//! ```text
//!   north ┌──────────┬──────────┬────┐
//!         │ tile_3   │ tile_4   │ t5 │   row 1
//!         ├──────────┼──────────┼────┤
//!         │ tile_0   │ tile_1   │ t2 │   row 0
//!   south └──────────┴──────────┴────┘
//!        west                       east (last column clamped)
//! ```
//!
//! # Example
//!
//! ```
//! use osmgrid::coord::{BoundingBox, TileDimensions};
//! use osmgrid::grid::partition;
//!
//! let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0);
//! let tiles = partition(&bbox, TileDimensions::new(0.6, 1.0))?;
//!
//! assert_eq!(tiles[1].bbox().east, 1.0);
//! # Ok::<(), osmgrid::grid::GridError>(())
//! ```

mod error;
mod partition;
mod spec;

pub use error::GridError;
pub use partition::{grid_shape, partition, MAX_TILES};
pub use spec::{is_tile_filename, tile_filename, tile_index, TileSpec, TILE_FILE_EXTENSION, TILE_FILE_PREFIX};
