//! Tile specification type.
//!
//! A `TileSpec` is one cell of the grid: its position in the traversal,
//! its bounding box and the filename its payload is written to.

use crate::coord::BoundingBox;
use std::path::{Path, PathBuf};

/// Prefix of every tile filename.
pub const TILE_FILE_PREFIX: &str = "tile_";

/// Extension of every tile filename.
pub const TILE_FILE_EXTENSION: &str = "osm";

/// Returns the filename assigned to the tile at `index` in traversal order.
///
/// # Example
///
/// ```
/// use osmgrid::grid::tile_filename;
///
/// assert_eq!(tile_filename(0), "tile_0.osm");
/// assert_eq!(tile_filename(12), "tile_12.osm");
/// ```
#[inline]
pub fn tile_filename(index: usize) -> String {
    format!("{}{}.{}", TILE_FILE_PREFIX, index, TILE_FILE_EXTENSION)
}

/// Whether `name` has the shape of a tile filename (`tile_<digits>.osm`).
///
/// ```
/// use osmgrid::grid::is_tile_filename;
///
/// assert!(is_tile_filename("tile_7.osm"));
/// assert!(!is_tile_filename("merged.osm"));
/// assert!(!is_tile_filename("tile_.osm"));
/// ```
pub fn is_tile_filename(name: &str) -> bool {
    name.strip_prefix(TILE_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(TILE_FILE_EXTENSION))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Returns the flattened traversal index of a grid cell.
///
/// Rows are traversed south to north, columns west to east, so the index is
/// a pure function of the cell position and the number of columns.
#[inline]
pub fn tile_index(row: usize, col: usize, columns: usize) -> usize {
    row * columns + col
}

/// One cell of a partitioned bounding box.
///
/// Immutable once created by the partitioner.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSpec {
    index: usize,
    row: usize,
    col: usize,
    bbox: BoundingBox,
    filename: String,
}

impl TileSpec {
    pub(super) fn new(row: usize, col: usize, columns: usize, bbox: BoundingBox) -> Self {
        let index = tile_index(row, col, columns);
        Self {
            index,
            row,
            col,
            bbox,
            filename: tile_filename(index),
        }
    }

    /// Position in the row-major traversal, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Grid row, 0 at the southern edge.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Grid column, 0 at the western edge.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Geographic extent of this cell (north/east edges already clamped).
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Filename assigned to this cell, e.g. `tile_3.osm`.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Path of this tile's file inside `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.filename)
    }
}
