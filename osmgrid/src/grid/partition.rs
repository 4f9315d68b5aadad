//! Bounding box partitioning.

use super::error::GridError;
use super::spec::TileSpec;
use crate::coord::{BoundingBox, TileDimensions};

/// Largest grid [`partition`] will build.
///
/// A world-sized box cut into 0.0001 degree cells would need trillions of
/// tiles; anything above this limit is rejected with
/// [`GridError::TooManyTiles`] before any allocation happens.
pub const MAX_TILES: usize = 1_000_000;

/// Number of grid steps of size `step` that start strictly before `end`.
///
/// Offsets are computed as `start + i * step` so that every caller derives
/// bit-identical edges for the same index. The count is estimated with
/// `ceil` and then nudged by at most a couple of steps to absorb rounding.
/// Counts above [`MAX_TILES`] are returned as the (saturated) estimate.
fn axis_steps(start: f64, end: f64, step: f64) -> usize {
    if end <= start {
        return 0;
    }

    let estimate = ((end - start) / step).ceil();
    if estimate > MAX_TILES as f64 {
        return estimate as usize;
    }

    let mut steps = estimate as usize;
    while steps > 0 && axis_offset(start, steps - 1, step) >= end {
        steps -= 1;
    }
    while axis_offset(start, steps, step) < end {
        steps += 1;
    }
    steps
}

#[inline]
fn axis_offset(start: f64, i: usize, step: f64) -> f64 {
    start + i as f64 * step
}

fn validate(bbox: &BoundingBox, dims: TileDimensions) -> Result<(), GridError> {
    if !dims.is_valid() {
        return Err(GridError::InvalidDimensions {
            width: dims.width,
            height: dims.height,
        });
    }
    if !bbox.is_finite() {
        return Err(GridError::NonFiniteBounds(*bbox));
    }
    Ok(())
}

/// Returns the `(rows, columns)` shape of the grid covering `bbox`.
///
/// An inverted or degenerate box has zero rows or zero columns.
///
/// # Errors
///
/// Returns `GridError::InvalidDimensions` if either dimension is not a
/// positive finite number, `GridError::NonFiniteBounds` if an edge of the
/// box is infinite or NaN, and `GridError::TooManyTiles` if the grid would
/// hold more than [`MAX_TILES`] cells.
pub fn grid_shape(bbox: &BoundingBox, dims: TileDimensions) -> Result<(usize, usize), GridError> {
    validate(bbox, dims)?;

    let rows = axis_steps(bbox.south, bbox.north, dims.height);
    let columns = axis_steps(bbox.west, bbox.east, dims.width);

    if rows == 0 || columns == 0 {
        return Ok((0, 0));
    }

    match rows.checked_mul(columns) {
        Some(cells) if cells <= MAX_TILES => Ok((rows, columns)),
        _ => Err(GridError::TooManyTiles {
            rows,
            columns,
            limit: MAX_TILES,
        }),
    }
}

/// Partitions a bounding box into a row-major grid of tiles.
///
/// Rows run south to north and columns west to east. Each cell's south and
/// west edges are the unclamped grid offsets; its north and east edges are
/// the next offsets clamped to the box, so the last row and column never
/// extend past the requested area. Tiles are numbered in traversal order
/// starting at 0 and named `tile_<index>.osm`.
///
/// An inverted or empty box yields an empty sequence.
///
/// # Errors
///
/// See [`grid_shape`].
///
/// # Example
///
/// ```
/// use osmgrid::coord::{BoundingBox, TileDimensions};
/// use osmgrid::grid::partition;
///
/// let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0);
/// let tiles = partition(&bbox, TileDimensions::new(0.5, 1.0)).unwrap();
///
/// assert_eq!(tiles.len(), 2);
/// assert_eq!(tiles[1].filename(), "tile_1.osm");
/// assert_eq!(tiles[1].bbox().west, 0.5);
/// ```
pub fn partition(bbox: &BoundingBox, dims: TileDimensions) -> Result<Vec<TileSpec>, GridError> {
    let (rows, columns) = grid_shape(bbox, dims)?;
    let mut tiles = Vec::with_capacity(rows * columns);

    for row in 0..rows {
        let south = axis_offset(bbox.south, row, dims.height);
        let north = axis_offset(bbox.south, row + 1, dims.height).min(bbox.north);

        for col in 0..columns {
            let west = axis_offset(bbox.west, col, dims.width);
            let east = axis_offset(bbox.west, col + 1, dims.width).min(bbox.east);

            tiles.push(TileSpec::new(
                row,
                col,
                columns,
                BoundingBox::new(north, south, east, west),
            ));
        }
    }

    Ok(tiles)
}
