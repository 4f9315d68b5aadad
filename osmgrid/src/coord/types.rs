//! Coordinate type definitions

use std::fmt;

/// Valid latitude range in degrees
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range in degrees
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A rectangle in geographic coordinates (decimal degrees).
///
/// `north > south` and `east > west` describe a non-empty box. The type does
/// not enforce this: an inverted or degenerate box is representable and
/// simply partitions into zero tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Northern edge (latitude)
    pub north: f64,
    /// Southern edge (latitude)
    pub south: f64,
    /// Eastern edge (longitude)
    pub east: f64,
    /// Western edge (longitude)
    pub west: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its four edges.
    #[inline]
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Returns true if the box encloses a non-zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.north > self.south && self.east > self.west)
    }

    /// Returns true if all four edges are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.north.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.west.is_finite()
    }

    /// Returns true if all edges lie within valid latitude/longitude ranges.
    pub fn is_within_world(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.north)
            && (MIN_LAT..=MAX_LAT).contains(&self.south)
            && (MIN_LON..=MAX_LON).contains(&self.east)
            && (MIN_LON..=MAX_LON).contains(&self.west)
    }

    /// Width of the box in degrees of longitude (negative if inverted).
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the box in degrees of latitude (negative if inverted).
    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Area in square degrees, zero for empty boxes.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    /// Area shared with another box, zero when they only touch or are disjoint.
    pub fn overlap_area(&self, other: &BoundingBox) -> f64 {
        let west = self.west.max(other.west);
        let east = self.east.min(other.east);
        let south = self.south.max(other.south);
        let north = self.north.min(other.north);

        if east > west && north > south {
            (east - west) * (north - south)
        } else {
            0.0
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N({}) E({}) S({}) W({})",
            self.north, self.east, self.south, self.west
        )
    }
}

/// Grid step size in degrees.
///
/// Both values must be strictly positive; the partitioner rejects anything
/// else rather than looping forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDimensions {
    /// Step in longitude
    pub width: f64,
    /// Step in latitude
    pub height: f64,
}

impl TileDimensions {
    /// Creates tile dimensions without validation.
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true if both dimensions are finite and strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl fmt::Display for TileDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
