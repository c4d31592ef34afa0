//! Grid coordinates, footprints and rectangular regions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer cell coordinate inside a container grid.
///
/// Coordinates are signed so that callers can express positions that fall
/// outside the grid; every container operation bounds-checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    /// Create a new grid position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position by a number of cells, `None` if a coordinate
    /// leaves the `i32` range
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width × height of the cells an item occupies. Both sides lie in
/// `1..=Footprint::MAX_SIDE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawFootprint")]
pub struct Footprint {
    w: u32,
    h: u32,
}

#[derive(Deserialize)]
struct RawFootprint {
    w: u32,
    h: u32,
}

impl From<RawFootprint> for Footprint {
    fn from(raw: RawFootprint) -> Self {
        Self::new(raw.w, raw.h)
    }
}

impl Footprint {
    /// Single cell footprint
    pub const ONE: Footprint = Footprint { w: 1, h: 1 };

    /// Longest side, so that every cell offset fits a grid coordinate
    pub const MAX_SIDE: u32 = i32::MAX as u32;

    /// Create a footprint, clamping both sides to `1..=MAX_SIDE`
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            w: w.clamp(1, Self::MAX_SIDE),
            h: h.clamp(1, Self::MAX_SIDE),
        }
    }

    /// Width in cells
    pub fn width(&self) -> u32 {
        self.w
    }

    /// Height in cells
    pub fn height(&self) -> u32 {
        self.h
    }

    /// Number of cells covered
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// Length of the footprint diagonal, used to order items by size
    pub fn diagonal(&self) -> f32 {
        let (w, h) = (self.w as f32, self.h as f32);
        (w * w + h * h).sqrt()
    }

    /// The footprint turned by 90 degrees
    pub fn rotated(&self) -> Self {
        Self { w: self.h, h: self.w }
    }

    /// Whether width and height are equal (rotation has no effect)
    pub fn is_square(&self) -> bool {
        self.w == self.h
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Axis-aligned rectangle of cells `[origin, origin + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub origin: GridPos,
    pub size: Footprint,
}

impl Region {
    /// Create a new region
    pub fn new(origin: GridPos, size: Footprint) -> Self {
        Self { origin, size }
    }

    /// Whether a cell lies inside this region
    pub fn contains(&self, pos: GridPos) -> bool {
        let dx = pos.x as i64 - self.origin.x as i64;
        let dy = pos.y as i64 - self.origin.y as i64;
        dx >= 0 && dy >= 0 && dx < self.size.width() as i64 && dy < self.size.height() as i64
    }

    /// Exclusive end corner `(x, y)` in `i64`, so it never overflows
    pub fn end(&self) -> (i64, i64) {
        (
            i64::from(self.origin.x) + i64::from(self.size.width()),
            i64::from(self.origin.y) + i64::from(self.size.height()),
        )
    }

    /// Overlap of two regions
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let (end_x, end_y) = self.end();
        let (other_x, other_y) = other.end();
        let x0 = self.origin.x.max(other.origin.x);
        let y0 = self.origin.y.max(other.origin.y);
        let x1 = end_x.min(other_x);
        let y1 = end_y.min(other_y);
        if i64::from(x0) >= x1 || i64::from(y0) >= y1 {
            return None;
        }
        let size = Footprint::new((x1 - i64::from(x0)) as u32, (y1 - i64::from(y0)) as u32);
        Some(Region::new(GridPos::new(x0, y0), size))
    }

    /// Iterate the cells of this region, column by column (x outer, y inner).
    /// Cells past the `i32` coordinate range are not produced.
    pub fn cells(&self) -> impl Iterator<Item = GridPos> {
        let limit = i64::from(i32::MAX) + 1;
        let (x0, y0) = (i64::from(self.origin.x), i64::from(self.origin.y));
        let (end_x, end_y) = self.end();
        let (x1, y1) = (end_x.min(limit), end_y.min(limit));
        // every value below `limit` fits an i32
        (x0..x1).flat_map(move |x| (y0..y1).map(move |y| GridPos::new(x as i32, y as i32)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_clamps_to_one() {
        let fp = Footprint::new(0, 3);
        assert_eq!(fp.width(), 1);
        assert_eq!(fp.height(), 3);
    }

    #[test]
    fn test_rotation() {
        let fp = Footprint::new(1, 3);
        assert_eq!(fp.rotated(), Footprint::new(3, 1));
        assert!(Footprint::new(2, 2).is_square());
    }

    #[test]
    fn test_region_cells() {
        let region = Region::new(GridPos::new(1, 1), Footprint::new(2, 2));
        let cells: Vec<_> = region.cells().collect();
        assert_eq!(
            cells,
            vec![
                GridPos::new(1, 1),
                GridPos::new(1, 2),
                GridPos::new(2, 1),
                GridPos::new(2, 2)
            ]
        );
        assert!(region.contains(GridPos::new(2, 2)));
        assert!(!region.contains(GridPos::new(3, 1)));
        assert!(!region.contains(GridPos::new(0, 1)));
    }

    #[test]
    fn test_footprint_caps_sides() {
        let fp = Footprint::new(u32::MAX, 2);
        assert_eq!(fp.width(), Footprint::MAX_SIDE);
        assert_eq!(fp.area(), u64::from(Footprint::MAX_SIDE) * 2);

        let decoded: Footprint = serde_json::from_str(r#"{"w":4294967295,"h":0}"#).unwrap();
        assert_eq!(decoded, Footprint::new(Footprint::MAX_SIDE, 1));
    }

    #[test]
    fn test_cells_near_coordinate_limit() {
        let region = Region::new(GridPos::new(i32::MAX, 0), Footprint::new(3, 1));
        assert_eq!(region.cells().collect::<Vec<_>>(), vec![GridPos::new(i32::MAX, 0)]);
        assert_eq!(GridPos::new(i32::MAX, 0).checked_offset(1, 0), None);
        assert_eq!(GridPos::new(1, 1).checked_offset(-1, 2), Some(GridPos::new(0, 3)));
    }

    #[test]
    fn test_intersect() {
        let grid = Region::new(GridPos::new(0, 0), Footprint::new(4, 4));
        let overhang = Region::new(GridPos::new(3, -1), Footprint::new(5, 2));
        assert_eq!(
            grid.intersect(&overhang),
            Some(Region::new(GridPos::new(3, 0), Footprint::new(1, 1)))
        );
        let far = Region::new(GridPos::new(i32::MAX, 0), Footprint::new(2, 1));
        assert_eq!(grid.intersect(&far), None);
    }

    #[test]
    fn test_diagonal_ordering() {
        assert!(Footprint::new(2, 2).diagonal() > Footprint::new(1, 2).diagonal());
        assert_eq!(Footprint::new(1, 2).diagonal(), Footprint::new(2, 1).diagonal());
    }
}
