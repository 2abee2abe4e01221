//! Quadtree tile identifiers on the cube-sphere.

use crate::CubeFace;

/// Uniquely identifies a node in one of the six per-face quadtrees.
///
/// - `face`: which cube face the tile belongs to.
/// - `level`: subdivision depth. Level 0 is the root tile covering the whole
///   face; each level halves the angular span and doubles the grid resolution.
/// - `x`, `y`: grid coordinates within the face at this level, each in
///   `[0, 2^level)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    /// Which cube face this tile belongs to.
    pub face: CubeFace,
    /// Subdivision level (0 = root, [`Self::MAX_LEVEL`] = finest addressable).
    pub level: u8,
    /// Horizontal grid coordinate within the face at this level.
    pub x: u32,
    /// Vertical grid coordinate within the face at this level.
    pub y: u32,
}

impl TileAddress {
    /// Maximum addressable subdivision level.
    ///
    /// At level 30 a face is split into 2^30 tiles per axis; on an Earth-sized
    /// body one tile then spans under a centimeter, far below any practical
    /// configuration.
    pub const MAX_LEVEL: u8 = 30;

    /// Number of tiles along one axis of a face at the given level.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`Self::MAX_LEVEL`].
    #[must_use]
    pub fn grid_size(level: u8) -> u32 {
        assert!(
            level <= Self::MAX_LEVEL,
            "level {level} exceeds MAX_LEVEL {}",
            Self::MAX_LEVEL
        );
        1u32 << level
    }

    /// Construct a `TileAddress`, validating that `x` and `y` are within the
    /// grid bounds for the given level.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`Self::MAX_LEVEL`] or if `x`/`y` are out of
    /// range. Addresses are produced internally by subdivision, so a violation
    /// is a logic defect.
    #[must_use]
    pub fn new(face: CubeFace, level: u8, x: u32, y: u32) -> Self {
        let size = Self::grid_size(level);
        assert!(x < size, "x={x} out of range for level {level} (max {size})");
        assert!(y < size, "y={y} out of range for level {level} (max {size})");
        Self { face, level, x, y }
    }

    /// The root tile covering the entire face.
    #[must_use]
    pub fn root(face: CubeFace) -> Self {
        Self {
            face,
            level: 0,
            x: 0,
            y: 0,
        }
    }

    /// The `i`-th child (`i` in `0..4`) at the next finer level.
    ///
    /// Bit 0 of `i` selects the `u` half, bit 1 the `v` half, so the four
    /// children exactly partition this tile's UV range.
    ///
    /// # Panics
    ///
    /// Panics if already at [`Self::MAX_LEVEL`] or if `i >= 4`.
    #[must_use]
    pub fn child(&self, i: u8) -> TileAddress {
        assert!(i < 4, "child index {i} out of range");
        TileAddress::new(
            self.face,
            self.level + 1,
            self.x * 2 + u32::from(i & 1),
            self.y * 2 + u32::from((i >> 1) & 1),
        )
    }

    /// All four children at the next finer level.
    #[must_use]
    pub fn children(&self) -> [TileAddress; 4] {
        [self.child(0), self.child(1), self.child(2), self.child(3)]
    }

    /// The parent tile at the next coarser level, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<TileAddress> {
        if self.level == 0 {
            return None;
        }
        Some(TileAddress {
            face: self.face,
            level: self.level - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// The parametric UV range of this tile on its face.
    ///
    /// Returns `(u0, v0, u1, v1)` in `[-1, 1]` coordinates: the span is
    /// `2 / 2^level`, so every level-0 tile yields `(-1, -1, 1, 1)`.
    #[must_use]
    pub fn uv_range(&self) -> (f64, f64, f64, f64) {
        let span = 2.0 / f64::from(Self::grid_size(self.level));
        let u0 = -1.0 + f64::from(self.x) * span;
        let v0 = -1.0 + f64::from(self.y) * span;
        (u0, v0, u0 + span, v0 + span)
    }

    /// The UV midpoint of this tile.
    #[must_use]
    pub fn center_uv(&self) -> (f64, f64) {
        let (u0, v0, u1, v1) = self.uv_range();
        ((u0 + u1) * 0.5, (v0 + v1) * 0.5)
    }

    /// Whether the given UV point lies within this tile's range.
    ///
    /// The lower edges are inclusive and the upper edges exclusive, except at
    /// the face boundary `+1`, so every point belongs to exactly one tile per
    /// level.
    #[must_use]
    pub fn contains_uv(&self, u: f64, v: f64) -> bool {
        let (u0, v0, u1, v1) = self.uv_range();
        let u_in = u >= u0 && (u < u1 || (u1 == 1.0 && u == 1.0));
        let v_in = v >= v0 && (v < v1 || (v1 == 1.0 && v == 1.0));
        u_in && v_in
    }

    /// The child whose quadrant contains the given UV point.
    ///
    /// The point is expected to lie within this tile's range; points on the
    /// midlines resolve to the upper quadrant.
    #[must_use]
    pub fn child_at(&self, u: f64, v: f64) -> TileAddress {
        let (cu, cv) = self.center_uv();
        let i = u8::from(u >= cu) | (u8::from(v >= cv) << 1);
        self.child(i)
    }
}

impl std::fmt::Display for TileAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:?}, level={}, x={}, y={})",
            self.face, self.level, self.x, self.y
        )
    }
}
