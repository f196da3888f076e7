//! Layer box geometry and the trim mutation
//!
//! A box slides along a single horizontal axis and is trimmed against the
//! layer below it when dropped. Width is the x extent, depth the z extent;
//! height is the same fixed constant for every layer.

use glam::Vec3;

use crate::consts::BOX_HEIGHT;

/// Horizontal axis a layer slides (and gets trimmed) along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    /// The axis the next layer slides along
    pub fn flip(self) -> Self {
        match self {
            Axis::X => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// Component of `v` along this axis
    #[inline]
    pub fn of(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Z => v.z,
        }
    }
}

/// A game-authoritative layer box
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Center of the box; y is discretized by layer height
    pub position: Vec3,
    /// Extent along x
    pub width: f32,
    /// Extent along z
    pub depth: f32,
    /// Slide/trim axis; `None` only for the immovable foundation
    pub direction: Option<Axis>,
}

impl Block {
    pub fn new(x: f32, y: f32, z: f32, width: f32, depth: f32, direction: Option<Axis>) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            width,
            depth,
            direction,
        }
    }

    /// Extent along the given axis
    pub fn size_along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Z => self.depth,
        }
    }

    /// Center coordinate along the given axis
    pub fn coord(&self, axis: Axis) -> f32 {
        axis.of(self.position)
    }

    pub fn set_coord(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.position.x = value,
            Axis::Z => self.position.z = value,
        }
    }

    /// Half extents of the full box, for collider shapes
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width / 2.0, BOX_HEIGHT / 2.0, self.depth / 2.0)
    }

    /// Shrink the box to the surviving overlap after a drop.
    ///
    /// The dimension along `axis` becomes `overlap` and the center shifts by
    /// `-delta / 2`, recentering the box over the retained region. The
    /// orthogonal dimension is untouched. Caller guarantees `overlap > 0`;
    /// a non-positive overlap is the miss branch, not a trim.
    pub fn trim(&mut self, axis: Axis, overlap: f32, delta: f32) {
        match axis {
            Axis::X => self.width = overlap,
            Axis::Z => self.depth = overlap,
        }
        let center = self.coord(axis) - delta / 2.0;
        self.set_coord(axis, center);
    }
}
