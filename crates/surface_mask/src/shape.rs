//! Axis-aligned box shapes used for planting areas, surfaces and count queries.
use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slack applied to box bounds so grid positions landing exactly on an edge are
/// classified consistently despite float rounding.
pub const CONTAINMENT_TOLERANCE: f32 = 1e-3;

/// Axis-aligned box given by its center and full side lengths.
///
/// Containment is half-open per axis: a point on the minimum face is inside, a point
/// on the maximum face is not. Adjacent boxes therefore never both claim a point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    pub center: Vec3,
    pub extent: Vec3,
}

impl Shape {
    pub fn new(center: Vec3, extent: Vec3) -> Self {
        Self { center, extent }
    }

    /// Box with side lengths `x`, `y`, `z` centered at `center`.
    pub fn cuboid(center: Vec3, x: f32, y: f32, z: f32) -> Self {
        Self::new(center, Vec3::new(x, y, z))
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extent * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extent * 0.5
    }

    /// Planar (XY) extent of the box.
    pub fn footprint(&self) -> Vec2 {
        self.extent.truncate()
    }

    /// Returns `true` if the box has a positive, finite planar area.
    pub fn has_footprint(&self) -> bool {
        let f = self.footprint();
        f.is_finite() && f.x > 0.0 && f.y > 0.0
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.contains_xy(point.truncate()) && self.contains_z(point.z)
    }

    /// Planar containment, ignoring elevation.
    pub fn contains_xy(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        within(point.x, min.x, max.x) && within(point.y, min.y, max.y)
    }

    pub fn contains_z(&self, z: f32) -> bool {
        within(z, self.min().z, self.max().z)
    }
}

#[inline]
fn within(v: f32, min: f32, max: f32) -> bool {
    v >= min - CONTAINMENT_TOLERANCE && v < max - CONTAINMENT_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_half_open() {
        let shape = Shape::cuboid(Vec3::ZERO, 8.0, 8.0, 2.0);
        assert!(shape.contains(Vec3::new(-4.0, -4.0, 0.0)));
        assert!(!shape.contains(Vec3::new(4.0, 0.0, 0.0)));
        assert!(!shape.contains(Vec3::new(0.0, 4.0, 0.0)));
        assert!(shape.contains(Vec3::new(3.99, 3.99, 0.99)));
        assert!(!shape.contains(Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn footprint_requires_positive_extent() {
        assert!(Shape::cuboid(Vec3::ZERO, 1.0, 1.0, 0.0).has_footprint());
        assert!(!Shape::cuboid(Vec3::ZERO, 0.0, 1.0, 1.0).has_footprint());
        assert!(!Shape::cuboid(Vec3::ZERO, 1.0, f32::NAN, 1.0).has_footprint());
    }

    #[test]
    fn bounds_follow_center() {
        let shape = Shape::cuboid(Vec3::new(512.0, 512.0, 32.0), 16.0, 16.0, 16.0);
        assert_eq!(shape.min(), Vec3::new(504.0, 504.0, 24.0));
        assert_eq!(shape.max(), Vec3::new(520.0, 520.0, 40.0));
    }
}
