//! Placement results and the sampler that produces them.
use glam::Vec3;

use crate::area::{AssetRef, DescriptorId};
use crate::shape::Shape;
use crate::surface::SurfaceTagSet;

pub mod events;
pub mod sampler;

/// An accepted `(surface point, descriptor)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Surface point the instance is planted on.
    pub position: Vec3,
    /// Descriptor that claimed the point.
    pub descriptor: DescriptorId,
    /// Asset of the claiming descriptor.
    pub asset: AssetRef,
    /// Tags emitted at the point.
    pub tags: SurfaceTagSet,
}

/// Accepted placements of one planting area, computed as a unit.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementResult {
    /// Placements in grid order (row-major, then elevation).
    pub placements: Vec<Placement>,
    /// Total candidate points evaluated.
    pub candidates_evaluated: usize,
    /// Candidate points no descriptor accepted.
    pub candidates_rejected: usize,
}

impl PlacementResult {
    /// Creates a new empty [`PlacementResult`].
    pub fn new() -> Self {
        Self {
            placements: Vec::new(),
            candidates_evaluated: 0,
            candidates_rejected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of placements whose point lies within `shape`.
    pub fn count_in(&self, shape: &Shape) -> usize {
        self.placements
            .iter()
            .filter(|p| shape.contains(p.position))
            .count()
    }

    /// Number of placements claimed by `descriptor`.
    pub fn count_for(&self, descriptor: DescriptorId) -> usize {
        self.placements
            .iter()
            .filter(|p| p.descriptor == descriptor)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(x: f32, descriptor: u32) -> Placement {
        Placement {
            position: Vec3::new(x, 0.0, 0.5),
            descriptor: DescriptorId(descriptor),
            asset: "a".into(),
            tags: SurfaceTagSet::new(),
        }
    }

    #[test]
    fn counts_filter_by_shape_and_descriptor() {
        let result = PlacementResult {
            placements: vec![placement(0.0, 0), placement(1.0, 1), placement(5.0, 1)],
            candidates_evaluated: 4,
            candidates_rejected: 1,
        };

        let query = Shape::cuboid(Vec3::ZERO, 4.0, 4.0, 4.0);
        assert_eq!(result.count_in(&query), 2);
        assert_eq!(result.count_for(DescriptorId(1)), 2);
        assert_eq!(result.len(), 3);
        assert!(PlacementResult::new().is_empty());
    }
}
