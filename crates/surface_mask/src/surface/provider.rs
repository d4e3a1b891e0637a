//! Surface provider trait and the built-in box surface.
use glam::{Vec2, Vec3};
use mint::Vector2;

use crate::shape::Shape;
use crate::surface::{SurfaceTag, SurfaceTagSet};

/// Elevation and tags a provider emits above a planar position.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidedPoint {
    pub elevation: f32,
    pub tags: SurfaceTagSet,
}

impl ProvidedPoint {
    pub fn new(elevation: f32, tags: SurfaceTagSet) -> Self {
        Self { elevation, tags }
    }
}

/// Trait for surface providers.
///
/// A provider returns zero or more points above `position`; an empty vector means the
/// provider does not cover it.
pub trait SurfaceProvider: Send + Sync {
    fn points_at(&self, position: Vector2<f32>) -> Vec<ProvidedPoint>;
}

/// Box-shaped planting surface that emits its tags on its top face.
#[derive(Debug, Clone)]
pub struct BoxSurface {
    pub shape: Shape,
    pub tags: SurfaceTagSet,
}

impl BoxSurface {
    /// Surface box without configured tags; it emits [`SurfaceTag::UNASSIGNED`].
    pub fn new(center: Vec3, extent: Vec3) -> Self {
        Self {
            shape: Shape::new(center, extent),
            tags: SurfaceTagSet::single(SurfaceTag::UNASSIGNED),
        }
    }

    /// Replaces the generated tags.
    pub fn with_tags(mut self, tags: impl Into<SurfaceTagSet>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn top(&self) -> f32 {
        self.shape.max().z
    }
}

impl SurfaceProvider for BoxSurface {
    fn points_at(&self, position: Vector2<f32>) -> Vec<ProvidedPoint> {
        if !self.shape.contains_xy(Vec2::from(position)) {
            return Vec::new();
        }
        vec![ProvidedPoint::new(self.top(), self.tags.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_surface_emits_top_face_inside_footprint() {
        let surface = BoxSurface::new(Vec3::new(0.0, 0.0, 32.0), Vec3::new(16.0, 16.0, 1.0))
            .with_tags([SurfaceTag::new("test_tag")]);

        let points = surface.points_at(Vec2::new(-8.0, 7.5).into());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].elevation, 32.5);
        assert!(points[0].tags.contains(SurfaceTag::new("test_tag")));

        assert!(surface.points_at(Vec2::new(8.0, 0.0).into()).is_empty());
    }

    #[test]
    fn untagged_surface_emits_unassigned() {
        let surface = BoxSurface::new(Vec3::ZERO, Vec3::ONE);
        let points = surface.points_at(Vec2::ZERO.into());
        assert!(points[0].tags.contains(SurfaceTag::UNASSIGNED));
    }
}
