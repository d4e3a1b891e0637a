//! Composition of surface providers.
use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::error::{Error, Result};
use crate::surface::{SurfacePoint, SurfaceProvider, SurfaceTagSet};

/// Handle for a registered surface provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Registry of surface providers answering tag queries.
#[derive(Default)]
pub struct SurfaceTagStore {
    providers: Vec<(SurfaceId, Arc<dyn SurfaceProvider>)>,
    next_id: u64,
}

impl SurfaceTagStore {
    /// Provider points closer than this in elevation are treated as one surface point.
    pub const ELEVATION_TOLERANCE: f32 = 1e-3;

    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers a provider, returning its handle.
    pub fn register<P: SurfaceProvider + 'static>(&mut self, provider: P) -> SurfaceId {
        self.register_arc(Arc::new(provider))
    }

    /// Registers a shared provider, returning its handle.
    pub fn register_arc(&mut self, provider: Arc<dyn SurfaceProvider>) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.providers.push((id, provider));
        debug!("Registered surface provider {:?}.", id);
        id
    }

    /// Removes a provider. Points it covered lose its tags from then on.
    pub fn unregister(&mut self, id: SurfaceId) -> Result<()> {
        let before = self.providers.len();
        self.providers.retain(|(pid, _)| *pid != id);
        if self.providers.len() == before {
            return Err(Error::UnknownSurface { id });
        }
        debug!("Unregistered surface provider {:?}.", id);
        Ok(())
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.providers.iter().any(|(pid, _)| *pid == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn clear(&mut self) {
        self.providers.clear();
    }

    /// Returns every surface point above `position`, ordered by elevation.
    ///
    /// Points from different providers that coincide in elevation are merged and their
    /// tags unioned.
    pub fn points_at(&self, position: Vec2) -> Vec<SurfacePoint> {
        let mut provided: Vec<_> = self
            .providers
            .iter()
            .flat_map(|(_, p)| p.points_at(position.into()))
            .filter(|p| p.elevation.is_finite())
            .collect();
        provided.sort_by(|a, b| a.elevation.total_cmp(&b.elevation));

        let mut points: Vec<SurfacePoint> = Vec::with_capacity(provided.len());
        for p in provided {
            match points.last_mut() {
                Some(last) if (p.elevation - last.position.z).abs() <= Self::ELEVATION_TOLERANCE => {
                    last.tags.union_with(&p.tags);
                }
                _ => points.push(SurfacePoint::new(position.extend(p.elevation), p.tags)),
            }
        }
        points
    }

    /// Returns the tags emitted at `point`. Uncovered points yield an empty set.
    pub fn tags_at(&self, point: Vec3) -> SurfaceTagSet {
        let mut tags = SurfaceTagSet::new();
        for (_, provider) in &self.providers {
            for p in provider.points_at(point.truncate().into()) {
                if (p.elevation - point.z).abs() <= Self::ELEVATION_TOLERANCE {
                    tags.union_with(&p.tags);
                }
            }
        }
        tags
    }
}

impl std::fmt::Debug for SurfaceTagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTagStore")
            .field(
                "providers",
                &self.providers.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{BoxSurface, SurfaceTag};

    fn surface(z: f32, side: f32, tag: &str) -> BoxSurface {
        BoxSurface::new(Vec3::new(0.0, 0.0, z), Vec3::new(side, side, 1.0))
            .with_tags([SurfaceTag::new(tag)])
    }

    #[test]
    fn stacked_surfaces_yield_distinct_points() {
        let mut store = SurfaceTagStore::new();
        store.register(surface(32.0, 16.0, "a"));
        store.register(surface(38.0, 8.0, "c"));
        store.register(surface(35.0, 12.0, "b"));

        let points = store.points_at(Vec2::ZERO);
        let elevations: Vec<_> = points.iter().map(|p| p.position.z).collect();
        assert_eq!(elevations, vec![32.5, 35.5, 38.5]);
        assert!(points[1].tags.contains(SurfaceTag::new("b")));

        let edge = store.points_at(Vec2::new(-7.0, -7.0));
        assert_eq!(edge.len(), 1);
    }

    #[test]
    fn coincident_surfaces_accumulate_tags() {
        let mut store = SurfaceTagStore::new();
        store.register(surface(0.0, 4.0, "grass"));
        store.register(surface(0.0, 2.0, "flowers"));

        let points = store.points_at(Vec2::ZERO);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].tags.len(), 2);

        let tags = store.tags_at(Vec3::new(0.0, 0.0, 0.5));
        assert!(tags.contains(SurfaceTag::new("grass")));
        assert!(tags.contains(SurfaceTag::new("flowers")));
        assert!(store.tags_at(Vec3::new(0.0, 0.0, 3.0)).is_empty());
    }

    #[test]
    fn unregistered_surface_stops_emitting() {
        let mut store = SurfaceTagStore::new();
        let id = store.register(surface(0.0, 4.0, "grass"));
        assert!(store.contains(id));
        store.unregister(id).expect("registered");

        assert!(store.points_at(Vec2::ZERO).is_empty());
        assert!(store.tags_at(Vec3::new(0.0, 0.0, 0.5)).is_empty());
        assert!(matches!(
            store.unregister(id),
            Err(Error::UnknownSurface { .. })
        ));
    }
}
