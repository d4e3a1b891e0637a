//! Surface tag store: which tags surfaces emit at which points.
//!
//! Surfaces are pluggable [`SurfaceProvider`]s registered with a [`SurfaceTagStore`].
//! The store composes them: for a planar position it collects every provider's points,
//! merges points that coincide in elevation (tags accumulate, no provider priority)
//! and keeps stacked surfaces at different elevations as distinct [`SurfacePoint`]s.
use glam::Vec3;

mod provider;
mod store;
mod tag;

pub use provider::{BoxSurface, ProvidedPoint, SurfaceProvider};
pub use store::{SurfaceId, SurfaceTagStore};
pub use tag::{SurfaceTag, SurfaceTagSet};

/// A point on a surface together with every tag emitted there.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub tags: SurfaceTagSet,
}

impl SurfacePoint {
    pub fn new(position: Vec3, tags: SurfaceTagSet) -> Self {
        Self { position, tags }
    }
}
