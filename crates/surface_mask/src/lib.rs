#![forbid(unsafe_code)]
//! surface_mask: Tag-driven vegetation placement eligibility.
//!
//! Modules:
//! - surface: surface tags, tag sets, surface providers and the tag store
//! - filter: inclusion/exclusion surface mask filters and per-descriptor override resolution
//! - area: planting areas and their descriptor lists
//! - sampling: grid candidate generation
//! - placement: sampling areas into placements, events and sinks
//! - cache: background-recomputed placement results with generation tracking
//!
//! For examples, see the `surface_mask_examples` crate.
pub mod area;
pub mod cache;
pub mod error;
pub mod filter;
pub mod placement;
pub mod sampling;
pub mod shape;
pub mod surface;

/// Convenient re-exports for common types. Import with `use surface_mask::prelude::*;`.
pub mod prelude {
    pub use crate::area::{AssetRef, Descriptor, DescriptorId, PlantingArea};
    pub use crate::cache::{AreaId, CacheConfig, CacheEvent, Generation, PlacementCache};
    pub use crate::error::{Error, Result};
    pub use crate::filter::resolve::{effective_filter, resolve, OverrideSource, ResolvedFilter};
    pub use crate::filter::{FilterConfig, FilterMode};
    pub use crate::placement::events::{
        ChannelSink, DescriptorEvaluation, EventSink, FnSink, MultiSink, PlacementEvent,
        PlacementEventKind, VecSink,
    };
    pub use crate::placement::sampler::{
        candidate_points, sample, sample_cancellable, sample_with_events, PlacementSampler,
    };
    pub use crate::placement::{Placement, PlacementResult};
    pub use crate::sampling::{
        GridSampling, PositionSampling, DEFAULT_GRID_SPACING, MAX_GRID_POSITIONS,
    };
    pub use crate::shape::Shape;
    pub use crate::surface::{
        BoxSurface, ProvidedPoint, SurfaceId, SurfacePoint, SurfaceProvider, SurfaceTag,
        SurfaceTagSet, SurfaceTagStore,
    };
}
