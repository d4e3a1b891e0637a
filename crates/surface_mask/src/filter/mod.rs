//! Surface mask filters: tag-set predicates deciding whether a point is plantable.
//!
//! - [`FilterConfig`] pairs a [`FilterMode`] with a tag set.
//! - [`evaluate`] is the pure predicate applied per surface point.
//! - [`resolve`] picks the effective filter of a descriptor inside a planting area.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::surface::{SurfaceTag, SurfaceTagSet};

pub mod resolve;

/// How a filter's tags are matched against a point's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterMode {
    /// Pass if the point carries at least one of the tags.
    Inclusion,
    /// Pass if the point carries none of the tags.
    #[default]
    Exclusion,
}

/// Surface mask filter configuration.
///
/// An empty tag set matches nothing under [`FilterMode::Inclusion`] and everything
/// under [`FilterMode::Exclusion`]; the default filter is therefore pass-all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterConfig {
    pub mode: FilterMode,
    pub tags: SurfaceTagSet,
}

impl FilterConfig {
    pub fn new(mode: FilterMode, tags: impl Into<SurfaceTagSet>) -> Self {
        Self {
            mode,
            tags: tags.into(),
        }
    }

    pub fn inclusion(tags: impl Into<SurfaceTagSet>) -> Self {
        Self::new(FilterMode::Inclusion, tags)
    }

    pub fn exclusion(tags: impl Into<SurfaceTagSet>) -> Self {
        Self::new(FilterMode::Exclusion, tags)
    }

    /// Exclusion filter with no tags; passes every point.
    pub fn pass_all() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn set_tags(&mut self, tags: impl Into<SurfaceTagSet>) {
        self.tags = tags.into();
    }

    pub fn add_tag(&mut self, tag: impl Into<SurfaceTag>) {
        self.tags.insert(tag);
    }

    /// Applies this filter to a point's tags.
    #[inline]
    pub fn evaluate(&self, point_tags: &SurfaceTagSet) -> bool {
        evaluate(point_tags, self)
    }
}

/// Returns whether a point carrying `point_tags` passes `filter`.
#[inline]
pub fn evaluate(point_tags: &SurfaceTagSet, filter: &FilterConfig) -> bool {
    let matched = point_tags.intersects(&filter.tags);
    match filter.mode {
        FilterMode::Inclusion => matched,
        FilterMode::Exclusion => !matched,
    }
}
