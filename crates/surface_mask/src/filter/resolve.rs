//! Effective filter resolution for descriptors.
//!
//! A descriptor's own override only applies when its area allows per-item overrides
//! and the override is both enabled and set. Otherwise the area's global filter
//! applies. Nothing is cached here; callers resolve again after every change.
use crate::area::{Descriptor, PlantingArea};
use crate::filter::FilterConfig;

/// Where an effective filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideSource {
    Global,
    Descriptor,
}

/// Effective filter of a descriptor together with its origin.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFilter<'a> {
    pub filter: &'a FilterConfig,
    pub source: OverrideSource,
}

pub fn resolve<'a>(area: &'a PlantingArea, descriptor: &'a Descriptor) -> ResolvedFilter<'a> {
    if area.allow_per_item_overrides && descriptor.override_enabled {
        if let Some(filter) = descriptor.override_filter.as_ref() {
            return ResolvedFilter {
                filter,
                source: OverrideSource::Descriptor,
            };
        }
    }
    ResolvedFilter {
        filter: &area.global_filter,
        source: OverrideSource::Global,
    }
}

/// Returns the filter actually applied to `descriptor`.
#[inline]
pub fn effective_filter<'a>(area: &'a PlantingArea, descriptor: &'a Descriptor) -> &'a FilterConfig {
    resolve(area, descriptor).filter
}
