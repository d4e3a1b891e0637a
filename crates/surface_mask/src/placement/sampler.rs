//! Placement sampler: grid candidates, surface lookup and per-descriptor filtering.
//!
//! Every grid position inside the area's footprint is looked up in the
//! [`SurfaceTagStore`]; each surface point within the area's vertical range is a
//! candidate. Descriptors are tried in list order and the first whose effective
//! filter accepts the point claims it, so a point carries at most one instance.
use glam::Vec2;
use tracing::{debug, warn};

use crate::area::{Descriptor, PlantingArea};
use crate::filter::resolve::{resolve, ResolvedFilter};
use crate::placement::events::{
    DescriptorEvaluation, EventSink, PlacementEvent, PlacementEventKind,
};
use crate::placement::{Placement, PlacementResult};
use crate::sampling::{GridSampling, MAX_GRID_POSITIONS};
use crate::surface::{SurfacePoint, SurfaceTagStore};

/// Samples areas against a tag store with a fixed grid.
pub struct PlacementSampler<'a> {
    /// Grid used to generate candidate positions.
    pub grid: &'a GridSampling,
    /// Surfaces queried for tags.
    pub store: &'a SurfaceTagStore,
}

impl<'a> PlacementSampler<'a> {
    pub fn new(grid: &'a GridSampling, store: &'a SurfaceTagStore) -> Self {
        Self { grid, store }
    }

    /// Samples the given area, returning the result.
    pub fn sample(&self, area: &PlantingArea) -> PlacementResult {
        sample(area, self.store, self.grid)
    }

    pub fn sample_with_events(
        &self,
        area: &PlantingArea,
        sink: &mut dyn EventSink,
    ) -> PlacementResult {
        sample_with_events(area, self.store, self.grid, sink)
    }

    /// Candidate surface points of the area, regardless of descriptors.
    pub fn candidate_points(&self, area: &PlantingArea) -> Vec<SurfacePoint> {
        candidate_points(area, self.store, self.grid)
    }
}

pub fn sample(area: &PlantingArea, store: &SurfaceTagStore, grid: &GridSampling) -> PlacementResult {
    sample_with_events(area, store, grid, &mut ())
}

pub fn sample_with_events(
    area: &PlantingArea,
    store: &SurfaceTagStore,
    grid: &GridSampling,
    sink: &mut dyn EventSink,
) -> PlacementResult {
    sample_cancellable(area, store, grid, sink, &|| false).unwrap_or_default()
}

/// Samples the area, polling `should_abort` once per grid row.
///
/// Returns `None` if sampling was abandoned; a partial result is never returned.
pub fn sample_cancellable(
    area: &PlantingArea,
    store: &SurfaceTagStore,
    grid: &GridSampling,
    sink: &mut dyn EventSink,
    should_abort: &dyn Fn() -> bool,
) -> Option<PlacementResult> {
    if area.descriptors().is_empty() {
        warn!("Planting area has no descriptors; skipping.");
        if sink.wants(PlacementEventKind::Warning) {
            sink.send(PlacementEvent::Warning {
                context: "area".into(),
                message: "Planting area has no descriptors".into(),
            });
        }
        return Some(PlacementResult::new());
    }
    if !area.shape.has_footprint() {
        warn!(
            "Planting area footprint {:?} is empty; nothing to place.",
            area.shape.footprint()
        );
        if sink.wants(PlacementEventKind::Warning) {
            sink.send(PlacementEvent::Warning {
                context: "area".into(),
                message: "Planting area footprint is empty".into(),
            });
        }
        return Some(PlacementResult::new());
    }
    let footprint = area.shape.footprint();
    if grid.position_count(footprint).is_none() {
        warn!(
            "Planting area footprint {:?} exceeds {} grid positions at spacing {}; skipping.",
            footprint, MAX_GRID_POSITIONS, grid.spacing
        );
        if sink.wants(PlacementEventKind::Warning) {
            sink.send(PlacementEvent::Warning {
                context: "area".into(),
                message: format!("Planting area exceeds {MAX_GRID_POSITIONS} grid positions"),
            });
        }
        return Some(PlacementResult::new());
    }

    let resolved: Vec<(&Descriptor, ResolvedFilter<'_>)> = area
        .descriptors()
        .iter()
        .map(|d| (d, resolve(area, d)))
        .collect();

    let (cols, rows) = grid.dims(footprint);
    if sink.wants(PlacementEventKind::SampleStarted) {
        sink.send(PlacementEvent::SampleStarted {
            descriptors: resolved.iter().map(|(d, _)| d.id()).collect(),
            grid_dims: (cols, rows),
        });
    }

    let center = area.shape.center.truncate();
    let mut result = PlacementResult::new();

    for (row, row_positions) in grid.rows(footprint).enumerate() {
        if should_abort() {
            debug!(
                "Sampling aborted at row {}/{} after {} candidates.",
                row, rows, result.candidates_evaluated
            );
            if sink.wants(PlacementEventKind::SampleAborted) {
                sink.send(PlacementEvent::SampleAborted {
                    candidates_evaluated: result.candidates_evaluated,
                });
            }
            return None;
        }

        for position in row_positions {
            for point in surface_points_in_area(area, store, position + center) {
                result.candidates_evaluated += 1;
                let claimed = claim(&resolved, &point, sink);
                match claimed {
                    Some(descriptor) => {
                        let placement = Placement {
                            position: point.position,
                            descriptor: descriptor.id(),
                            asset: descriptor.asset.clone(),
                            tags: point.tags,
                        };
                        if sink.wants(PlacementEventKind::PlacementMade) {
                            sink.send(PlacementEvent::PlacementMade {
                                placement: placement.clone(),
                            });
                        }
                        result.placements.push(placement);
                    }
                    None => result.candidates_rejected += 1,
                }
            }
        }
    }

    debug!(
        "Sampled {} candidates on a {}x{} grid: {} placed, {} rejected.",
        result.candidates_evaluated,
        cols,
        rows,
        result.placements.len(),
        result.candidates_rejected
    );
    if sink.wants(PlacementEventKind::SampleFinished) {
        sink.send(PlacementEvent::SampleFinished {
            result: result.clone(),
        });
    }
    Some(result)
}

/// Candidate surface points of the area in sampling order.
///
/// Empty when the footprint is empty or exceeds [`MAX_GRID_POSITIONS`].
pub fn candidate_points(
    area: &PlantingArea,
    store: &SurfaceTagStore,
    grid: &GridSampling,
) -> Vec<SurfacePoint> {
    if !area.shape.has_footprint() {
        return Vec::new();
    }
    let center = area.shape.center.truncate();
    grid.rows(area.shape.footprint())
        .flatten()
        .flat_map(|position| surface_points_in_area(area, store, position + center))
        .collect()
}

fn surface_points_in_area<'a>(
    area: &'a PlantingArea,
    store: &SurfaceTagStore,
    position: Vec2,
) -> impl Iterator<Item = SurfacePoint> + 'a {
    store
        .points_at(position)
        .into_iter()
        .filter(move |p| area.shape.contains_z(p.position.z))
}

/// Returns the first descriptor whose effective filter accepts the point.
fn claim<'a>(
    resolved: &[(&'a Descriptor, ResolvedFilter<'_>)],
    point: &SurfacePoint,
    sink: &mut dyn EventSink,
) -> Option<&'a Descriptor> {
    if !sink.wants(PlacementEventKind::PointEvaluated) {
        return resolved
            .iter()
            .find(|(_, r)| r.filter.evaluate(&point.tags))
            .map(|(d, _)| *d);
    }

    let evaluations: Vec<DescriptorEvaluation> = resolved
        .iter()
        .map(|(d, r)| DescriptorEvaluation::new(d.id(), r.source, r.filter.evaluate(&point.tags)))
        .collect();
    let claimed = resolved
        .iter()
        .zip(&evaluations)
        .find(|(_, e)| e.passed)
        .map(|((d, _), _)| *d);
    sink.send(PlacementEvent::PointEvaluated {
        position: point.position,
        evaluations,
        claimed_by: claimed.map(|d| d.id()),
    });
    claimed
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use glam::Vec3;

    use super::*;
    use crate::filter::resolve::OverrideSource;
    use crate::filter::FilterConfig;
    use crate::placement::events::VecSink;
    use crate::shape::Shape;
    use crate::surface::{BoxSurface, SurfaceTag, SurfaceTagSet};

    const A: SurfaceTag = SurfaceTag::new("test_tag");
    const B: SurfaceTag = SurfaceTag::new("test_tag2");
    const C: SurfaceTag = SurfaceTag::new("test_tag3");

    fn stacked_store() -> SurfaceTagStore {
        let mut store = SurfaceTagStore::new();
        for (z, side, tag) in [(32.0, 16.0, A), (35.0, 12.0, B), (38.0, 8.0, C)] {
            store.register(
                BoxSurface::new(Vec3::new(0.0, 0.0, z), Vec3::new(side, side, 1.0)).with_tags([tag]),
            );
        }
        store
    }

    fn spawner(descriptors: usize) -> PlantingArea {
        PlantingArea::new(Shape::cuboid(Vec3::new(0.0, 0.0, 32.0), 16.0, 16.0, 16.0))
            .with_descriptors((0..descriptors).map(|_| crate::area::Descriptor::new("flower")))
    }

    fn key(p: &Vec3) -> (u32, u32, u32) {
        (p.x.to_bits(), p.y.to_bits(), p.z.to_bits())
    }

    #[test]
    fn pass_all_places_one_instance_per_surface_point() {
        let store = stacked_store();
        let result = sample(&spawner(3), &store, &GridSampling::default());
        assert_eq!(result.len(), 400 + 225 + 100);
        assert_eq!(result.candidates_evaluated, 725);
        assert_eq!(result.candidates_rejected, 0);
        assert_eq!(result.count_for(crate::area::DescriptorId(0)), 725);
    }

    #[test]
    fn inclusion_partitions_surfaces_between_descriptors() {
        let store = stacked_store();
        let mut area = spawner(3).with_per_item_overrides(true);
        for (i, tag) in [A, B, C].into_iter().enumerate() {
            let d = area.descriptor_at_mut(i).expect("descriptor");
            d.set_override_filter(Some(FilterConfig::inclusion([tag])));
            d.set_override_enabled(true);
        }
        let grid = GridSampling::default();
        let result = sample(&area, &store, &grid);

        let candidates: HashSet<_> = candidate_points(&area, &store, &grid)
            .iter()
            .map(|p| key(&p.position))
            .collect();
        let placed: HashSet<_> = result.iter().map(|p| key(&p.position)).collect();
        assert_eq!(placed, candidates);
        assert_eq!(placed.len(), result.len());

        let ids: Vec<_> = area.descriptors().iter().map(|d| d.id()).collect();
        assert_eq!(result.count_for(ids[0]), 400);
        assert_eq!(result.count_for(ids[1]), 225);
        assert_eq!(result.count_for(ids[2]), 100);
        for p in result.iter() {
            let expected = match p.position.z {
                z if z < 33.0 => A,
                z if z < 36.0 => B,
                _ => C,
            };
            assert!(p.tags.contains(expected));
        }
    }

    #[test]
    fn exclusion_of_all_tags_only_plants_on_untagged_points() {
        let mut store = stacked_store();
        store.register(BoxSurface::new(Vec3::new(0.0, 0.0, 26.0), Vec3::new(4.0, 4.0, 1.0)).with_tags(SurfaceTagSet::new()));
        let area = spawner(1).with_global_filter(FilterConfig::exclusion([A, B, C]));

        let result = sample(&area, &store, &GridSampling::default());
        assert_eq!(result.len(), 25);
        assert!(result.iter().all(|p| p.tags.is_empty()));
    }

    #[test]
    fn gated_overrides_do_not_change_result() {
        let store = stacked_store();
        let grid = GridSampling::default();
        let mut area = spawner(2).with_global_filter(FilterConfig::inclusion([B]));
        let before = sample(&area, &store, &grid);

        let d = area.descriptor_at_mut(0).expect("descriptor");
        d.set_override_filter(Some(FilterConfig::inclusion([A])));
        d.set_override_enabled(true);
        assert_eq!(sample(&area, &store, &grid), before);
        assert_eq!(before.len(), 225);
    }

    #[test]
    fn repeated_sampling_is_identical() {
        let store = stacked_store();
        let grid = GridSampling::default();
        let area = spawner(3)
            .with_per_item_overrides(true)
            .with_global_filter(FilterConfig::exclusion([C]));
        assert_eq!(sample(&area, &store, &grid), sample(&area, &store, &grid));
    }

    #[test]
    fn empty_descriptors_or_footprint_yield_zero() {
        let store = stacked_store();
        let grid = GridSampling::default();
        let mut sink = VecSink::new();
        let result = sample_with_events(&spawner(0), &store, &grid, &mut sink);
        assert!(result.is_empty());
        assert!(matches!(sink.as_slice(), [PlacementEvent::Warning { .. }]));

        let mut flat = spawner(1);
        flat.set_shape(Shape::cuboid(Vec3::ZERO, 0.0, 16.0, 16.0));
        assert!(sample(&flat, &store, &grid).is_empty());
        assert!(candidate_points(&flat, &store, &grid).is_empty());
    }

    #[test]
    fn oversized_footprint_yields_zero_with_warning() {
        let store = stacked_store();
        let grid = GridSampling::default();
        let mut huge = spawner(1);
        huge.set_shape(Shape::cuboid(Vec3::new(0.0, 0.0, 32.0), 1e20, 1e20, 16.0));

        let mut sink = VecSink::new();
        let result = sample_with_events(&huge, &store, &grid, &mut sink);
        assert!(result.is_empty());
        assert_eq!(result.candidates_evaluated, 0);
        assert!(matches!(sink.as_slice(), [PlacementEvent::Warning { .. }]));
        assert!(candidate_points(&huge, &store, &grid).is_empty());
    }

    #[test]
    fn jittered_placements_are_counted_by_their_own_area() {
        let store = stacked_store();
        for seed in 0..16 {
            let grid = GridSampling::default().with_jitter(1.0, seed);
            let area = spawner(1);
            let result = sample(&area, &store, &grid);
            assert!(!result.is_empty());
            assert_eq!(result.count_in(&area.shape), result.len(), "seed {seed}");
        }
    }

    #[test]
    fn points_outside_vertical_range_are_ignored() {
        let store = stacked_store();
        let mut area = spawner(1);
        area.set_shape(Shape::cuboid(Vec3::new(0.0, 0.0, 35.5), 16.0, 16.0, 2.0));
        let result = sample(&area, &store, &GridSampling::default());
        assert_eq!(result.len(), 225);
    }

    #[test]
    fn events_report_claims_and_sources() {
        let store = stacked_store();
        let mut area = spawner(2)
            .with_per_item_overrides(true)
            .with_global_filter(FilterConfig::inclusion([C]));
        let d = area.descriptor_at_mut(1).expect("descriptor");
        *d = d.clone().with_override(FilterConfig::inclusion([A]));

        let mut sink = VecSink::only([
            PlacementEventKind::PointEvaluated,
            PlacementEventKind::SampleFinished,
        ]);
        let result = sample_with_events(&area, &store, &GridSampling::default(), &mut sink);
        assert_eq!(result.len(), 500);

        let events = sink.into_inner();
        let evaluated = events
            .iter()
            .filter(|e| matches!(e, PlacementEvent::PointEvaluated { .. }))
            .count();
        assert_eq!(evaluated, 725);
        let sources: HashSet<_> = events
            .iter()
            .filter_map(|e| match e {
                PlacementEvent::PointEvaluated { evaluations, .. } => {
                    Some(evaluations.iter().map(|ev| ev.source).collect::<Vec<_>>())
                }
                _ => None,
            })
            .collect();
        assert!(sources.contains(&vec![OverrideSource::Global, OverrideSource::Descriptor]));
        assert!(matches!(events.last(), Some(PlacementEvent::SampleFinished { .. })));
    }

    #[test]
    fn abort_returns_none() {
        let store = stacked_store();
        let mut sink = VecSink::new();
        let result = sample_cancellable(
            &spawner(1),
            &store,
            &GridSampling::default(),
            &mut sink,
            &|| true,
        );
        assert!(result.is_none());
        assert!(sink
            .as_slice()
            .iter()
            .any(|e| matches!(e, PlacementEvent::SampleAborted { .. })));
    }
}
