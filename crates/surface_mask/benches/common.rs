#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec3;
use surface_mask::area::{Descriptor, PlantingArea};
use surface_mask::filter::FilterConfig;
use surface_mask::shape::Shape;
use surface_mask::surface::{BoxSurface, SurfaceTag, SurfaceTagStore};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub const LAYER_TAGS: [&str; 4] = ["moss", "sand", "rock", "grass"];

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Square surfaces of side `side` stacked 2 units apart, one per entry of [`LAYER_TAGS`].
pub fn layered_store(side: f32) -> SurfaceTagStore {
    let mut store = SurfaceTagStore::new();
    for (i, tag) in LAYER_TAGS.iter().enumerate() {
        store.register(
            BoxSurface::new(Vec3::Z * (2.0 * i as f32), Vec3::new(side, side, 1.0))
                .with_tags([SurfaceTag::new(tag)]),
        );
    }
    store
}

/// Area covering every layer of [`layered_store`], one inclusion override per layer.
pub fn layered_area(side: f32) -> PlantingArea {
    let height = 2.0 * LAYER_TAGS.len() as f32 + 2.0;
    PlantingArea::new(Shape::cuboid(Vec3::Z * (height * 0.5 - 1.0), side, side, height))
        .with_per_item_overrides(true)
        .with_descriptors(LAYER_TAGS.iter().map(|tag| {
            Descriptor::new(*tag).with_override(FilterConfig::inclusion([SurfaceTag::new(tag)]))
        }))
}
