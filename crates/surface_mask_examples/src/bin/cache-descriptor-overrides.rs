use std::time::Duration;

use anyhow::{bail, Context};
use glam::Vec3;
use surface_mask::prelude::*;
use surface_mask_examples::{init_tracing, print_summary, render_top_down, TopDownConfig};
use tracing::info;

const WAIT: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    init_tracing();

    let center = Vec3::new(512.0, 512.0, 32.0);
    let tags = [
        SurfaceTag::new("test_tag"),
        SurfaceTag::new("test_tag2"),
        SurfaceTag::new("test_tag3"),
    ];

    // Three surfaces stacked 3 units apart, shrinking towards the top.
    let mut store = SurfaceTagStore::new();
    for (i, (side, tag)) in [16.0, 12.0, 8.0].into_iter().zip(tags).enumerate() {
        store.register(
            BoxSurface::new(center + Vec3::Z * (3.0 * i as f32), Vec3::new(side, side, 1.0))
                .with_tags([tag]),
        );
    }

    let cache = PlacementCache::with_store(CacheConfig::new().with_events(true), store)?;
    let query = Shape::cuboid(center, 16.0, 16.0, 16.0);
    let id = cache.insert_area(PlantingArea::new(query).with_descriptors([
        Descriptor::new("PurpleFlower"),
        Descriptor::new("PinkFlower"),
        Descriptor::new("Grass"),
    ]));
    expect_count(&cache, id, &query, 725, "no overrides")?;

    let area = cache.area(id).context("area was just inserted")?;
    let ids: Vec<DescriptorId> = area.descriptors().iter().map(Descriptor::id).collect();
    cache.update_area(id, |area| {
        area.set_allow_per_item_overrides(true);
        area.descriptor_mut(ids[0])?
            .set_override_filter(Some(FilterConfig::inclusion([tags[0]])));
        area.descriptor_mut(ids[0])?.set_override_enabled(true);
        for &other in &ids[1..] {
            let d = area.descriptor_mut(other)?;
            d.set_override_filter(Some(FilterConfig::exclusion(tags)));
            d.set_override_enabled(true);
        }
        Ok(())
    })?;
    expect_count(&cache, id, &query, 400, "descriptor 0 includes test_tag")?;

    for (tag, expected, label) in [
        (tags[1], 225, "descriptor 0 includes test_tag2"),
        (tags[2], 100, "descriptor 0 includes test_tag3"),
    ] {
        cache.update_area(id, |area| {
            area.descriptor_mut(ids[0])?
                .override_filter_mut()
                .set_tags([tag]);
            Ok(())
        })?;
        expect_count(&cache, id, &query, expected, label)?;
    }

    if let Some(events) = cache.events() {
        info!("{} cache events recorded", events.try_iter().count());
    }
    Ok(())
}

fn expect_count(
    cache: &PlacementCache,
    id: AreaId,
    query: &Shape,
    expected: usize,
    label: &str,
) -> anyhow::Result<()> {
    if !cache.wait_for_instance_count(id, query, expected, WAIT) {
        bail!(
            "{label}: expected {expected} placements, found {}",
            cache.get_instance_count(id, query)
        );
    }
    let area = cache.area(id).context("area removed")?;
    let result = cache.result(id).context("area removed")?;
    print_summary(label, &area, &result);
    println!("{}", render_top_down(&area, &result, &TopDownConfig::default()));
    Ok(())
}
