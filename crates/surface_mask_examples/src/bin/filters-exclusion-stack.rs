use glam::Vec3;
use surface_mask::prelude::*;
use surface_mask_examples::{init_tracing, print_summary, render_top_down, TopDownConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let road = SurfaceTag::new("road");
    let water = SurfaceTag::new("water");
    let meadow = SurfaceTag::new("meadow");

    let mut store = SurfaceTagStore::new();
    store.register(BoxSurface::new(Vec3::ZERO, Vec3::new(24.0, 24.0, 1.0)).with_tags([meadow]));
    // Thin strips sitting exactly on the meadow share its surface points and add their tags.
    store.register(BoxSurface::new(Vec3::ZERO, Vec3::new(3.2, 24.0, 1.0)).with_tags([road]));
    store.register(
        BoxSurface::new(Vec3::new(6.0, 6.0, 0.0), Vec3::new(6.4, 6.4, 1.0)).with_tags([water]),
    );

    let area = PlantingArea::new(Shape::cuboid(Vec3::ZERO, 24.0, 24.0, 4.0))
        .with_global_filter(FilterConfig::exclusion([road, water]))
        .with_per_item_overrides(true)
        .with_descriptors([
            Descriptor::new("Reeds").with_override(FilterConfig::inclusion([water])),
            Descriptor::new("Flowers"),
        ]);

    let mut sink = VecSink::only([PlacementEventKind::Warning, PlacementEventKind::SampleFinished]);
    let result = sample_with_events(&area, &store, &GridSampling::default(), &mut sink);
    info!("{} events collected", sink.len());
    print_summary("meadow with road and pond", &area, &result);

    let config = TopDownConfig::default().with_glyphs(['~', '*']);
    println!("{}", render_top_down(&area, &result, &config));
    Ok(())
}
