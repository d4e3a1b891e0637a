use glam::Vec3;
use surface_mask::prelude::*;
use surface_mask_examples::{init_tracing, print_summary};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut store = SurfaceTagStore::new();
    store.register(
        BoxSurface::new(Vec3::new(0.0, 0.0, -0.5), Vec3::new(64.0, 64.0, 1.0))
            .with_tags([SurfaceTag::new("ground")]),
    );

    // Candidates per axis are floor(side / spacing); partial cells are dropped.
    for spacing in [DEFAULT_GRID_SPACING, 1.0, 2.0] {
        let grid = GridSampling::new(spacing);
        grid.validate()?;
        for side in [8.0, 12.0, 16.0, 16.5] {
            let area = PlantingArea::new(Shape::cuboid(Vec3::ZERO, side, side, 2.0))
                .with_descriptor(Descriptor::new("Grass"));
            let result = sample(&area, &store, &grid);
            info!(
                "spacing {spacing:.1}, side {side:>4.1}: {} per axis",
                grid.count_along(side)
            );
            print_summary(&format!("{side}x{side}"), &area, &result);
        }
    }

    // Jitter keeps the count and only moves positions within their cells.
    let area = PlantingArea::new(Shape::cuboid(Vec3::ZERO, 16.0, 16.0, 2.0))
        .with_descriptor(Descriptor::new("Grass"));
    let jittered = GridSampling::default().with_jitter(0.75, 7);
    let result = PlacementSampler::new(&jittered, &store).sample(&area);
    print_summary("jittered 16x16", &area, &result);
    Ok(())
}
