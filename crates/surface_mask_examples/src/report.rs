use std::collections::BTreeMap;

use surface_mask::area::{DescriptorId, PlantingArea};
use surface_mask::placement::PlacementResult;
use surface_mask::sampling::GridSampling;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a compact `fmt` subscriber, honoring `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Logs total and per-descriptor placement counts.
pub fn print_summary(label: &str, area: &PlantingArea, result: &PlacementResult) {
    info!(
        "{label}: {} placements ({} candidates, {} rejected)",
        result.len(),
        result.candidates_evaluated,
        result.candidates_rejected
    );
    for d in area.descriptors() {
        info!("  {:?} {:<12} {}", d.id(), d.asset, result.count_for(d.id()));
    }
}

/// Glyphs and grid used by [`render_top_down`].
#[derive(Debug, Clone)]
pub struct TopDownConfig {
    pub grid: GridSampling,
    /// Glyph per descriptor, cycled by list position.
    pub glyphs: Vec<char>,
    pub empty: char,
}

impl Default for TopDownConfig {
    fn default() -> Self {
        Self {
            grid: GridSampling::default(),
            glyphs: vec!['a', 'b', 'c', 'd', 'e'],
            empty: '.',
        }
    }
}

impl TopDownConfig {
    pub fn with_glyphs(mut self, glyphs: impl IntoIterator<Item = char>) -> Self {
        self.glyphs = glyphs.into_iter().collect();
        self
    }
}

/// Renders the highest placement of every grid cell as one character, north row first.
pub fn render_top_down(
    area: &PlantingArea,
    result: &PlacementResult,
    config: &TopDownConfig,
) -> String {
    let (cols, rows) = config.grid.dims(area.shape.footprint());
    let spacing = config.grid.spacing;
    let min = area.shape.min();

    let glyph_of: BTreeMap<DescriptorId, char> = area
        .descriptors()
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let glyph = if config.glyphs.is_empty() {
                '#'
            } else {
                config.glyphs[i % config.glyphs.len()]
            };
            (d.id(), glyph)
        })
        .collect();

    let mut cells: Vec<Option<(f32, char)>> = vec![None; cols * rows];
    for p in result.iter() {
        let i = ((p.position.x - min.x) / spacing).round() as isize;
        let j = ((p.position.y - min.y) / spacing).round() as isize;
        if i < 0 || j < 0 || i as usize >= cols || j as usize >= rows {
            continue;
        }
        let cell = &mut cells[j as usize * cols + i as usize];
        let glyph = glyph_of.get(&p.descriptor).copied().unwrap_or('?');
        if cell.is_none_or(|(z, _)| p.position.z > z) {
            *cell = Some((p.position.z, glyph));
        }
    }

    let mut out = String::with_capacity((cols + 1) * rows);
    for j in (0..rows).rev() {
        for i in 0..cols {
            out.push(cells[j * cols + i].map_or(config.empty, |(_, g)| g));
        }
        out.push('\n');
    }
    out
}
