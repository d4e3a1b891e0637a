//! Fixed-spacing grid position sampling.
use glam::Vec2;
use mint::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::sampling::{next_down, rand01, PositionSampling};
use crate::shape::CONTAINMENT_TOLERANCE;

/// Default distance between neighbouring grid positions, in world units.
pub const DEFAULT_GRID_SPACING: f32 = 0.8;

/// Upper bound on positions generated for one domain. Larger domains are rejected
/// instead of sampled; at the default spacing this is a square of about 3.2 km.
pub const MAX_GRID_POSITIONS: usize = 1 << 24;

/// Slack added before flooring `extent / spacing`, so exact multiples that are not
/// representable in binary (e.g. `12.0 / 0.8`) still count fully.
const COUNT_EPSILON: f64 = 1e-4;

/// Regular grid sampling with cell-origin positions.
///
/// A domain of extent `e` gets `floor(e / spacing)` positions per axis at
/// `-e/2 + i * spacing`; remainders are dropped, so shrinking a domain never adds
/// positions.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSampling {
    /// Distance between neighbouring positions.
    pub spacing: f32,
    /// Jitter amount in [0, 1], as a fraction of the spacing. 0 keeps exact cell origins.
    pub jitter: f32,
    /// Seed for the jitter sequence.
    pub seed: u64,
}

impl Default for GridSampling {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_GRID_SPACING,
            jitter: 0.0,
            seed: 0,
        }
    }
}

impl GridSampling {
    /// Create a new grid with the given spacing and no jitter.
    pub fn new(spacing: f32) -> Self {
        Self {
            spacing,
            ..Default::default()
        }
    }

    /// Sets the jitter amount (clamped to 0.0 to 1.0) and its seed.
    pub fn with_jitter(mut self, jitter: f32, seed: u64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self.seed = seed;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "grid spacing must be finite and > 0 (got {})",
                self.spacing
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(Error::InvalidConfig("grid jitter must be in [0, 1]".into()));
        }
        Ok(())
    }

    /// Number of positions along an axis of length `extent`.
    pub fn count_along(&self, extent: f32) -> usize {
        if !extent.is_finite() || extent <= 0.0 || !self.spacing.is_finite() || self.spacing <= 0.0
        {
            return 0;
        }
        // `as` saturates, so huge extents clamp to `usize::MAX` instead of wrapping.
        (extent as f64 / self.spacing as f64 + COUNT_EPSILON).floor() as usize
    }

    /// Number of positions generated for a domain, `(columns, rows)`.
    pub fn dims(&self, domain_extent: Vec2) -> (usize, usize) {
        (
            self.count_along(domain_extent.x),
            self.count_along(domain_extent.y),
        )
    }

    /// Total positions for a domain, or `None` above [`MAX_GRID_POSITIONS`].
    pub fn position_count(&self, domain_extent: Vec2) -> Option<usize> {
        let (cols, rows) = self.dims(domain_extent);
        cols.checked_mul(rows)
            .filter(|&n| n <= MAX_GRID_POSITIONS)
    }

    /// Like [`GridSampling::position_count`], reporting an oversized domain as an error.
    pub fn check_domain(&self, domain_extent: Vec2) -> Result<usize> {
        self.position_count(domain_extent).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "domain {}x{} at spacing {} exceeds {} grid positions",
                domain_extent.x, domain_extent.y, self.spacing, MAX_GRID_POSITIONS
            ))
        })
    }

    /// Grid positions row by row, south row first.
    ///
    /// Domains above [`MAX_GRID_POSITIONS`] yield no rows. Jittered positions stay at
    /// least `2 * CONTAINMENT_TOLERANCE` below the domain's upper bounds, so they are
    /// still contained by the shape they were sampled for.
    pub fn rows(&self, domain_extent: Vec2) -> GridRows {
        let (cols, rows) = match self.position_count(domain_extent) {
            Some(n) if n > 0 => self.dims(domain_extent),
            _ => (0, 0),
        };
        let half_w = domain_extent.x as f64 * 0.5;
        let half_h = domain_extent.y as f64 * 0.5;
        let slack = 2.0 * CONTAINMENT_TOLERANCE as f64;
        GridRows {
            cols,
            rows,
            next_row: 0,
            spacing: self.spacing as f64,
            half_w,
            half_h,
            max_x: next_down((half_w - slack).max(0.0) as f32),
            max_y: next_down((half_h - slack).max(0.0) as f32),
            jitter: self.jitter * self.spacing,
            rng: (self.jitter > 0.0).then(|| StdRng::seed_from_u64(self.seed)),
        }
    }
}

impl PositionSampling for GridSampling {
    fn generate(&self, domain_extent: Vector2<f32>) -> Vec<Vector2<f32>> {
        self.rows(Vec2::from(domain_extent))
            .flatten()
            .map(Into::into)
            .collect()
    }
}

/// Lazy row-by-row iterator over grid positions, see [`GridSampling::rows`].
#[derive(Debug)]
pub struct GridRows {
    cols: usize,
    rows: usize,
    next_row: usize,
    spacing: f64,
    half_w: f64,
    half_h: f64,
    max_x: f32,
    max_y: f32,
    jitter: f32,
    rng: Option<StdRng>,
}

impl GridRows {
    /// Number of positions per row.
    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl Iterator for GridRows {
    type Item = Vec<Vec2>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_row >= self.rows {
            return None;
        }
        let j = self.next_row;
        self.next_row += 1;

        let mut row = Vec::with_capacity(self.cols);
        for i in 0..self.cols {
            let mut px = (-self.half_w + i as f64 * self.spacing) as f32;
            let mut py = (-self.half_h + j as f64 * self.spacing) as f32;
            if let Some(rng) = self.rng.as_mut() {
                px = (px + rand01(rng) * self.jitter).min(self.max_x);
                py = (py + rand01(rng) * self.jitter).min(self.max_y);
            }
            row.push(Vec2::new(px, py));
        }
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.rows - self.next_row;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GridRows {}
