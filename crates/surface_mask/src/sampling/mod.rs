//! Candidate position generation for planting areas.
//!
//! Strategies produce planar positions inside a centered domain; the placement sampler
//! moves them onto the area's footprint and looks up surface points there.
use mint::Vector2;
use rand::RngCore;

pub mod grid;

pub use grid::{GridRows, GridSampling, DEFAULT_GRID_SPACING, MAX_GRID_POSITIONS};

/// Trait for position sampling.
///
/// Positions are relative to the domain center and lie in `[-extent/2, extent/2)`.
/// Implementations must be deterministic for a fixed configuration.
pub trait PositionSampling: Send + Sync {
    fn generate(&self, domain_extent: Vector2<f32>) -> Vec<Vector2<f32>>;
}

/// Generate a random float in the range [0, 1].
///
/// `u32::MAX` rounds up to exactly 1.0 in `f32`, so callers that need a strict
/// upper bound clamp the result.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Compute the next smaller representable float value.
///
/// Used to keep jittered positions strictly inside the domain's upper bound.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }

    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }

    if val == f32::INFINITY {
        return f32::MAX;
    }

    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits.saturating_sub(1))
    } else {
        f32::from_bits(bits.saturating_add(1))
    }
}
