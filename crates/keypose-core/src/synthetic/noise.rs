//! Deterministic noise helpers for synthetic keypoints.
//!
//! These avoid `thread_rng` and do not depend on the internal algorithm of
//! `rand` RNGs, keeping synthetic datasets stable across versions.

use crate::{Pt2, Real, Vec2};

/// Deterministic uniform pixel noise in `[-max_abs_px, +max_abs_px]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UniformPixelNoise {
    /// Base seed controlling the pseudo-random sequence.
    pub seed: u64,
    /// Maximum absolute per-axis noise (pixels).
    pub max_abs_px: Real,
}

impl UniformPixelNoise {
    /// Sample the noise vector for keypoint `idx`.
    pub fn sample(&self, idx: usize) -> Vec2 {
        let max_abs = self.max_abs_px.abs();
        if max_abs == 0.0 {
            return Vec2::zeros();
        }
        let key = self.seed ^ (idx as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        let u = unit_interval(splitmix64(key));
        let v = unit_interval(splitmix64(key ^ 0x94D0_49BB_1331_11EB));
        Vec2::new((u - 0.5) * 2.0 * max_abs, (v - 0.5) * 2.0 * max_abs)
    }

    /// Perturb every pixel in place.
    pub fn apply(&self, pixels: &mut [Pt2]) {
        for (idx, px) in pixels.iter_mut().enumerate() {
            *px += self.sample(idx);
        }
    }
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// Top 53 bits -> [0, 1).
#[inline]
fn unit_interval(x: u64) -> Real {
    (x >> 11) as Real * (1.0 / (1u64 << 53) as Real)
}
