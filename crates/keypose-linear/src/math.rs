//! Real polynomial root finding for minimal solvers.
//!
//! All solvers return real roots sorted ascending, with roots closer than
//! `1e-8` merged. Leading coefficients below `1e-12` fall back to the
//! lower-degree solver.

use keypose_core::Real;
use nalgebra::{Matrix4, Schur};

const LEAD_EPS: Real = 1e-12;
const DEDUP_EPS: Real = 1e-8;

fn sort_dedup(mut roots: Vec<Real>) -> Vec<Real> {
    roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    roots.dedup_by(|a, b| (*a - *b).abs() < DEDUP_EPS);
    roots
}

/// Real roots of `ax² + bx + c = 0`.
pub fn solve_quadratic_real(a: Real, b: Real, c: Real) -> Vec<Real> {
    if a.abs() < LEAD_EPS {
        if b.abs() < LEAD_EPS {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc.abs() < LEAD_EPS {
        return vec![-b / (2.0 * a)];
    }
    if disc < 0.0 {
        return Vec::new();
    }
    let s = disc.sqrt();
    sort_dedup(vec![(-b + s) / (2.0 * a), (-b - s) / (2.0 * a)])
}

/// Real roots of `ax³ + bx² + cx + d = 0` (Cardano / trigonometric form).
pub fn solve_cubic_real(a: Real, b: Real, c: Real, d: Real) -> Vec<Real> {
    if a.abs() < LEAD_EPS {
        return solve_quadratic_real(b, c, d);
    }
    let (b, c, d) = (b / a, c / a, d / a);

    // Depressed cubic y³ + py + q = 0 with x = y - b/3.
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let shift = b / 3.0;
    let disc = (q * 0.5).powi(2) + (p / 3.0).powi(3);

    let roots = if disc > LEAD_EPS {
        let s = disc.sqrt();
        vec![(-q * 0.5 + s).cbrt() + (-q * 0.5 - s).cbrt() - shift]
    } else if disc.abs() <= LEAD_EPS {
        let u = (-q * 0.5).cbrt();
        vec![2.0 * u - shift, -u - shift]
    } else {
        let r = (-p / 3.0).sqrt();
        let phi = ((-q * 0.5) / (r * r * r)).clamp(-1.0, 1.0).acos();
        let tau = std::f64::consts::TAU;
        (0..3)
            .map(|k| 2.0 * r * ((phi + tau * k as Real) / 3.0).cos() - shift)
            .collect()
    };
    sort_dedup(roots)
}

/// Real roots of `ax⁴ + bx³ + cx² + dx + e = 0`.
///
/// Eigenvalues of the companion matrix via Schur decomposition; eigenvalues
/// with an imaginary part below `1e-8` are treated as real.
pub fn solve_quartic_real(a: Real, b: Real, c: Real, d: Real, e: Real) -> Vec<Real> {
    if a.abs() < LEAD_EPS {
        return solve_cubic_real(b, c, d, e);
    }
    #[rustfmt::skip]
    let companion = Matrix4::new(
        -b / a, -c / a, -d / a, -e / a,
        1.0,    0.0,    0.0,    0.0,
        0.0,    1.0,    0.0,    0.0,
        0.0,    0.0,    1.0,    0.0,
    );
    let eig = Schur::new(companion).complex_eigenvalues();
    sort_dedup(
        eig.iter()
            .filter(|z| z.im.abs() < DEDUP_EPS)
            .map(|z| z.re)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roots(got: &[Real], want: &[Real]) {
        assert_eq!(got.len(), want.len(), "got {got:?}, want {want:?}");
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-7, "got {got:?}, want {want:?}");
        }
    }

    #[test]
    fn quadratic_roots() {
        assert_roots(&solve_quadratic_real(1.0, -3.0, 2.0), &[1.0, 2.0]);
        assert!(solve_quadratic_real(1.0, 0.0, 1.0).is_empty());
        assert_roots(&solve_quadratic_real(0.0, 2.0, -4.0), &[2.0]);
    }

    #[test]
    fn cubic_roots() {
        // (x-1)(x-2)(x-3)
        assert_roots(&solve_cubic_real(1.0, -6.0, 11.0, -6.0), &[1.0, 2.0, 3.0]);
        // x³ - 8
        assert_roots(&solve_cubic_real(1.0, 0.0, 0.0, -8.0), &[2.0]);
    }

    #[test]
    fn quartic_roots() {
        // (x+2)(x-1)(x-3)(x-0.5)
        let (a, b, c, d, e) = (1.0, -2.5, -4.0, 8.5, -3.0);
        assert_roots(&solve_quartic_real(a, b, c, d, e), &[-2.0, 0.5, 1.0, 3.0]);
        // (x² + 1)(x - 2)(x + 1): two complex roots dropped.
        assert_roots(&solve_quartic_real(1.0, -1.0, -1.0, -1.0, -2.0), &[-1.0, 2.0]);
    }
}
