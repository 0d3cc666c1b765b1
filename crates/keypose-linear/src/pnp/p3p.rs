//! Perspective-3-Point minimal solver.
//!
//! With the three camera-frame distances `s₁, s₂ = u·s₁, s₃ = v·s₁` along
//! the bearing vectors, the law of cosines on the three model edges reduces
//! to a quartic in `u`. Each positive real root yields a candidate pose via
//! Kabsch alignment.

use super::pose_utils::pose_from_points;
use crate::math::solve_quartic_real;
use anyhow::Result;
use keypose_core::{CameraMatrix, Iso3, Pt2, Pt3, Real};
use nalgebra::Vector3;

/// Multiply two polynomials of degree ≤ 4 (ascending coefficients), truncated to degree 4.
fn poly_mul(a: &[Real; 5], b: &[Real; 5]) -> [Real; 5] {
    let mut out = [0.0; 5];
    for i in 0..5 {
        for j in 0..5 - i {
            out[i + j] += a[i] * b[j];
        }
    }
    out
}

/// P3P minimal solver: up to four pose candidates, nearest first.
///
/// `model` must hold exactly three non-collinear points and `image` their
/// pixel detections.
pub fn p3p(model: &[Pt3], image: &[Pt2], camera: &CameraMatrix) -> Result<Vec<Iso3>> {
    if model.len() != 3 || image.len() != 3 {
        anyhow::bail!(
            "invalid number of correspondences: expected 3, got {} model / {} image",
            model.len(),
            image.len()
        );
    }

    let bearings: Vec<Vector3<Real>> = image
        .iter()
        .map(|p| camera.pixel_to_ray(&Vector3::new(p.x, p.y, 1.0)).normalize())
        .collect();

    let a = (model[1] - model[2]).norm();
    let b = (model[0] - model[2]).norm();
    let c = (model[0] - model[1]).norm();
    if a <= Real::EPSILON || b <= Real::EPSILON || c <= Real::EPSILON {
        anyhow::bail!("coincident model points in P3P sample");
    }

    let cos_alpha = bearings[1].dot(&bearings[2]);
    let cos_beta = bearings[0].dot(&bearings[2]);
    let cos_gamma = bearings[0].dot(&bearings[1]);

    let c2 = c * c;
    let d = (b * b - a * a) / c2;
    let e = b * b / c2;

    // v(u) = n(u) / den(u)
    let n_poly = [1.0 - d, 2.0 * d * cos_gamma, -(1.0 + d), 0.0, 0.0];
    let den_poly = [2.0 * cos_beta, -2.0 * cos_alpha, 0.0, 0.0, 0.0];
    let e_poly = [1.0 - e, 2.0 * e * cos_gamma, -e, 0.0, 0.0];

    let nn = poly_mul(&n_poly, &n_poly);
    let nd = poly_mul(&n_poly, &den_poly);
    let edd = poly_mul(&e_poly, &poly_mul(&den_poly, &den_poly));

    let mut coeffs = [0.0; 5];
    for i in 0..5 {
        coeffs[i] = nn[i] - 2.0 * cos_beta * nd[i] + edd[i];
    }

    let roots = solve_quartic_real(coeffs[4], coeffs[3], coeffs[2], coeffs[1], coeffs[0]);

    let mut solutions = Vec::with_capacity(roots.len());
    for u in roots {
        let den = 2.0 * (cos_beta - u * cos_alpha);
        let k = 1.0 + u * u - 2.0 * u * cos_gamma;
        if den.abs() < 1e-12 || k.abs() < 1e-12 {
            continue;
        }
        let v = (n_poly[0] + n_poly[1] * u + n_poly[2] * u * u) / den;
        let x2 = c2 / k;
        if u <= 0.0 || v <= 0.0 || x2 <= 0.0 {
            continue;
        }
        let x = x2.sqrt();
        let camera_pts = [bearings[0] * x, bearings[1] * (u * x), bearings[2] * (v * x)];
        if let Ok(pose) = pose_from_points(model, &camera_pts) {
            solutions.push((x, pose));
        }
    }

    if solutions.is_empty() {
        anyhow::bail!("P3P polynomial has no admissible root");
    }
    solutions.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    Ok(solutions.into_iter().map(|(_, pose)| pose).collect())
}
