//! Alternating (block-coordinate) refinement of depth, translation and rotation.

use crate::{InitialPose, PoseEstimate, RefineOptions, Termination, EPS};
use keypose_core::{Mat3, PoseError, Pt3, Real, Vec3};
use log::{debug, trace};

/// State after one Z → t → R pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub rotation: Mat3,
    pub translation: Vec3,
    /// Depth of each point along its ray.
    pub depths: Vec<Real>,
    /// Mean of `‖Dᵢ (Wᵢ Zᵢ − R pᵢ − t)‖` for the updated `(R, t, Z)`.
    pub residual: Real,
}

/// Weighted orthogonal Procrustes: the rotation maximizing `tr(Rᵀ A)`.
///
/// `R = U Vᵀ` from the SVD of `A`; if that is a reflection the last column of
/// `U` (smallest singular value) is negated. Returns `None` only if the SVD
/// does not yield singular vectors.
fn procrustes_rotation(a: &Mat3) -> Option<Mat3> {
    let svd = a.svd(true, true);
    let mut u = svd.u?;
    let v_t = svd.v_t?;
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        u.column_mut(2).neg_mut();
        r = u * v_t;
    }
    Some(r)
}

/// One refinement iteration starting from `(rotation, translation)`.
///
/// The order is fixed and each block uses the freshly updated ones:
/// 1. `Zᵢ = Wᵢ·(R pᵢ + t) / Wᵢ·Wᵢ`
/// 2. `t = Σ Dᵢ (Wᵢ Zᵢ − R pᵢ) / (Σ Dᵢ + ε)` (with the incoming `R`)
/// 3. `R` from Procrustes on `A = Σ Dᵢ (Wᵢ Zᵢ − t) pᵢᵀ`
/// 4. residual with the new `(R, t, Z)`
///
/// `rays`, `model_points` and `weights` must be non-empty and of equal
/// length; [`refine`] checks this before the first step.
pub fn refine_step(
    rays: &[Vec3],
    model_points: &[Pt3],
    weights: &[Real],
    rotation: &Mat3,
    translation: &Vec3,
) -> StepOutput {
    debug_assert!(!rays.is_empty(), "refine_step needs at least one ray");
    debug_assert!(
        rays.len() == model_points.len() && rays.len() == weights.len(),
        "refine_step length mismatch: {} rays, {} model points, {} weights",
        rays.len(),
        model_points.len(),
        weights.len()
    );
    let n = rays.len();

    let depths: Vec<Real> = rays
        .iter()
        .zip(model_points)
        .map(|(w, p)| w.dot(&(rotation * p.coords + translation)) / w.dot(w))
        .collect();
    let scaled: Vec<Vec3> = rays.iter().zip(&depths).map(|(w, &z)| w * z).collect();

    let mut weighted_offset = Vec3::zeros();
    let mut weight_sum = 0.0;
    for ((wz, p), &d) in scaled.iter().zip(model_points).zip(weights) {
        weighted_offset += (wz - rotation * p.coords) * d;
        weight_sum += d;
    }
    let translation = weighted_offset / (weight_sum + EPS);

    let mut a = Mat3::zeros();
    for ((wz, p), &d) in scaled.iter().zip(model_points).zip(weights) {
        a += ((wz - translation) * d) * p.coords.transpose();
    }
    let rotation = procrustes_rotation(&a).unwrap_or(*rotation);

    let residual = scaled
        .iter()
        .zip(model_points)
        .zip(weights)
        .map(|((wz, p), &d)| ((wz - rotation * p.coords - translation) * d).norm())
        .sum::<Real>()
        / n as Real;

    StepOutput {
        rotation,
        translation,
        depths,
        residual,
    }
}

fn relative_change(previous: Real, current: Real) -> Real {
    (previous - current).abs() / (current + EPS)
}

/// Run the alternating refinement from `init` until the relative residual
/// change drops below `opts.thresh` or `opts.max_iters` passes have run.
///
/// On convergence the reported residual is the one recorded before the
/// final pass; on exhaustion it is the residual of the last pass.
///
/// Requires at least one positive weight for a meaningful result (all-zero
/// weights still terminate with finite output). Fails only on mismatched
/// input lengths, empty input or invalid options.
pub fn refine(
    rays: &[Vec3],
    model_points: &[Pt3],
    weights: &[Real],
    init: &InitialPose,
    opts: &RefineOptions,
) -> Result<PoseEstimate, PoseError> {
    opts.validate()?;
    if rays.len() != model_points.len() || rays.len() != weights.len() {
        return Err(PoseError::ShapeMismatch {
            pixels: rays.len(),
            model_points: model_points.len(),
            confidences: weights.len(),
        });
    }
    if rays.is_empty() {
        return Err(PoseError::EmptyInput);
    }

    let mut state = refine_step(rays, model_points, weights, &init.rotation, &init.translation);
    let mut previous = Real::INFINITY;
    let mut iterations = 1;

    let termination = loop {
        trace!("iter {iterations}: residual {:.6e}", state.residual);
        if relative_change(previous, state.residual) < opts.thresh {
            break Termination::Converged;
        }
        if iterations >= opts.max_iters {
            break Termination::Exhausted;
        }
        previous = state.residual;
        state = refine_step(rays, model_points, weights, &state.rotation, &state.translation);
        iterations += 1;
    };

    let residual = match termination {
        Termination::Converged => previous,
        Termination::Exhausted => state.residual,
    };
    debug!(
        "refinement {:?} after {} iterations, residual {:.6e}",
        termination, iterations, residual
    );

    Ok(PoseEstimate {
        rotation: state.rotation,
        translation: state.translation,
        depths: state.depths,
        residual,
        iterations,
        termination,
        init_source: init.source,
    })
}
