use crate::{initialize, normalize_rays, refine, PoseEstimate, RefineOptions};
use keypose_core::{CameraMatrix, KeypointObservations, PoseError, RobustPoseSolver};
use keypose_linear::P3pRansac;
use log::warn;

/// Estimate the pose of `obs.model_points()` relative to `camera`.
///
/// Normalizes the detections once, seeds the pose with [`initialize`] (using
/// `solver` for the robust path) and refines it with [`refine`].
///
/// # Errors
///
/// Only boundary validation can fail: invalid `opts` or a detection whose
/// normalized ray has zero length. Robust solver failure silently falls back
/// to the heuristic initializer, and an exhausted iteration budget still
/// returns the last estimate.
pub fn solve_pose<S: RobustPoseSolver + ?Sized>(
    obs: &KeypointObservations,
    camera: &CameraMatrix,
    opts: &RefineOptions,
    solver: &S,
) -> Result<PoseEstimate, PoseError> {
    opts.validate()?;
    let rays = normalize_rays(camera, obs.pixels())?;
    if obs.total_weight() <= 0.0 {
        warn!(
            "all {} keypoint confidences are zero; the pose is unconstrained",
            obs.len()
        );
    }
    let init = initialize(obs, camera, &rays, opts, solver);
    refine(
        &rays,
        obs.model_points(),
        obs.confidences(),
        &init,
        opts,
    )
}

/// [`solve_pose`] with the default [`P3pRansac`] robust initializer.
pub fn solve_pose_default(
    obs: &KeypointObservations,
    camera: &CameraMatrix,
    opts: &RefineOptions,
) -> Result<PoseEstimate, PoseError> {
    solve_pose(obs, camera, opts, &P3pRansac::default())
}
