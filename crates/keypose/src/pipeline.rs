//! Serde-facing pose estimation pipeline.
//!
//! Mirrors the function API but takes plain arrays so inputs and reports can
//! be exchanged as JSON.

use anyhow::{Context, Result};
use keypose_core::{
    CameraMatrix, FxFyCxCySkew, KeypointObservations, Mat3, Pt2, Pt3, RansacOptions, Real, Vec3,
};
use keypose_linear::P3pRansac;
use keypose_optim::{solve_pose, InitSource, PoseEstimate, RefineOptions, Termination};
use log::debug;
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};

/// Camera intrinsics, either as parameters or as a row-major 3x3 matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntrinsicsInput {
    Params(FxFyCxCySkew<Real>),
    Matrix([[Real; 3]; 3]),
}

impl IntrinsicsInput {
    pub fn camera(&self) -> Result<CameraMatrix> {
        let k = match self {
            Self::Params(p) => p.k_matrix(),
            Self::Matrix(rows) => Mat3::from_fn(|r, c| rows[r][c]),
        };
        Ok(CameraMatrix::new(k)?)
    }
}

/// One pose problem: intrinsics plus index-aligned detections, model points
/// and confidences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseInput {
    pub intrinsics: IntrinsicsInput,
    /// Pixel detections `[u, v]`.
    pub keypoints: Vec<[Real; 2]>,
    /// Model-frame points `[x, y, z]`.
    pub model_points: Vec<[Real; 3]>,
    /// Non-negative confidence per detection.
    pub confidences: Vec<Real>,
}

impl PoseInput {
    pub fn observations(&self) -> Result<KeypointObservations> {
        let pixels: Vec<Pt2> = self.keypoints.iter().map(|p| Pt2::new(p[0], p[1])).collect();
        let model: Vec<Pt3> = self
            .model_points
            .iter()
            .map(|p| Pt3::new(p[0], p[1], p[2]))
            .collect();
        Ok(KeypointObservations::from_pixels(
            &pixels,
            model,
            self.confidences.clone(),
        )?)
    }
}

/// Solver configuration. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseConfig {
    #[serde(default)]
    pub refine: RefineOptions,
    /// Options of the P3P-RANSAC initializer; `refit_on_inliers` re-estimates
    /// each hypothesis on its consensus set.
    #[serde(default)]
    pub ransac: RansacOptions,
}

/// Result of [`run_pose_estimation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseReport {
    /// Row-major rotation taking model points into the camera frame.
    pub rotation: [[Real; 3]; 3],
    /// Same rotation as an axis-angle vector.
    pub rotation_vector: [Real; 3],
    pub translation: [Real; 3],
    pub depths: Vec<Real>,
    pub residual: Real,
    pub iterations: usize,
    pub termination: Termination,
    pub init_source: InitSource,
    /// Mean pixel reprojection error over keypoints with positive confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_reproj_error_px: Option<Real>,
}

fn vec_array(v: &Vec3) -> [Real; 3] {
    [v.x, v.y, v.z]
}

/// Mean reprojection error (pixels) over positively weighted keypoints that
/// land in front of the camera.
fn mean_reprojection_error(
    est: &PoseEstimate,
    obs: &KeypointObservations,
    camera: &CameraMatrix,
) -> Option<Real> {
    let pose = est.isometry();
    let errors: Vec<Real> = (0..obs.len())
        .filter(|&i| obs.confidences()[i] > 0.0)
        .filter_map(|i| {
            let uv = camera.project(&pose.transform_point(&obs.model_points()[i]))?;
            Some((uv - obs.pixel_xy(i)).norm())
        })
        .collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.iter().sum::<Real>() / errors.len() as Real)
    }
}

impl PoseReport {
    fn from_estimate(est: &PoseEstimate, mean_reproj_error_px: Option<Real>) -> Self {
        let r = &est.rotation;
        let rotation_vector = Rotation3::from_matrix_unchecked(*r).scaled_axis();
        Self {
            rotation: [
                [r[(0, 0)], r[(0, 1)], r[(0, 2)]],
                [r[(1, 0)], r[(1, 1)], r[(1, 2)]],
                [r[(2, 0)], r[(2, 1)], r[(2, 2)]],
            ],
            rotation_vector: vec_array(&rotation_vector),
            translation: vec_array(&est.translation),
            depths: est.depths.clone(),
            residual: est.residual,
            iterations: est.iterations,
            termination: est.termination,
            init_source: est.init_source,
            mean_reproj_error_px,
        }
    }
}

/// Validate the input, solve for the pose and build a report.
pub fn run_pose_estimation(input: &PoseInput, config: &PoseConfig) -> Result<PoseReport> {
    let camera = input.intrinsics.camera().context("invalid intrinsics")?;
    let obs = input.observations().context("invalid keypoints")?;
    let solver = P3pRansac::new(config.ransac.clone());

    let est = solve_pose(&obs, &camera, &config.refine, &solver)?;
    let reproj = mean_reprojection_error(&est, &obs, &camera);
    debug!(
        "pose solved for {} keypoints: {:?}, init {:?}, reprojection {:?} px",
        obs.len(),
        est.termination,
        est.init_source,
        reproj
    );
    Ok(PoseReport::from_estimate(&est, reproj))
}
