//! Weighted keypoint pose estimation by alternating minimization.
//!
//! Given intrinsics, 2D detections with confidences `Dᵢ` and matching 3D model
//! points `pᵢ`, the solver minimizes
//!
//! ```text
//! Σᵢ Dᵢ ‖Wᵢ Zᵢ − (R pᵢ + t)‖²
//! ```
//!
//! over the rotation `R`, translation `t` and per-point depths `Zᵢ`, where
//! `Wᵢ = K⁻¹ [uᵢ, vᵢ, 1]ᵀ` is the normalized ray of detection `i`.
//!
//! Each iteration solves three closed-form subproblems in a fixed order:
//! depths, then translation, then rotation (weighted orthogonal Procrustes).
//! The starting pose comes from [`initialize`]: a centroid/spread heuristic,
//! or a [`RobustPoseSolver`](keypose_core::RobustPoseSolver) on the
//! confident subset when enough confident points exist.
//!
//! # Example
//!
//! ```
//! use keypose_core::{synthetic, CameraMatrix, FxFyCxCySkew, KeypointObservations};
//! use keypose_optim::{solve_pose_default, RefineOptions};
//!
//! let k = FxFyCxCySkew { fx: 900.0, fy: 900.0, cx: 640.0, cy: 360.0, skew: 0.0 };
//! let camera = CameraMatrix::from_params(&k).unwrap();
//! let model = synthetic::skeleton_points();
//! let gt = synthetic::pose_from_euler(0.1, -0.2, 0.05, [0.05, -0.1, 3.0]);
//! let pixels = synthetic::project_points(&camera, &gt, &model).unwrap();
//! let confidences = vec![1.0; model.len()];
//!
//! let obs = KeypointObservations::from_pixels(&pixels, model, confidences).unwrap();
//! let est = solve_pose_default(&obs, &camera, &RefineOptions::default()).unwrap();
//! assert!(est.residual < 1e-6);
//! ```

mod init;
mod options;
mod rays;
mod refine;
mod result;
mod solve;

pub use init::{heuristic_init, initialize, InitSource, InitialPose};
pub use options::RefineOptions;
pub use rays::normalize_rays;
pub use refine::{refine, refine_step, StepOutput};
pub use result::{PoseEstimate, Termination};
pub use solve::{solve_pose, solve_pose_default};

/// Regularizer guarding divisions by a total weight or spread that may be zero.
pub const EPS: keypose_core::Real = 1e-12;
