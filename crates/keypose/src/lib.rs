//! High-level entry crate for `keypose`: weighted 6-DoF pose estimation of a
//! rigid 3D keypoint template from confidence-weighted 2D detections.
//!
//! ## Function API
//!
//! ```
//! use keypose::prelude::*;
//! use keypose::core::synthetic;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let k = FxFyCxCySkew { fx: 900.0, fy: 900.0, cx: 640.0, cy: 360.0, skew: 0.0 };
//! let camera = CameraMatrix::from_params(&k)?;
//! let model = synthetic::skeleton_points();
//! let gt = synthetic::pose_from_euler(0.1, 0.2, -0.1, [0.0, 0.1, 2.5]);
//! let pixels = synthetic::project_points(&camera, &gt, &model)?;
//!
//! let obs = KeypointObservations::from_pixels(&pixels, model, vec![0.9; 17])?;
//! let est = solve_pose(&obs, &camera, &RefineOptions::default(), &P3pRansac::default())?;
//! println!("t = {:?}, residual = {:.3e}", est.translation, est.residual);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline API
//!
//! [`pipeline::run_pose_estimation`] takes serde-friendly [`pipeline::PoseInput`]
//! and [`pipeline::PoseConfig`] values (as loaded from JSON by `keypose-cli`)
//! and returns a [`pipeline::PoseReport`].
//!
//! ## Module Organization
//!
//! - [`core`]: math aliases, intrinsics, observations, RANSAC, synthetic data
//! - [`linear`]: polynomial roots, Kabsch, P3P, P3P-RANSAC
//! - [`optim`]: initializer and alternating pose refiner

pub mod pipeline;

pub use keypose_core as core;
pub use keypose_linear as linear;
pub use keypose_optim as optim;

pub use pipeline::{run_pose_estimation, IntrinsicsInput, PoseConfig, PoseInput, PoseReport};

/// Commonly used types and functions.
pub mod prelude {
    pub use keypose_core::{
        CameraMatrix, FxFyCxCySkew, Iso3, KeypointObservations, Mat3, NullPoseSolver,
        PoseError, Pt2, Pt3, RansacOptions, Real, RobustPose, RobustPoseSolver, Vec3,
    };
    pub use keypose_linear::P3pRansac;
    pub use keypose_optim::{
        refine, solve_pose, solve_pose_default, InitSource, PoseEstimate, RefineOptions,
        Termination,
    };

    pub use crate::pipeline::{run_pose_estimation, PoseConfig, PoseInput, PoseReport};
}
