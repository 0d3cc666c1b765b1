use crate::InitSource;
use keypose_core::{Iso3, Mat3, Real, Vec3};
use nalgebra::{Rotation3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// Why the refinement loop stopped. Both variants carry a usable estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Relative residual change fell below the threshold.
    Converged,
    /// Iteration budget ran out first.
    Exhausted,
}

/// Final pose, depths and residual of one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    /// Rotation taking model points into the camera frame (det = +1).
    pub rotation: Mat3,
    /// Translation in the camera frame.
    pub translation: Vec3,
    /// Per-keypoint depth along its normalized ray.
    pub depths: Vec<Real>,
    /// Weighted mean residual at loop exit. After convergence this is the
    /// value from the pass before the last one.
    pub residual: Real,
    /// Number of refinement passes performed.
    pub iterations: usize,
    pub termination: Termination,
    pub init_source: InitSource,
}

impl PoseEstimate {
    /// `T_C_M` as an isometry.
    pub fn isometry(&self) -> Iso3 {
        let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
            self.rotation,
        ));
        Iso3::from_parts(Translation3::from(self.translation), rot)
    }

    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}
