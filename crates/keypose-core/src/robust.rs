//! Robust initial-pose capability.
//!
//! The alternating refiner only needs *a* starting pose. When enough
//! confident correspondences exist it asks a [`RobustPoseSolver`] for one;
//! any implementation (or none at all, see [`NullPoseSolver`]) is acceptable
//! because a failed solve falls back to a closed-form heuristic.

use crate::{CameraMatrix, Mat3, Pt2, Pt3, Vec3};
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};

/// Pose candidate returned by a robust solver.
///
/// Transforms model-frame points into the camera frame:
/// `p_c = R(rotation) · p_m + translation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustPose {
    /// Rotation as an axis-angle (Rodrigues) vector.
    pub rotation: Vec3,
    /// Translation in the camera frame.
    pub translation: Vec3,
    /// Indices (into the solver's input slices) of the consensus set.
    pub inliers: Vec<usize>,
}

impl RobustPose {
    /// Rotation matrix from the axis-angle vector.
    pub fn rotation_matrix(&self) -> Mat3 {
        Rotation3::new(self.rotation).into_inner()
    }
}

/// Given model points, their pixel detections and intrinsics (zero lens
/// distortion), produce a pose candidate or `None` when no consensus exists.
pub trait RobustPoseSolver {
    fn solve(&self, model: &[Pt3], image: &[Pt2], camera: &CameraMatrix) -> Option<RobustPose>;
}

impl<T: RobustPoseSolver + ?Sized> RobustPoseSolver for &T {
    fn solve(&self, model: &[Pt3], image: &[Pt2], camera: &CameraMatrix) -> Option<RobustPose> {
        (**self).solve(model, image, camera)
    }
}

/// Solver stand-in for environments without a minimal solver: always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPoseSolver;

impl RobustPoseSolver for NullPoseSolver {
    fn solve(&self, _model: &[Pt3], _image: &[Pt2], _camera: &CameraMatrix) -> Option<RobustPose> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_angle_converts_to_proper_rotation() {
        let pose = RobustPose {
            rotation: Vec3::new(0.1, -0.2, 0.3),
            translation: Vec3::zeros(),
            inliers: vec![],
        };
        let r = pose.rotation_matrix();
        assert!((r.transpose() * r - Mat3::identity()).norm() < 1e-12);
        assert!((r.determinant() - 1.0).abs() < 1e-12);
        let back = Rotation3::from_matrix_unchecked(r).scaled_axis();
        assert!((back - pose.rotation).norm() < 1e-12);
    }
}
