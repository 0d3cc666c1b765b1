//! Deterministic synthetic scenes for tests and demos.
//!
//! Everything here is seed- and order-stable so that expected poses in tests
//! do not drift across platforms or `rand` versions.
//!
//! # Example
//!
//! ```
//! use keypose_core::{synthetic, CameraMatrix, FxFyCxCySkew};
//!
//! let k = FxFyCxCySkew { fx: 800.0, fy: 800.0, cx: 640.0, cy: 360.0, skew: 0.0 };
//! let camera = CameraMatrix::from_params(&k).unwrap();
//! let model = synthetic::skeleton_points();
//! let pose = synthetic::pose_from_euler(0.1, -0.2, 0.05, [0.05, -0.1, 3.0]);
//! let pixels = synthetic::project_points(&camera, &pose, &model).unwrap();
//! assert_eq!(pixels.len(), model.len());
//! ```

pub mod noise;

use crate::{CameraMatrix, Iso3, Pt2, Pt3, Real};
use anyhow::Result;
use nalgebra::{Translation3, UnitQuaternion};

/// A 17-landmark human-skeleton-like template (metres, model frame).
///
/// The points are deliberately non-coplanar so that rotation is well
/// determined from any reasonably spread subset.
pub fn skeleton_points() -> Vec<Pt3> {
    vec![
        Pt3::new(0.0, -0.85, 0.05),   // nose
        Pt3::new(-0.04, -0.88, 0.02), // left eye
        Pt3::new(0.04, -0.88, 0.02),  // right eye
        Pt3::new(-0.08, -0.85, -0.05),
        Pt3::new(0.08, -0.85, -0.05),
        Pt3::new(-0.20, -0.60, 0.0), // shoulders
        Pt3::new(0.20, -0.60, 0.0),
        Pt3::new(-0.30, -0.35, 0.10), // elbows
        Pt3::new(0.30, -0.35, -0.10),
        Pt3::new(-0.32, -0.10, 0.20), // wrists
        Pt3::new(0.33, -0.12, -0.15),
        Pt3::new(-0.12, 0.0, 0.0), // hips
        Pt3::new(0.12, 0.0, 0.0),
        Pt3::new(-0.14, 0.42, 0.08), // knees
        Pt3::new(0.13, 0.43, -0.06),
        Pt3::new(-0.15, 0.85, -0.02), // ankles
        Pt3::new(0.15, 0.84, 0.04),
    ]
}

/// Camera-from-model pose from roll/pitch/yaw (radians) and a translation.
pub fn pose_from_euler(roll: Real, pitch: Real, yaw: Real, t: [Real; 3]) -> Iso3 {
    Iso3::from_parts(
        Translation3::new(t[0], t[1], t[2]),
        UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    )
}

/// Project model points through `cam_from_model` and `camera`.
///
/// Fails if any point lands on or behind the camera plane.
pub fn project_points(
    camera: &CameraMatrix,
    cam_from_model: &Iso3,
    model_points: &[Pt3],
) -> Result<Vec<Pt2>> {
    model_points
        .iter()
        .enumerate()
        .map(|(idx, pm)| {
            let pc = cam_from_model.transform_point(pm);
            camera
                .project(&pc)
                .ok_or_else(|| anyhow::anyhow!("point {idx} not projectable (z={:.6})", pc.z))
        })
        .collect()
}
