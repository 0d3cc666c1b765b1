use crate::{RefineOptions, EPS};
use keypose_core::{
    CameraMatrix, KeypointObservations, Mat3, Pt2, Pt3, Real, RobustPoseSolver, Vec3,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which initializer produced the starting pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSource {
    /// Identity rotation and scaled ray centroid.
    Heuristic,
    /// Pose returned by the robust solver on the confident subset.
    Robust,
}

/// Starting pose for the alternating refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialPose {
    pub rotation: Mat3,
    pub translation: Vec3,
    pub source: InitSource,
}

fn mean(v: &[Vec3]) -> Vec3 {
    v.iter().fold(Vec3::zeros(), |acc, x| acc + x) / v.len() as Real
}

/// Population standard deviation of each axis, averaged over the three axes.
fn mean_axis_std(v: &[Vec3]) -> Real {
    let mu = mean(v);
    let var = v
        .iter()
        .fold(Vec3::zeros(), |acc, x| acc + (x - mu).component_mul(&(x - mu)))
        / v.len() as Real;
    var.map(Real::sqrt).mean()
}

/// Closed-form starting pose: `R₀ = I` and the ray centroid scaled by the
/// ratio of model spread to ray spread,
///
/// `t₀ = mean(W) · mean(std(P)) / (mean(std(W)) + ε)`.
///
/// Spreads are per-axis population standard deviations averaged over the
/// three axes (the constant third ray component contributes a zero).
pub fn heuristic_init(rays: &[Vec3], model_points: &[Pt3]) -> InitialPose {
    let model: Vec<Vec3> = model_points.iter().map(|p| p.coords).collect();
    let scale = mean_axis_std(&model) / (mean_axis_std(rays) + EPS);
    InitialPose {
        rotation: Mat3::identity(),
        translation: mean(rays) * scale,
        source: InitSource::Heuristic,
    }
}

/// Choose the starting pose.
///
/// The heuristic is always computed. When `opts.use_robust_init` is set and at
/// least `opts.min_confident` detections have confidence above
/// `opts.confidence_threshold`, `solver` runs on that subset (raw pixels,
/// zero distortion); its answer replaces the heuristic on success. Solver
/// failure is not an error.
pub fn initialize<S: RobustPoseSolver + ?Sized>(
    obs: &KeypointObservations,
    camera: &CameraMatrix,
    rays: &[Vec3],
    opts: &RefineOptions,
    solver: &S,
) -> InitialPose {
    let heuristic = heuristic_init(rays, obs.model_points());
    if !opts.use_robust_init {
        return heuristic;
    }

    let confident = obs.confident_indices(opts.confidence_threshold);
    if confident.len() < opts.min_confident {
        debug!(
            "robust init skipped: {} confident keypoints (need {})",
            confident.len(),
            opts.min_confident
        );
        return heuristic;
    }

    let model: Vec<Pt3> = confident.iter().map(|&i| obs.model_points()[i]).collect();
    let image: Vec<Pt2> = confident.iter().map(|&i| obs.pixel_xy(i)).collect();

    match solver.solve(&model, &image, camera) {
        Some(pose) => {
            let rotation = pose.rotation_matrix();
            if rotation.iter().chain(pose.translation.iter()).all(|v| v.is_finite()) {
                debug!(
                    "robust init accepted: {} / {} inliers",
                    pose.inliers.len(),
                    confident.len()
                );
                InitialPose {
                    rotation,
                    translation: pose.translation,
                    source: InitSource::Robust,
                }
            } else {
                debug!("robust init returned a non-finite pose, using heuristic");
                heuristic
            }
        }
        None => {
            debug!("robust init failed, using heuristic");
            heuristic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_matches_hand_computed_value() {
        let rays = vec![
            Vec3::new(-0.1, 0.0, 1.0),
            Vec3::new(0.1, 0.0, 1.0),
            Vec3::new(0.0, 0.2, 1.0),
            Vec3::new(0.0, -0.2, 1.0),
        ];
        let model = vec![
            Pt3::new(-1.0, 0.0, 0.0),
            Pt3::new(1.0, 0.0, 0.0),
            Pt3::new(0.0, 2.0, 0.0),
            Pt3::new(0.0, -2.0, 0.0),
        ];
        // std(W) = (sqrt(0.005), sqrt(0.02), 0); std(P) = 10 × std(W).
        let init = heuristic_init(&rays, &model);
        assert_eq!(init.rotation, Mat3::identity());
        assert_eq!(init.source, InitSource::Heuristic);
        assert!((init.translation - Vec3::new(0.0, 0.0, 10.0)).norm() < 1e-9);
    }

    #[test]
    fn heuristic_points_along_mean_ray() {
        let rays = vec![
            Vec3::new(0.3, 0.1, 1.0),
            Vec3::new(0.5, 0.2, 1.0),
            Vec3::new(0.4, 0.4, 1.0),
        ];
        let model = vec![
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(0.2, 0.1, 0.3),
            Pt3::new(-0.1, 0.3, 0.1),
        ];
        let init = heuristic_init(&rays, &model);
        let m = mean(&rays);
        let cos = init.translation.dot(&m) / (init.translation.norm() * m.norm());
        assert!(cos > 1.0 - 1e-12);
    }

    #[test]
    fn heuristic_survives_zero_ray_spread() {
        let rays = vec![Vec3::new(0.0, 0.0, 1.0); 3];
        let model = vec![Pt3::new(1.0, 2.0, 3.0); 3];
        let init = heuristic_init(&rays, &model);
        assert!(init.translation.iter().all(|v| v.is_finite()));
    }
}
