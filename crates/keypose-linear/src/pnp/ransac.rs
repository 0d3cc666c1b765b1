//! P3P inside RANSAC: the default robust initializer.

use super::p3p::p3p;
use super::pose_utils::pose_from_points;
use keypose_core::{
    ransac, to_homogeneous, CameraMatrix, Estimator, Iso3, Pt2, Pt3, RansacOptions, Real,
    RobustPose, RobustPoseSolver, Vec3,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Robust pose from 3D-2D correspondences using P3P hypotheses.
///
/// Each hypothesis samples four correspondences: P3P runs on the first three
/// and the fourth selects among the (up to four) candidates. Hypotheses are
/// scored by pixel reprojection error against `opts.thresh`. Lens distortion
/// is assumed to be zero.
///
/// With `opts.refit_on_inliers` each hypothesis is re-estimated on its
/// consensus set by alternating ray depths and a rigid alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct P3pRansac {
    pub opts: RansacOptions,
}

impl P3pRansac {
    pub fn new(opts: RansacOptions) -> Self {
        Self { opts }
    }

    /// Run the robust search, returning the pose and inlier indices.
    pub fn estimate(
        &self,
        model: &[Pt3],
        image: &[Pt2],
        camera: &CameraMatrix,
    ) -> Option<(Iso3, Vec<usize>)> {
        if model.len() != image.len() || model.len() < P3pEstimator::MIN_SAMPLES {
            debug!(
                "P3P-RANSAC skipped: {} model points, {} detections",
                model.len(),
                image.len()
            );
            return None;
        }

        let data: Vec<Correspondence> = model
            .iter()
            .zip(image)
            .map(|(pm, px)| Correspondence {
                pm: *pm,
                px: *px,
                camera: *camera,
            })
            .collect();

        let res = ransac::<P3pEstimator>(&data, &self.opts);
        let pose = res.model?;
        debug!(
            "P3P-RANSAC: {} / {} inliers after {} hypotheses, rms {:.3} px",
            res.inliers.len(),
            data.len(),
            res.iters,
            res.inlier_rms
        );
        Some((pose, res.inliers))
    }
}

impl RobustPoseSolver for P3pRansac {
    fn solve(&self, model: &[Pt3], image: &[Pt2], camera: &CameraMatrix) -> Option<RobustPose> {
        let (pose, inliers) = self.estimate(model, image, camera)?;
        Some(RobustPose {
            rotation: pose.rotation.scaled_axis(),
            translation: pose.translation.vector,
            inliers,
        })
    }
}

#[derive(Clone)]
struct Correspondence {
    pm: Pt3,
    px: Pt2,
    camera: CameraMatrix,
}

fn reprojection_error(pose: &Iso3, datum: &Correspondence) -> Real {
    datum
        .camera
        .project(&pose.transform_point(&datum.pm))
        .map_or(Real::INFINITY, |uv| (uv - datum.px).norm())
}

/// Depth/alignment rounds used when refitting on a consensus set.
const REFIT_ROUNDS: usize = 5;

struct P3pEstimator;

impl Estimator for P3pEstimator {
    type Datum = Correspondence;
    type Model = Iso3;

    const MIN_SAMPLES: usize = 4;

    fn fit(data: &[Self::Datum], sample_indices: &[usize]) -> Option<Self::Model> {
        let triple = &sample_indices[..3];
        let model: Vec<Pt3> = triple.iter().map(|&i| data[i].pm).collect();
        let image: Vec<Pt2> = triple.iter().map(|&i| data[i].px).collect();
        let candidates = p3p(&model, &image, &data[0].camera).ok()?;

        let check = &data[sample_indices[3]];
        candidates
            .into_iter()
            .map(|pose| (reprojection_error(&pose, check), pose))
            .filter(|(err, _)| err.is_finite())
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, pose)| pose)
    }

    fn residual(model: &Self::Model, datum: &Self::Datum) -> f64 {
        reprojection_error(model, datum)
    }

    fn is_degenerate(data: &[Self::Datum], sample_indices: &[usize]) -> bool {
        let a = data[sample_indices[0]].pm;
        let b = data[sample_indices[1]].pm;
        let c = data[sample_indices[2]].pm;
        (b - a).cross(&(c - a)).norm() < 1e-9
    }

    fn refit(data: &[Self::Datum], inliers: &[usize]) -> Option<Self::Model> {
        let n = inliers.len();
        if n < Self::MIN_SAMPLES {
            return None;
        }
        // Inliers arrive sorted; spread the seed sample across the set.
        let seed = [inliers[0], inliers[n / 3], inliers[2 * n / 3], inliers[n - 1]];
        if Self::is_degenerate(data, &seed) {
            return None;
        }
        let mut pose = Self::fit(data, &seed)?;

        let model: Vec<Pt3> = inliers.iter().map(|&i| data[i].pm).collect();
        let rays: Vec<Vec3> = inliers
            .iter()
            .map(|&i| data[i].camera.pixel_to_ray(&to_homogeneous(&data[i].px)))
            .collect();
        for _ in 0..REFIT_ROUNDS {
            let points: Vec<Vec3> = rays
                .iter()
                .zip(&model)
                .map(|(w, p)| w * (w.dot(&pose.transform_point(p).coords) / w.dot(w)))
                .collect();
            pose = pose_from_points(&model, &points).ok()?;
        }
        Some(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypose_core::FxFyCxCySkew;
    use nalgebra::{Translation3, UnitQuaternion, Vector2};

    fn camera() -> CameraMatrix {
        CameraMatrix::from_params(&FxFyCxCySkew {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.0,
        })
        .unwrap()
    }

    fn scene() -> (Iso3, Vec<Pt3>) {
        let gt = Iso3::from_parts(
            Translation3::new(0.1, -0.05, 1.0),
            UnitQuaternion::from_euler_angles(0.1, -0.05, 0.2),
        );
        let mut model = Vec::new();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    model.push(Pt3::new(
                        x as Real * 0.1,
                        y as Real * 0.1,
                        0.5 + z as Real * 0.1,
                    ));
                }
            }
        }
        (gt, model)
    }

    #[test]
    fn too_few_points_is_none() {
        let cam = camera();
        let (gt, model) = scene();
        let image: Vec<Pt2> = model[..3]
            .iter()
            .map(|p| cam.project(&gt.transform_point(p)).unwrap())
            .collect();
        assert!(P3pRansac::default()
            .solve(&model[..3], &image, &cam)
            .is_none());
    }

    #[test]
    fn refit_on_clean_inliers_keeps_the_pose() {
        let cam = camera();
        let (gt, model) = scene();
        let data: Vec<Correspondence> = model
            .iter()
            .map(|p| Correspondence {
                pm: *p,
                px: cam.project(&gt.transform_point(p)).unwrap(),
                camera: cam,
            })
            .collect();
        let all: Vec<usize> = (0..data.len()).collect();

        let pose = P3pEstimator::refit(&data, &all).unwrap();
        assert!((pose.translation.vector - gt.translation.vector).norm() < 1e-6);
        assert!(pose.rotation.angle_to(&gt.rotation) < 1e-6);
    }

    #[test]
    fn refit_flag_still_recovers_noisy_pose() {
        let cam = camera();
        let (gt, model) = scene();
        let image: Vec<Pt2> = model
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let jitter = if i % 2 == 0 { 0.4 } else { -0.4 };
                cam.project(&gt.transform_point(p)).unwrap() + Vector2::new(jitter, -jitter)
            })
            .collect();
        let solver = P3pRansac::new(RansacOptions {
            refit_on_inliers: true,
            ..Default::default()
        });
        let (pose, inliers) = solver.estimate(&model, &image, &cam).unwrap();
        assert!(inliers.len() >= model.len() * 3 / 4);
        assert!((pose.translation.vector - gt.translation.vector).norm() < 0.05);
    }

    #[test]
    fn degenerate_collinear_sample_is_rejected() {
        let cam = camera();
        let data: Vec<Correspondence> = (0..4)
            .map(|i| Correspondence {
                pm: Pt3::new(i as Real, 0.0, 1.0),
                px: Pt2::origin(),
                camera: cam,
            })
            .collect();
        assert!(P3pEstimator::is_degenerate(&data, &[0, 1, 2, 3]));
    }
}
