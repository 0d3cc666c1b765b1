use keypose_core::{
    synthetic, CameraMatrix, FxFyCxCySkew, Iso3, Pt2, RansacOptions, RobustPoseSolver,
};
use keypose_linear::P3pRansac;

fn camera() -> CameraMatrix {
    CameraMatrix::from_params(&FxFyCxCySkew {
        fx: 900.0,
        fy: 900.0,
        cx: 640.0,
        cy: 360.0,
        skew: 0.0,
    })
    .unwrap()
}

fn rotation_error(a: &Iso3, b: &Iso3) -> f64 {
    a.rotation.angle_to(&b.rotation)
}

#[test]
fn recovers_skeleton_pose_without_outliers() {
    let cam = camera();
    let model = synthetic::skeleton_points();
    let gt = synthetic::pose_from_euler(0.2, -0.3, 0.1, [0.1, 0.05, 3.0]);
    let image = synthetic::project_points(&cam, &gt, &model).unwrap();

    let (est, inliers) = P3pRansac::default()
        .estimate(&model, &image, &cam)
        .expect("consensus on clean data");

    assert_eq!(inliers.len(), model.len());
    assert!((est.translation.vector - gt.translation.vector).norm() < 1e-5);
    assert!(rotation_error(&est, &gt) < 1e-5);
}

#[test]
fn tolerates_gross_outliers() {
    let cam = camera();
    let model = synthetic::skeleton_points();
    let gt = synthetic::pose_from_euler(-0.1, 0.4, -0.2, [-0.2, 0.1, 4.0]);
    let mut image = synthetic::project_points(&cam, &gt, &model).unwrap();

    let outliers = [2usize, 7, 11, 15];
    for (k, &i) in outliers.iter().enumerate() {
        image[i] += nalgebra::Vector2::new(120.0 + 30.0 * k as f64, -90.0);
    }

    let solver = P3pRansac::new(RansacOptions {
        max_iters: 500,
        ..RansacOptions::default()
    });
    let pose = solver.solve(&model, &image, &cam).expect("consensus");

    assert!(outliers.iter().all(|i| !pose.inliers.contains(i)));
    assert_eq!(pose.inliers.len(), model.len() - outliers.len());
    assert!((pose.translation - gt.translation.vector).norm() < 1e-5);
    let r_gt = gt.rotation.to_rotation_matrix().into_inner();
    assert!((pose.rotation_matrix() - r_gt).norm() < 1e-5);
}

#[test]
fn pure_noise_has_no_consensus() {
    let cam = camera();
    let model = synthetic::skeleton_points();
    let image: Vec<Pt2> = (0..model.len())
        .map(|i| Pt2::new((i * 97 % 1280) as f64, (i * 53 % 720) as f64))
        .collect();

    let solver = P3pRansac::new(RansacOptions {
        thresh: 0.5,
        min_inliers: 8,
        ..RansacOptions::default()
    });
    assert!(solver.solve(&model, &image, &cam).is_none());
}
