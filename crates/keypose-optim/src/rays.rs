use keypose_core::{CameraMatrix, PoseError, Real, Vec3};

/// Map homogeneous pixel detections to normalized camera rays `W = K⁻¹ · x`.
///
/// Rays are not rescaled; with a unit third pixel component they lie on the
/// `z = 1` plane. A ray of (numerically) zero length is rejected since its
/// depth cannot be recovered.
pub fn normalize_rays(camera: &CameraMatrix, pixels_h: &[Vec3]) -> Result<Vec<Vec3>, PoseError> {
    pixels_h
        .iter()
        .enumerate()
        .map(|(index, px)| {
            let ray = camera.pixel_to_ray(px);
            if !(ray.norm_squared() > Real::MIN_POSITIVE) || !ray.iter().all(|v| v.is_finite()) {
                return Err(PoseError::DegenerateRay { index });
            }
            Ok(ray)
        })
        .collect()
}
