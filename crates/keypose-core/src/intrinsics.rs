use crate::{from_homogeneous, Mat3, PoseError, Pt2, Pt3, Real, Vec3};
use nalgebra::{Matrix3, RealField};
use serde::{Deserialize, Serialize};

/// Standard pinhole intrinsics with optional skew.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FxFyCxCySkew<S: RealField + Copy> {
    /// Focal length in pixels along X.
    pub fx: S,
    /// Focal length in pixels along Y.
    pub fy: S,
    /// Principal point X coordinate in pixels.
    pub cx: S,
    /// Principal point Y coordinate in pixels.
    pub cy: S,
    /// Skew term (typically 0).
    #[serde(default = "S::zero")]
    pub skew: S,
}

impl<S: RealField + Copy> FxFyCxCySkew<S> {
    /// Return the 3x3 camera intrinsics matrix K.
    pub fn k_matrix(&self) -> Matrix3<S> {
        Matrix3::new(
            self.fx,
            self.skew,
            self.cx,
            S::zero(),
            self.fy,
            self.cy,
            S::zero(),
            S::zero(),
            S::one(),
        )
    }
}

/// A calibrated, invertible intrinsics matrix `K` together with `K⁻¹`.
///
/// Invertibility is checked once on construction so downstream code can map
/// pixels to rays without re-validating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrix {
    k: Mat3,
    k_inv: Mat3,
}

impl CameraMatrix {
    /// Wrap a general 3x3 intrinsics matrix.
    ///
    /// Fails with [`PoseError::SingularIntrinsics`] when `k` has non-finite
    /// entries or a (numerically) zero determinant.
    pub fn new(k: Mat3) -> Result<Self, PoseError> {
        if k.iter().any(|v| !v.is_finite()) {
            return Err(PoseError::SingularIntrinsics);
        }
        if k.determinant().abs() < 1e-12 {
            return Err(PoseError::SingularIntrinsics);
        }
        let k_inv = k.try_inverse().ok_or(PoseError::SingularIntrinsics)?;
        if k_inv.iter().any(|v| !v.is_finite()) {
            return Err(PoseError::SingularIntrinsics);
        }
        Ok(Self { k, k_inv })
    }

    /// Build from focal lengths, principal point and skew.
    pub fn from_params(params: &FxFyCxCySkew<Real>) -> Result<Self, PoseError> {
        Self::new(params.k_matrix())
    }

    /// The intrinsics matrix `K`.
    pub fn matrix(&self) -> &Mat3 {
        &self.k
    }

    /// The inverse intrinsics matrix `K⁻¹`.
    pub fn inverse(&self) -> &Mat3 {
        &self.k_inv
    }

    /// Map a homogeneous pixel `(u, v, w)` to its normalized camera ray.
    ///
    /// No perspective division is applied; for `w = 1` the ray lies on the
    /// `z = 1` plane.
    pub fn pixel_to_ray(&self, pixel_h: &Vec3) -> Vec3 {
        self.k_inv * pixel_h
    }

    /// Project a camera-frame point to pixels.
    ///
    /// Returns `None` for points on or behind the camera plane.
    pub fn project(&self, p_c: &Pt3) -> Option<Pt2> {
        if p_c.z <= 0.0 {
            return None;
        }
        Some(from_homogeneous(&(self.k * p_c.coords)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k() -> FxFyCxCySkew<Real> {
        FxFyCxCySkew {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.0,
        }
    }

    #[test]
    fn principal_point_maps_to_optical_axis() {
        let cam = CameraMatrix::from_params(&k()).unwrap();
        let ray = cam.pixel_to_ray(&Vec3::new(640.0, 360.0, 1.0));
        assert!(ray.xy().norm() < 1e-12);
        assert!((ray.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn project_then_backproject_is_consistent() {
        let cam = CameraMatrix::from_params(&k()).unwrap();
        let p = Pt3::new(0.1, -0.2, 2.0);
        let uv = cam.project(&p).unwrap();
        let ray = cam.pixel_to_ray(&Vec3::new(uv.x, uv.y, 1.0));
        let back = ray * p.z;
        assert!((back - p.coords).norm() < 1e-9);
    }

    #[test]
    fn project_rejects_points_behind_camera() {
        let cam = CameraMatrix::from_params(&k()).unwrap();
        assert!(cam.project(&Pt3::new(0.0, 0.0, -1.0)).is_none());
        assert!(cam.project(&Pt3::new(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let m = Mat3::new(800.0, 0.0, 640.0, 800.0, 0.0, 640.0, 0.0, 0.0, 1.0);
        assert_eq!(CameraMatrix::new(m), Err(PoseError::SingularIntrinsics));
        assert_eq!(
            CameraMatrix::new(Mat3::from_element(Real::NAN)),
            Err(PoseError::SingularIntrinsics)
        );
    }

    #[test]
    fn intrinsics_deserialize_without_skew() {
        let json = r#"{"fx": 500.0, "fy": 500.0, "cx": 320.0, "cy": 240.0}"#;
        let params: FxFyCxCySkew<Real> = serde_json::from_str(json).unwrap();
        assert_eq!(params.skew, 0.0);
        assert_eq!(params.k_matrix()[(0, 2)], 320.0);
    }
}
