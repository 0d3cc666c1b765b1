use nalgebra::{Isometry3, Matrix3, Point2, Point3, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Convert a 2D pixel into homogeneous coordinates `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// The caller is responsible for ensuring that `v.z != 0`.
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Geodesic angle (radians) between two rotation matrices.
pub fn rotation_angle_between(a: &Mat3, b: &Mat3) -> Real {
    let trace = (a.transpose() * b).trace();
    ((trace - 1.0) * 0.5).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;

    #[test]
    fn homogeneous_roundtrip_keeps_pixel() {
        let p = Pt2::new(320.5, -12.0);
        let h = to_homogeneous(&p);
        assert_eq!(h.z, 1.0);
        assert_eq!(from_homogeneous(&(h * 3.0)), p);
    }

    #[test]
    fn rotation_angle_matches_axis_angle() {
        let r = Rotation3::from_axis_angle(&Vec3::z_axis(), 0.3);
        let ang = rotation_angle_between(&Mat3::identity(), r.matrix());
        assert!((ang - 0.3).abs() < 1e-12);
    }
}
