use super::PnpError;
use keypose_core::{Iso3, Mat3, Pt3, Real, Vec3};
use nalgebra::{Rotation3, Translation3, UnitQuaternion};

/// Rigid transform aligning model points onto camera-frame points (Kabsch).
///
/// Centroids are removed, the rotation comes from the SVD of the
/// cross-covariance with the last column of `U` negated when the product
/// would be a reflection. Returns `T_C_M`.
pub fn pose_from_points(model: &[Pt3], camera: &[Vec3]) -> Result<Iso3, PnpError> {
    if model.len() != camera.len() || model.len() < 3 {
        return Err(PnpError::DegeneratePoints);
    }

    let n = model.len() as Real;
    let c_m = model.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords) / n;
    let c_c = camera.iter().fold(Vec3::zeros(), |acc, p| acc + p) / n;

    let h = model
        .iter()
        .zip(camera)
        .fold(Mat3::zeros(), |acc, (pm, pc)| {
            acc + (pc - c_c) * (pm.coords - c_m).transpose()
        });

    let svd = h.svd(true, true);
    let mut u = svd.u.ok_or(PnpError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(PnpError::SvdFailed)?;
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        u.column_mut(2).neg_mut();
        r = u * v_t;
    }

    let t = c_c - r * c_m;
    let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r));
    Ok(Iso3::from_parts(Translation3::from(t), rot))
}
