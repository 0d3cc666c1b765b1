//! Perspective-n-Point solvers used to seed the pose refiner.
//!
//! All poses are `T_C_M`: the transform taking model-frame points into the
//! camera frame.

mod p3p;
mod pose_utils;
mod ransac;

use thiserror::Error;

pub use p3p::p3p;
pub use pose_utils::pose_from_points;
pub use ransac::P3pRansac;

/// Errors from the rigid alignment helpers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PnpError {
    /// Fewer than three points, or the two point sets differ in length.
    #[error("degenerate point configuration")]
    DegeneratePoints,
    /// SVD did not produce both singular vector matrices.
    #[error("svd failed during rigid alignment")]
    SvdFailed,
}
