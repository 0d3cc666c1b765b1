//! Closed-form geometry for keypoint pose estimation.
//!
//! - [`math`]: real polynomial roots used by minimal solvers.
//! - [`pnp`]: Kabsch alignment, the P3P minimal solver and the
//!   [`P3pRansac`] robust initializer implementing
//!   [`keypose_core::RobustPoseSolver`].

pub mod math;
pub mod pnp;

pub use pnp::{p3p, pose_from_points, P3pRansac, PnpError};

pub mod prelude {
    pub use crate::pnp::{p3p, pose_from_points, P3pRansac, PnpError};
}
