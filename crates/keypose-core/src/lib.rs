//! Core math and geometry primitives for `keypose`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, ...),
//! - validated pinhole intrinsics ([`CameraMatrix`]),
//! - keypoint observation sets with boundary validation,
//! - the robust initial-pose capability ([`RobustPoseSolver`]),
//! - a generic RANSAC engine ([`ransac`], [`Estimator`]),
//! - deterministic synthetic scene helpers for tests and demos.
//!
//! Pixel to ray mapping:
//! `ray = K⁻¹ · [u, v, 1]ᵀ`

/// Boundary validation errors.
pub mod error;
/// Camera intrinsics.
pub mod intrinsics;
/// Linear algebra type aliases and helpers.
pub mod math;
/// 2D-3D keypoint correspondences with confidences.
pub mod observation;
/// Generic RANSAC engine and traits.
pub mod ransac;
/// Pluggable robust pose initialization capability.
pub mod robust;
pub mod synthetic;

pub use error::*;
pub use intrinsics::*;
pub use math::*;
pub use observation::*;
pub use ransac::*;
pub use robust::*;
