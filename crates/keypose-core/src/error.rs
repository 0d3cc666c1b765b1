use thiserror::Error;

/// Errors raised when pose inputs or options violate the solver preconditions.
///
/// These are checked once at the boundary; the numerical loop itself never
/// fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    /// No keypoints were provided.
    #[error("at least one keypoint is required")]
    EmptyInput,
    /// Detections, model points and confidences disagree in length.
    #[error(
        "shape mismatch: {pixels} detections, {model_points} model points, {confidences} confidences"
    )]
    ShapeMismatch {
        pixels: usize,
        model_points: usize,
        confidences: usize,
    },
    /// Intrinsics matrix is not invertible (or not finite).
    #[error("intrinsics matrix is not invertible")]
    SingularIntrinsics,
    /// A confidence weight is negative.
    #[error("confidence {value} at index {index} is negative")]
    NegativeConfidence { index: usize, value: f64 },
    /// A detection, model point or confidence contains NaN or infinity.
    #[error("non-finite value in keypoint {index}")]
    NonFiniteInput { index: usize },
    /// A detection maps to a zero-length camera ray.
    #[error("keypoint {index} maps to a degenerate camera ray")]
    DegenerateRay { index: usize },
    /// Solver options are out of range.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}
