use keypose_core::{PoseError, Real};
use serde::{Deserialize, Serialize};

/// Options controlling initialization and the alternating refinement loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineOptions {
    /// Iteration budget for the refinement loop. Must be at least 1.
    pub max_iters: usize,
    /// Stop once `|r_prev − r| / (r + ε)` falls below this value.
    pub thresh: Real,
    /// Allow the robust solver to seed the pose.
    pub use_robust_init: bool,
    /// Detections with confidence strictly above this feed the robust solver.
    pub confidence_threshold: Real,
    /// Minimum number of confident detections before the robust solver is tried.
    pub min_confident: usize,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            thresh: 1e-3,
            use_robust_init: true,
            confidence_threshold: 0.3,
            min_confident: 4,
        }
    }
}

impl RefineOptions {
    pub fn validate(&self) -> Result<(), PoseError> {
        if self.max_iters == 0 {
            return Err(PoseError::InvalidOptions(
                "max_iters must be positive".to_string(),
            ));
        }
        if !(self.thresh.is_finite() && self.thresh > 0.0) {
            return Err(PoseError::InvalidOptions(format!(
                "thresh must be a positive finite number, got {}",
                self.thresh
            )));
        }
        if !self.confidence_threshold.is_finite() {
            return Err(PoseError::InvalidOptions(
                "confidence_threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_configuration() {
        let opts = RefineOptions::default();
        assert_eq!(opts.max_iters, 1000);
        assert_eq!(opts.thresh, 1e-3);
        assert!(opts.use_robust_init);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let opts: RefineOptions =
            serde_json::from_str(r#"{"max_iters": 50, "use_robust_init": false}"#).unwrap();
        assert_eq!(opts.max_iters, 50);
        assert!(!opts.use_robust_init);
        assert_eq!(opts.thresh, 1e-3);
        assert_eq!(opts.min_confident, 4);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let zero_iters = RefineOptions {
            max_iters: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_iters.validate(),
            Err(PoseError::InvalidOptions(_))
        ));

        for thresh in [0.0, -1.0, Real::NAN] {
            let opts = RefineOptions {
                thresh,
                ..Default::default()
            };
            assert!(opts.validate().is_err(), "thresh {thresh} accepted");
        }
    }
}
