//! Keypoint correspondences between a 3D model and 2D detections.

use crate::{to_homogeneous, PoseError, Pt2, Pt3, Real, Vec3};

/// A set of `N` keypoint detections paired 1:1 (by index) with model points.
///
/// Each detection is a homogeneous pixel `(u, v, 1)` with a non-negative
/// confidence weight. Zero-weight points are kept: they do not influence the
/// fit but still receive a depth estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointObservations {
    pixels: Vec<Vec3>,
    model_points: Vec<Pt3>,
    confidences: Vec<Real>,
}

impl KeypointObservations {
    /// Build a validated observation set from homogeneous pixels.
    ///
    /// Fails when the set is empty, the three inputs disagree in length, a
    /// value is not finite, or a confidence is negative.
    pub fn new(
        pixels: Vec<Vec3>,
        model_points: Vec<Pt3>,
        confidences: Vec<Real>,
    ) -> Result<Self, PoseError> {
        if pixels.len() != model_points.len() || pixels.len() != confidences.len() {
            return Err(PoseError::ShapeMismatch {
                pixels: pixels.len(),
                model_points: model_points.len(),
                confidences: confidences.len(),
            });
        }
        if pixels.is_empty() {
            return Err(PoseError::EmptyInput);
        }

        for (index, ((px, pm), &d)) in pixels
            .iter()
            .zip(model_points.iter())
            .zip(confidences.iter())
            .enumerate()
        {
            let finite = px.iter().all(|v| v.is_finite())
                && pm.coords.iter().all(|v| v.is_finite())
                && d.is_finite();
            if !finite {
                return Err(PoseError::NonFiniteInput { index });
            }
            if d < 0.0 {
                return Err(PoseError::NegativeConfidence { index, value: d });
            }
        }

        Ok(Self {
            pixels,
            model_points,
            confidences,
        })
    }

    /// Build from plain pixel coordinates, appending the homogeneous `1`.
    pub fn from_pixels(
        pixels: &[Pt2],
        model_points: Vec<Pt3>,
        confidences: Vec<Real>,
    ) -> Result<Self, PoseError> {
        Self::new(
            pixels.iter().map(to_homogeneous).collect(),
            model_points,
            confidences,
        )
    }

    /// Number of correspondences.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always `false` for a validated set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    pub fn model_points(&self) -> &[Pt3] {
        &self.model_points
    }

    pub fn confidences(&self) -> &[Real] {
        &self.confidences
    }

    /// Raw pixel position of detection `idx` (first two homogeneous components).
    pub fn pixel_xy(&self, idx: usize) -> Pt2 {
        let h = self.pixels[idx];
        Pt2::new(h.x, h.y)
    }

    /// Indices whose confidence is strictly greater than `threshold`.
    pub fn confident_indices(&self, threshold: Real) -> Vec<usize> {
        self.confidences
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sum of all confidence weights.
    pub fn total_weight(&self) -> Real {
        self.confidences.iter().sum()
    }
}
