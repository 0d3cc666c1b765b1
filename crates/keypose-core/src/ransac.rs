//! Generic, model-agnostic RANSAC.
//!
//! Implement [`Estimator`] for a model and call [`ransac`] with the data and
//! [`RansacOptions`]. A failed search is not an error: the returned
//! [`RansacResult`] simply has `model == None`.

use rand::{rngs::StdRng, seq::index, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration parameters for the generic RANSAC engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacOptions {
    /// Maximum number of hypotheses to draw.
    pub max_iters: usize,
    /// Inlier residual threshold (same units as [`Estimator::residual`]).
    pub thresh: f64,
    /// Minimum consensus size required to accept a model.
    pub min_inliers: usize,
    /// Desired probability in `[0, 1)` of drawing at least one clean sample.
    pub confidence: f64,
    /// Random-number generator seed (for reproducibility).
    pub seed: u64,
    /// If `true`, refit the model on its consensus set before scoring.
    pub refit_on_inliers: bool,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            max_iters: 100,
            thresh: 8.0,
            min_inliers: 4,
            confidence: 0.99,
            seed: 1_234_567,
            refit_on_inliers: false,
        }
    }
}

/// Output of a RANSAC run.
#[derive(Debug, Clone)]
pub struct RansacResult<M> {
    /// Best model found, `None` when no hypothesis reached `min_inliers`.
    pub model: Option<M>,
    /// Indices of inlier data points for `model`.
    pub inliers: Vec<usize>,
    /// Root-mean-square residual over inliers.
    pub inlier_rms: f64,
    /// Number of hypotheses actually drawn.
    pub iters: usize,
}

impl<M> RansacResult<M> {
    pub fn success(&self) -> bool {
        self.model.is_some()
    }
}

impl<M> Default for RansacResult<M> {
    fn default() -> Self {
        Self {
            model: None,
            inliers: Vec::new(),
            inlier_rms: f64::INFINITY,
            iters: 0,
        }
    }
}

/// Hypothesis generator and scorer for [`ransac`].
pub trait Estimator {
    type Datum;
    type Model;

    /// Number of samples drawn per hypothesis.
    const MIN_SAMPLES: usize;

    /// Fit a model from the sampled indices; `None` if fitting fails.
    fn fit(data: &[Self::Datum], sample_indices: &[usize]) -> Option<Self::Model>;

    /// Non-negative residual of one datum, in the units of `opts.thresh`.
    fn residual(model: &Self::Model, datum: &Self::Datum) -> f64;

    /// Reject a sample before fitting. Default: accept every sample.
    fn is_degenerate(_data: &[Self::Datum], _sample_indices: &[usize]) -> bool {
        false
    }

    /// Refit on a full consensus set. Default: keep the minimal-sample model.
    fn refit(_data: &[Self::Datum], _inliers: &[usize]) -> Option<Self::Model> {
        None
    }
}

struct Consensus {
    inliers: Vec<usize>,
    rms: f64,
}

fn consensus<E: Estimator>(model: &E::Model, data: &[E::Datum], thresh: f64) -> Consensus {
    let mut inliers = Vec::with_capacity(data.len());
    let mut ss = 0.0;
    for (i, datum) in data.iter().enumerate() {
        let r = E::residual(model, datum);
        if r <= thresh {
            inliers.push(i);
            ss += r * r;
        }
    }
    let rms = if inliers.is_empty() {
        f64::INFINITY
    } else {
        (ss / inliers.len() as f64).sqrt()
    };
    Consensus { inliers, rms }
}

/// Adaptive hypothesis budget `log(1 - p) / log(1 - wᵐ)`, clamped to
/// `[iters_so_far, max_iters]`.
fn adaptive_budget(
    confidence: f64,
    inlier_ratio: f64,
    min_samples: usize,
    iters_so_far: usize,
    max_iters: usize,
) -> usize {
    if confidence <= 0.0 || confidence >= 1.0 || inlier_ratio <= 0.0 {
        return max_iters;
    }
    let denom = (1.0 - inlier_ratio.powi(min_samples as i32)).max(1e-12).ln();
    if denom >= 0.0 {
        return max_iters;
    }
    let needed = ((1.0 - confidence).ln() / denom).ceil() as usize;
    needed.clamp(iters_so_far, max_iters)
}

/// Run RANSAC for the given [`Estimator`].
///
/// Models are ranked by inlier count, ties broken by lower inlier RMS.
pub fn ransac<E: Estimator>(data: &[E::Datum], opts: &RansacOptions) -> RansacResult<E::Model> {
    let mut best: RansacResult<E::Model> = RansacResult::default();
    if data.len() < E::MIN_SAMPLES {
        return best;
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut budget = opts.max_iters;
    let mut sample = Vec::with_capacity(E::MIN_SAMPLES);
    let mut iters = 0;

    while iters < budget {
        iters += 1;
        sample.clear();
        sample.extend(index::sample(&mut rng, data.len(), E::MIN_SAMPLES).into_iter());

        if E::is_degenerate(data, &sample) {
            continue;
        }
        let Some(mut model) = E::fit(data, &sample) else {
            continue;
        };

        let mut score = consensus::<E>(&model, data, opts.thresh);
        if score.inliers.len() < opts.min_inliers {
            continue;
        }
        if opts.refit_on_inliers {
            if let Some(refined) = E::refit(data, &score.inliers) {
                let refined_score = consensus::<E>(&refined, data, opts.thresh);
                if refined_score.inliers.len() >= score.inliers.len() {
                    model = refined;
                    score = refined_score;
                }
            }
        }

        let better = best.model.is_none()
            || score.inliers.len() > best.inliers.len()
            || (score.inliers.len() == best.inliers.len() && score.rms < best.inlier_rms);
        if better {
            let ratio = score.inliers.len() as f64 / data.len() as f64;
            best.model = Some(model);
            best.inliers = score.inliers;
            best.inlier_rms = score.rms;
            budget = adaptive_budget(opts.confidence, ratio, E::MIN_SAMPLES, iters, opts.max_iters);
        }
    }

    best.iters = iters;
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Line {
        slope: f64,
        intercept: f64,
    }

    struct LineEstimator;

    impl Estimator for LineEstimator {
        type Datum = (f64, f64);
        type Model = Line;

        const MIN_SAMPLES: usize = 2;

        fn fit(data: &[Self::Datum], sample_indices: &[usize]) -> Option<Self::Model> {
            let p0 = data[sample_indices[0]];
            let p1 = data[sample_indices[1]];
            let dx = p1.0 - p0.0;
            if dx.abs() < 1e-9 {
                return None;
            }
            let slope = (p1.1 - p0.1) / dx;
            Some(Line {
                slope,
                intercept: p0.1 - slope * p0.0,
            })
        }

        fn residual(model: &Self::Model, datum: &Self::Datum) -> f64 {
            let (x, y) = *datum;
            (model.slope * x - y + model.intercept).abs() / (model.slope.powi(2) + 1.0).sqrt()
        }

        fn refit(data: &[Self::Datum], inliers: &[usize]) -> Option<Self::Model> {
            let n = inliers.len() as f64;
            let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
            for &i in inliers {
                let (x, y) = data[i];
                sx += x;
                sy += y;
                sxx += x * x;
                sxy += x * y;
            }
            let denom = n * sxx - sx * sx;
            if denom.abs() < 1e-12 {
                return None;
            }
            let slope = (n * sxy - sx * sy) / denom;
            Some(Line {
                slope,
                intercept: (sy - slope * sx) / n,
            })
        }
    }

    fn opts() -> RansacOptions {
        RansacOptions {
            max_iters: 500,
            thresh: 0.05,
            min_inliers: 6,
            confidence: 0.99,
            seed: 42,
            refit_on_inliers: true,
        }
    }

    #[test]
    fn insufficient_data_is_not_a_panic() {
        let res = ransac::<LineEstimator>(&[(0.0, 0.0)], &opts());
        assert!(!res.success());
        assert!(res.inliers.is_empty());
        assert_eq!(res.iters, 0);
    }

    #[test]
    fn recovers_line_with_outliers() {
        let mut data: Vec<(f64, f64)> = (0..10)
            .map(|i| {
                let x = i as f64 * 0.5;
                (x, 2.0 * x + 1.0 + if i % 2 == 0 { 0.01 } else { -0.01 })
            })
            .collect();
        data.extend([(5.0, -3.0), (6.0, 10.0), (7.0, -8.0)]);

        let res = ransac::<LineEstimator>(&data, &opts());
        let model = res.model.expect("consensus expected");
        assert!((model.slope - 2.0).abs() < 0.05);
        assert!((model.intercept - 1.0).abs() < 0.05);
        assert!(res.inliers.len() >= 8);
        assert!(res.inliers.iter().all(|&i| i < 10));
        assert!(res.iters <= 500);
    }

    #[test]
    fn same_seed_is_reproducible() {
        let data: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, (i % 7) as f64)).collect();
        let mut o = opts();
        o.min_inliers = 2;
        let a = ransac::<LineEstimator>(&data, &o);
        let b = ransac::<LineEstimator>(&data, &o);
        assert_eq!(a.inliers, b.inliers);
        assert_eq!(a.iters, b.iters);
    }

    #[test]
    fn adaptive_budget_shrinks_with_clean_data() {
        assert_eq!(adaptive_budget(0.99, 0.0, 4, 1, 100), 100);
        let n = adaptive_budget(0.99, 1.0, 4, 1, 100);
        assert_eq!(n, 1);
        let n = adaptive_budget(0.99, 0.5, 4, 3, 1000);
        assert!(n > 3 && n < 1000, "budget {n}");
    }
}
