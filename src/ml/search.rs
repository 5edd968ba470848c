// ============================================================
// Layer 5 — Hyperparameter Grid Search
// ============================================================
// Exhaustive search over a parameter grid with K-fold
// cross-validation:
//
//   for every combination in the grid:          (in parallel)
//       for every fold k of K:
//           fit on the other K-1 folds
//           score RMSE on fold k
//       mean / std of the K scores
//   winner = lowest mean RMSE (first one on ties)
//
// Folds are contiguous slices of the (already shuffled)
// training set, so the search itself is deterministic apart
// from the booster's own row subsampling.
//
// Candidates are evaluated with rayon; each candidate builds
// its own training data and model, nothing is shared mutably.
//
// Reference: Hastie et al. (2009) ESL §7.10 (Cross-Validation)
//            rayon crate documentation

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::diamond::FeatureRow;
use crate::infra::metrics::EvalMetrics;
use crate::ml::model::GbdtRegressor;

/// Hyperparameters of one gradient-boosting fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostParams {
    /// Number of boosting rounds (trees)
    pub n_estimators:  usize,
    /// Maximum depth of each tree
    pub max_depth:     u32,
    /// Shrinkage applied to every tree's contribution
    pub learning_rate: f32,
    /// Fraction of rows sampled for each tree
    pub subsample:     f64,
}

/// Candidate values per hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub n_estimators:  Vec<usize>,
    pub max_depth:     Vec<u32>,
    pub learning_rate: Vec<f32>,
    pub subsample:     Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators:  vec![100, 300, 500],
            max_depth:     vec![3, 6],
            learning_rate: vec![0.05, 0.1],
            subsample:     vec![0.8, 1.0],
        }
    }
}

impl ParamGrid {
    pub fn is_empty(&self) -> bool {
        self.n_estimators.is_empty()
            || self.max_depth.is_empty()
            || self.learning_rate.is_empty()
            || self.subsample.is_empty()
    }

    /// Cartesian product of all values, in a stable order
    pub fn candidates(&self) -> Vec<BoostParams> {
        let mut out = Vec::new();
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &learning_rate in &self.learning_rate {
                    for &subsample in &self.subsample {
                        out.push(BoostParams { n_estimators, max_depth, learning_rate, subsample });
                    }
                }
            }
        }
        out
    }
}

/// Cross-validated score of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params:    BoostParams,
    pub mean_rmse: f64,
    pub std_rmse:  f64,
}

/// Outcome of a full search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best:    CandidateResult,
    pub results: Vec<CandidateResult>,
}

/// Contiguous K-fold index ranges over `n` rows.
/// The first `n % k` folds get one extra row.
pub fn kfold_ranges(n: usize, k: usize) -> Vec<std::ops::Range<usize>> {
    let base  = n / k;
    let extra = n % k;
    let mut ranges = Vec::with_capacity(k);
    let mut start  = 0;
    for i in 0..k {
        let len = base + usize::from(i < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Run the grid search over (x, y)
pub fn grid_search(
    x:     &[FeatureRow],
    y:     &[f64],
    grid:  &ParamGrid,
    folds: usize,
) -> Result<SearchOutcome> {
    anyhow::ensure!(x.len() == y.len(), "features and targets differ in length");
    anyhow::ensure!(folds >= 2, "need at least 2 folds, got {folds}");
    anyhow::ensure!(
        x.len() >= folds,
        "cannot split {} rows into {} folds",
        x.len(),
        folds
    );

    let candidates = grid.candidates();
    anyhow::ensure!(!candidates.is_empty(), "parameter grid is empty");

    let ranges = kfold_ranges(x.len(), folds);
    tracing::info!(
        "Fitting {} folds for each of {} candidates, totalling {} fits",
        folds,
        candidates.len(),
        folds * candidates.len()
    );

    let results: Vec<CandidateResult> = candidates
        .into_par_iter()
        .map(|params| score_candidate(x, y, &ranges, params))
        .collect::<Result<_>>()?;

    let best = results
        .iter()
        .fold(None::<&CandidateResult>, |best, r| match best {
            Some(b) if b.mean_rmse <= r.mean_rmse => Some(b),
            _ => Some(r),
        })
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("grid search produced no results"))?;

    tracing::info!("Best params: {:?} (cv rmse {:.3})", best.params, best.mean_rmse);
    Ok(SearchOutcome { best, results })
}

fn score_candidate(
    x:      &[FeatureRow],
    y:      &[f64],
    ranges: &[std::ops::Range<usize>],
    params: BoostParams,
) -> Result<CandidateResult> {
    let mut scores = Vec::with_capacity(ranges.len());

    for held_out in ranges {
        // Train on every row outside the held-out fold
        let (mut fx, mut fy) = (Vec::new(), Vec::new());
        for i in (0..x.len()).filter(|i| !held_out.contains(i)) {
            fx.push(x[i]);
            fy.push(y[i]);
        }

        let model = GbdtRegressor::fit(&fx, &fy, &params)?;
        let preds = model.predict_batch(&x[held_out.clone()]);
        let score = EvalMetrics::compute(&y[held_out.clone()], &preds)?;
        scores.push(score.rmse);
    }

    let n    = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let std  = (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();

    tracing::debug!("{:?}: rmse {:.3} ± {:.3}", params, mean, std);
    Ok(CandidateResult { params, mean_rmse: mean, std_rmse: std })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_has_24_candidates() {
        let c = ParamGrid::default().candidates();
        assert_eq!(c.len(), 24);
        assert_eq!(
            c[0],
            BoostParams { n_estimators: 100, max_depth: 3, learning_rate: 0.05, subsample: 0.8 }
        );
    }

    #[test]
    fn test_kfold_ranges_cover_all_rows() {
        let r = kfold_ranges(10, 3);
        assert_eq!(r, vec![0..4, 4..7, 7..10]);
        assert_eq!(kfold_ranges(9, 3), vec![0..3, 3..6, 6..9]);
    }

    #[test]
    fn test_rejects_too_few_rows() {
        let x = vec![[0.0; 9]; 2];
        let y = vec![1.0; 2];
        assert!(grid_search(&x, &y, &ParamGrid::default(), 3).is_err());
    }

    #[test]
    fn test_search_prefers_the_better_fit() {
        // price = 1000 · carat; a deeper, longer fit must win
        let x: Vec<FeatureRow> = (0..60)
            .map(|i| {
                let carat = 0.2 + (i % 20) as f64 * 0.1;
                [carat, 61.0, 56.0, 5.0, 5.0, 3.0, 2.0, 3.0, 4.0]
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|r| r[0] * 1000.0).collect();

        let grid = ParamGrid {
            n_estimators:  vec![1, 60],
            max_depth:     vec![4],
            learning_rate: vec![0.3],
            subsample:     vec![1.0],
        };
        let outcome = grid_search(&x, &y, &grid, 3).unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.best.params.n_estimators, 60);
        assert!(outcome.best.mean_rmse < outcome.results[0].mean_rmse);
    }
}
