// ============================================================
// Layer 6 — Regression Metrics & Search Log
// ============================================================
// Scores predictions against held-out targets and records the
// outcome of every hyperparameter candidate.
//
// Metrics:
//   - rmse: root mean squared error  (same unit as price)
//   - mae:  mean absolute error      (same unit as price)
//   - r2:   coefficient of determination, 1.0 is a perfect fit
//
// The search log is a CSV with one row per candidate, written
// next to the registered model so a run can be inspected later:
//
//   n_estimators,max_depth,learning_rate,subsample,mean_rmse,std_rmse,rank
//   300,6,0.1,0.8,541.223,12.871,1
//   ...
//
// How to read it:
//   - rank 1 is the candidate that was refit and registered
//   - a large std_rmse means the folds disagree (unstable fit)
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ml::search::CandidateResult;

/// Hold-out scores of a fitted model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub rmse: f64,
    pub mae:  f64,
    pub r2:   f64,
}

impl EvalMetrics {
    /// Score `predicted` against `actual`.
    /// Both slices must be non-empty and of equal length.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        anyhow::ensure!(
            actual.len() == predicted.len(),
            "length mismatch: {} targets, {} predictions",
            actual.len(),
            predicted.len()
        );
        anyhow::ensure!(!actual.is_empty(), "cannot score an empty set");

        let n    = actual.len() as f64;
        let mean = actual.iter().sum::<f64>() / n;

        let mut sq_err  = 0.0;
        let mut abs_err = 0.0;
        let mut sq_tot  = 0.0;
        for (&a, &p) in actual.iter().zip(predicted) {
            sq_err  += (a - p).powi(2);
            abs_err += (a - p).abs();
            sq_tot  += (a - mean).powi(2);
        }

        // A constant target has no variance to explain
        let r2 = if sq_tot == 0.0 {
            if sq_err == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - sq_err / sq_tot
        };

        Ok(Self { rmse: (sq_err / n).sqrt(), mae: abs_err / n, r2 })
    }
}

/// One row of the search log
#[derive(Debug, Serialize)]
struct SearchLogRow {
    n_estimators:  usize,
    max_depth:     u32,
    learning_rate: f32,
    subsample:     f64,
    mean_rmse:     f64,
    std_rmse:      f64,
    rank:          usize,
}

/// Write all candidate results, best first, to `path`
pub fn write_search_log(path: &Path, results: &[CandidateResult]) -> Result<()> {
    let mut sorted: Vec<&CandidateResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.mean_rmse.total_cmp(&b.mean_rmse));

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create search log '{}'", path.display()))?;

    for (i, r) in sorted.iter().enumerate() {
        writer.serialize(SearchLogRow {
            n_estimators:  r.params.n_estimators,
            max_depth:     r.params.max_depth,
            learning_rate: r.params.learning_rate,
            subsample:     r.params.subsample,
            mean_rmse:     r.mean_rmse,
            std_rmse:      r.std_rmse,
            rank:          i + 1,
        })?;
    }
    writer.flush()?;

    tracing::debug!("Wrote {} search results to '{}'", sorted.len(), path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::search::BoostParams;

    #[test]
    fn test_perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        let m = EvalMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_known_errors() {
        // errors: +1, -1, +2, -2 → mse 2.5, mae 1.5
        let actual    = [10.0, 20.0, 30.0, 40.0];
        let predicted = [11.0, 19.0, 32.0, 38.0];
        let m = EvalMetrics::compute(&actual, &predicted).unwrap();
        assert!((m.rmse - 2.5f64.sqrt()).abs() < 1e-12);
        assert!((m.mae - 1.5).abs() < 1e-12);
        // ss_tot = 500 → r2 = 1 - 10/500
        assert!((m.r2 - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_mean_predictor_scores_zero_r2() {
        let actual    = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 2.0];
        let m = EvalMetrics::compute(&actual, &predicted).unwrap();
        assert!(m.r2.abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(EvalMetrics::compute(&[1.0], &[1.0, 2.0]).is_err());
        assert!(EvalMetrics::compute(&[], &[]).is_err());
    }

    #[test]
    fn test_search_log_ranks_best_first() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.csv");
        let params = BoostParams { n_estimators: 10, max_depth: 3, learning_rate: 0.1, subsample: 1.0 };
        let results = vec![
            CandidateResult { params: params.clone(), mean_rmse: 9.0, std_rmse: 1.0 },
            CandidateResult { params, mean_rmse: 4.0, std_rmse: 0.5 },
        ];
        write_search_log(&path, &results).unwrap();

        let text  = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "n_estimators,max_depth,learning_rate,subsample,mean_rmse,std_rmse,rank");
        assert!(lines[1].contains(",4.0,0.5,1"));
        assert!(lines[2].ends_with(",2"));
    }
}
