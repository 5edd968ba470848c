// ============================================================
// Layer 5 — ML / Model Layer (gbdt)
// ============================================================
// This layer contains ALL gbdt-specific code.
// No other layer imports from gbdt directly.
//
// What's in this layer:
//
//   model.rs  — GbdtRegressor: fits a squared-error gradient
//               boosted ensemble, predicts, and saves/loads
//               the JSON model artifact. Implements the
//               domain Regressor trait used by the server.
//
//   search.rs — Grid search with K-fold cross-validation
//               over n_estimators, max_depth, learning_rate
//               and subsample, candidates scored in parallel.
//
// Reference: gbdt crate documentation
//            Friedman (2001) Greedy Function Approximation

/// Gradient-boosted regressor and model artifact
pub mod model;

/// Hyperparameter grid search
pub mod search;
