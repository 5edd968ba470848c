// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any one
// business layer:
//
//   config.rs    — Settings: paths, cleaning and training
//                  tunables, loadable from a JSON file.
//
//   registry.rs  — Versioned model registry. Training runs
//                  register artifacts; the fetch step copies
//                  the latest version into the serving dir.
//
//   metrics.rs   — RMSE / MAE / R² and the per-candidate
//                  hyperparameter search log.
//
//   download.rs  — Fetches the raw dataset over HTTP.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Project settings
pub mod config;

/// Filesystem model registry
pub mod registry;

/// Evaluation metrics and search log
pub mod metrics;

/// Raw dataset download
pub mod download;
