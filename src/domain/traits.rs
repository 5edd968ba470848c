// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, not
// against the CSV reader or the gradient-boosting crate:
//
//   DatasetSource — anything that yields raw diamond rows
//                   (CsvDiamondSource reads the raw CSV file)
//   Regressor     — anything that maps a feature row to a price
//                   (GbdtRegressor in production, a fake in tests)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::diamond::{Diamond, FeatureRow};

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Any component that can load the raw diamonds dataset.
pub trait DatasetSource {
    /// Load every raw row, in source order.
    /// A missing source fails with `DataSourceError`.
    fn load_all(&self) -> Result<Vec<Diamond>>;
}

// ─── Regressor ────────────────────────────────────────────────────────────────
/// A trained model as seen by the prediction service:
/// an opaque artifact exposing a single `predict` capability.
///
/// Implementations must be immutable after loading: the
/// service shares one instance across concurrent requests
/// without any locking.
pub trait Regressor: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> Result<f64>;
}
