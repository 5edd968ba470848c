// ============================================================
// Layer 4 — Raw Dataset Loader
// ============================================================
// Reads the raw diamonds CSV into `Diamond` rows using the
// csv crate's serde integration.
//
// The seaborn export quotes its header names and has the
// columns carat, cut, color, clarity, depth, table, price,
// x, y, z. Columns are matched by header name, so a file
// with a different column order (or extra columns such as a
// leading index) still loads.
//
// Unlike a best-effort loader, a missing file is fatal here:
// the pipeline must abort with a DataSourceError before it
// writes anything.
//
// Reference: csv crate documentation (serde deserialization)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::domain::diamond::Diamond;
use crate::domain::error::DataSourceError;
use crate::domain::traits::DatasetSource;

/// Loads raw diamond rows from a CSV file with a header row.
pub struct CsvDiamondSource {
    path: PathBuf,
}

impl CsvDiamondSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for CsvDiamondSource {
    fn load_all(&self) -> Result<Vec<Diamond>> {
        if !self.path.exists() {
            return Err(DataSourceError { path: self.path.clone() }.into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open '{}'", self.path.display()))?;

        let mut rows = Vec::new();
        for (i, record) in reader.deserialize::<Diamond>().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let row = record.with_context(|| {
                format!("Malformed row at line {} of '{}'", i + 2, self.path.display())
            })?;
            rows.push(row);
        }

        tracing::info!("Loaded {} raw rows from '{}'", rows.len(), self.path.display());
        Ok(rows)
    }
}
