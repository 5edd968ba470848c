// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Turns the raw diamonds CSV into a clean, fully encoded
// dataset and a reproducible train/test split:
//
//   Step 1: Load raw rows              (Layer 4 - loader)
//   Step 2: Drop zero-dimension rows   (x, y or z == 0)
//   Step 3: Remove IQR outliers        (Layer 4 - outlier)
//   Step 4: Encode cut/color/clarity   (Layer 3 - vocabulary)
//   Step 5: Persist processed CSV      (Layer 4 - store)
//   Step 6: Seeded train/test split    (Layer 4 - splitter)
//
// Each step is a strict precondition for the next. A failure
// in steps 1-4 aborts the run before anything is written, so
// a missing raw file or an unknown label never produces a
// partial processed dataset.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};

use crate::data::{
    dataset::{Dataset, TrainTestSplit},
    outlier,
    splitter::split_features,
    store::ProcessedStore,
};
use crate::domain::diamond::{EncodedDiamond, NumericColumn};
use crate::domain::traits::DatasetSource;
use crate::infra::config::Settings;

/// Row counts observed during one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrepareReport {
    pub raw_rows:        usize,
    pub zero_dim_rows:   usize,
    pub outlier_rows:    usize,
    pub processed_rows:  usize,
}

pub struct PrepareUseCase<S: DatasetSource> {
    source:          S,
    store:           ProcessedStore,
    outlier_columns: Vec<NumericColumn>,
    iqr_threshold:   f64,
    test_size:       f64,
    random_state:    u64,
}

impl<S: DatasetSource> PrepareUseCase<S> {
    pub fn new(source: S, settings: &Settings) -> Self {
        Self {
            source,
            store:           ProcessedStore::new(&settings.processed_data_path),
            outlier_columns: settings.outlier_columns.clone(),
            iqr_threshold:   settings.iqr_threshold,
            test_size:       settings.test_size,
            random_state:    settings.random_state,
        }
    }

    /// Steps 1-5: load, clean, encode and persist
    pub fn process(&self) -> Result<(Dataset<EncodedDiamond>, PrepareReport)> {
        tracing::info!("Data processing starting");
        let mut report = PrepareReport::default();

        // ── Step 1: Load raw rows ─────────────────────────────────────────────
        let mut raw = Dataset::new(self.source.load_all()?);
        report.raw_rows = raw.len();

        // ── Step 2: Drop physically impossible rows ───────────────────────────
        // A zero dimension is a data-entry defect, not a tiny diamond
        report.zero_dim_rows = raw.retain(|d| !d.has_zero_dimension());
        tracing::info!("Dropped {} rows with a zero dimension", report.zero_dim_rows);

        // ── Step 3: Remove outliers ───────────────────────────────────────────
        report.outlier_rows = outlier::filter(&mut raw, &self.outlier_columns, self.iqr_threshold);

        // ── Step 4: Ordinal encoding ──────────────────────────────────────────
        // Same encoder the server uses for incoming requests
        let encoded = raw
            .rows()
            .iter()
            .enumerate()
            .map(|(i, d)| d.encode().with_context(|| format!("Cannot encode cleaned row {i}")))
            .collect::<Result<Vec<_>>>()?;
        let encoded = Dataset::new(encoded);
        report.processed_rows = encoded.len();

        // ── Step 5: Persist ───────────────────────────────────────────────────
        self.store.save(&encoded)?;

        tracing::info!(
            "Processing done: {} raw → {} processed rows in '{}'",
            report.raw_rows,
            report.processed_rows,
            self.store.path().display()
        );
        Ok((encoded, report))
    }

    /// Step 6: seeded split into features/target
    pub fn split(&self, dataset: &Dataset<EncodedDiamond>) -> TrainTestSplit {
        let x = dataset.rows().iter().map(EncodedDiamond::feature_row).collect();
        let y = dataset.rows().iter().map(|d| d.price).collect();
        split_features(x, y, self.test_size, self.random_state)
    }

    /// Full pipeline: steps 1-6
    pub fn execute(&self) -> Result<TrainTestSplit> {
        let (dataset, _) = self.process()?;
        anyhow::ensure!(!dataset.is_empty(), "no rows left after cleaning");

        let split = self.split(&dataset);
        tracing::info!("Split: {} train, {} test", split.train_len(), split.test_len());
        Ok(split)
    }
}
