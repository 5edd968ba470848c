// ============================================================
// Layer 6 — Settings
// ============================================================
// All paths and tunables of the project in one serialisable
// struct. `Settings::default()` is the standard configuration;
// a JSON file passed with `--config` overrides any subset of
// keys (missing keys keep their default thanks to
// #[serde(default)]).
//
// Example override file:
//   {
//     "iqr_threshold": 3.0,
//     "param_grid": { "n_estimators": [50], "max_depth": [4],
//                     "learning_rate": [0.1], "subsample": [1.0] }
//   }
//
// Reference: serde crate documentation (field attributes)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::domain::diamond::NumericColumn;
use crate::ml::search::ParamGrid;

/// Public copy of the seaborn diamonds dataset
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/mwaskom/seaborn-data/master/diamonds.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Data ──────────────────────────────────────────────────────────────────
    pub dataset_url:         String,
    pub raw_data_path:       PathBuf,
    pub processed_data_path: PathBuf,

    // ── Registry & serving ────────────────────────────────────────────────────
    pub registry_dir:    PathBuf,
    pub experiment_name: String,
    pub registry_name:   String,
    pub model_dir:       PathBuf,
    pub bind_addr:       String,

    // ── Cleaning ──────────────────────────────────────────────────────────────
    pub outlier_columns: Vec<NumericColumn>,
    pub iqr_threshold:   f64,

    // ── Training ──────────────────────────────────────────────────────────────
    pub test_size:    f64,
    pub random_state: u64,
    pub param_grid:   ParamGrid,
    pub cv_folds:     usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_url:         DEFAULT_DATASET_URL.to_string(),
            raw_data_path:       PathBuf::from("data/raw/diamonds.csv"),
            processed_data_path: PathBuf::from("data/processed/diamonds_processed.csv"),

            registry_dir:    PathBuf::from("mlruns"),
            experiment_name: "Diamonds Price Prediction".to_string(),
            registry_name:   "DiamondsRegressor".to_string(),
            model_dir:       PathBuf::from("app/model_files"),
            bind_addr:       "0.0.0.0:8000".to_string(),

            outlier_columns: vec![
                NumericColumn::Carat,
                NumericColumn::Depth,
                NumericColumn::Table,
                NumericColumn::X,
                NumericColumn::Y,
                NumericColumn::Z,
            ],
            iqr_threshold: 1.5,

            test_size:    0.2,
            random_state: 42,
            param_grid:   ParamGrid::default(),
            cv_folds:     3,
        }
    }
}

impl Settings {
    /// Defaults, overridden by `path` when one is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            None => Self::default(),
            Some(p) => {
                let json = fs::read_to_string(p)
                    .with_context(|| format!("Cannot read config '{}'", p.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("Invalid config '{}'", p.display()))?
            }
        };
        settings.check()?;
        Ok(settings)
    }

    /// Reject settings no pipeline run could succeed with
    pub fn check(&self) -> Result<()> {
        anyhow::ensure!(
            self.test_size > 0.0 && self.test_size < 1.0,
            "test_size must be in (0, 1), got {}",
            self.test_size
        );
        anyhow::ensure!(
            self.iqr_threshold >= 0.0,
            "iqr_threshold must be non-negative, got {}",
            self.iqr_threshold
        );
        anyhow::ensure!(self.cv_folds >= 2, "cv_folds must be at least 2, got {}", self.cv_folds);
        anyhow::ensure!(!self.param_grid.is_empty(), "param_grid has no candidates");
        Ok(())
    }

    /// Create the data, registry and model directories
    pub fn ensure_directories(&self) -> Result<()> {
        let dirs = [
            self.raw_data_path.parent(),
            self.processed_data_path.parent(),
            Some(self.registry_dir.as_path()),
            Some(self.model_dir.as_path()),
        ];
        for dir in dirs.into_iter().flatten() {
            if dir.as_os_str().is_empty() {
                continue;
            }
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}
