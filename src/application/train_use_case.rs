// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run:
//
//   Step 1: Prepare data + split        (PrepareUseCase)
//   Step 2: Grid search with K-fold CV  (Layer 5 - search)
//   Step 3: Refit winner on all train   (Layer 5 - model)
//   Step 4: Evaluate on the test set    (Layer 6 - metrics)
//   Step 5: Write run artifacts         (model, example, log)
//   Step 6: Register a new version      (Layer 6 - registry)
//
// Every successful run produces exactly one new registered
// version; a failure at any step registers nothing.
//
// Reference: Hastie et al. (2009) ESL §7 (Model Assessment)

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::{fs, path::Path};

use crate::application::prepare_use_case::PrepareUseCase;
use crate::domain::diamond::{FeatureRow, FEATURE_NAMES};
use crate::domain::traits::DatasetSource;
use crate::infra::{
    config::Settings,
    metrics::{write_search_log, EvalMetrics},
    registry::{FsModelRegistry, ModelRegistry, ModelVersion, RunInfo},
};
use crate::ml::{model::GbdtRegressor, model::MODEL_FILE, search::grid_search};

/// Rows kept as the registered input example
const INPUT_EXAMPLE_ROWS: usize = 5;

const RUN_NAME: &str = "gbdt-grid-search";

pub struct TrainUseCase<S: DatasetSource> {
    prepare:  PrepareUseCase<S>,
    registry: FsModelRegistry,
    settings: Settings,
}

impl<S: DatasetSource> TrainUseCase<S> {
    pub fn new(source: S, settings: Settings) -> Self {
        Self {
            prepare:  PrepareUseCase::new(source, &settings),
            registry: FsModelRegistry::new(&settings.registry_dir),
            settings,
        }
    }

    /// Execute the full training pipeline end to end.
    /// Returns the newly registered version.
    pub fn execute(&self) -> Result<ModelVersion> {
        let cfg = &self.settings;
        tracing::info!("Training model for experiment '{}'", cfg.experiment_name);

        // ── Step 1: Prepared, split data ──────────────────────────────────────
        let split = self.prepare.execute()?;

        // ── Step 2: Hyperparameter search ─────────────────────────────────────
        let outcome = grid_search(&split.x_train, &split.y_train, &cfg.param_grid, cfg.cv_folds)?;

        // ── Step 3: Refit the winner on the whole training set ────────────────
        let model = GbdtRegressor::fit(&split.x_train, &split.y_train, &outcome.best.params)?;

        // ── Step 4: Hold-out evaluation ───────────────────────────────────────
        let predicted = model.predict_batch(&split.x_test);
        let metrics   = EvalMetrics::compute(&split.y_test, &predicted)?;
        tracing::info!(
            "Winner model metrics: rmse={:.3} mae={:.3} r2={:.4}",
            metrics.rmse,
            metrics.mae,
            metrics.r2
        );

        // ── Step 5: Run artifacts ─────────────────────────────────────────────
        let run_id  = uuid::Uuid::new_v4().to_string();
        let run_dir = self.registry.run_dir(&cfg.experiment_name, &run_id);
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Cannot create run directory '{}'", run_dir.display()))?;

        model.save(&run_dir.join(MODEL_FILE))?;
        write_input_example(&run_dir.join("input_example.json"), &split.x_train)?;
        write_search_log(&run_dir.join("search_results.csv"), &outcome.results)?;

        // ── Step 6: Register ──────────────────────────────────────────────────
        let run = RunInfo {
            run_id,
            run_name:   RUN_NAME.to_string(),
            experiment: cfg.experiment_name.clone(),
            params:     model.params().clone(),
            cv_rmse:    outcome.best.mean_rmse,
            metrics,
        };
        let version = self.registry.register(&cfg.registry_name, &run_dir, run)?;

        tracing::info!(
            "Model registered as '{}' version {}",
            version.name,
            version.version
        );
        Ok(version)
    }
}

/// First rows of the training features as named JSON records
fn write_input_example(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    let records: Vec<Value> = rows
        .iter()
        .take(INPUT_EXAMPLE_ROWS)
        .map(|row| {
            let fields: Map<String, Value> = FEATURE_NAMES
                .iter()
                .zip(row)
                .map(|(name, v)| (name.to_string(), Value::from(*v)))
                .collect();
            Value::Object(fields)
        })
        .collect();

    fs::write(path, serde_json::to_string_pretty(&records)?)
        .with_context(|| format!("Cannot write '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diamond::Diamond;
    use crate::ml::search::ParamGrid;

    struct InMemorySource(Vec<Diamond>);

    impl DatasetSource for InMemorySource {
        fn load_all(&self) -> Result<Vec<Diamond>> {
            Ok(self.0.clone())
        }
    }

    fn synthetic_rows() -> Vec<Diamond> {
        let cuts = ["Fair", "Good", "Very Good", "Premium", "Ideal"];
        (0..60)
            .map(|i| {
                let carat = 0.4 + (i % 10) as f64 * 0.1;
                Diamond {
                    carat,
                    cut:     cuts[i % cuts.len()].into(),
                    color:   "G".into(),
                    clarity: "VS1".into(),
                    depth:   61.0 + (i % 3) as f64 * 0.5,
                    table:   56.0 + (i % 2) as f64,
                    price:   carat * 5000.0 + (i % 5) as f64 * 100.0,
                    x:       4.0 + carat,
                    y:       4.0 + carat,
                    z:       2.5 + carat * 0.5,
                }
            })
            .collect()
    }

    fn small_settings(dir: &Path) -> Settings {
        Settings {
            raw_data_path:       dir.join("raw.csv"),
            processed_data_path: dir.join("processed.csv"),
            registry_dir:        dir.join("mlruns"),
            param_grid: ParamGrid {
                n_estimators:  vec![5, 30],
                max_depth:     vec![3],
                learning_rate: vec![0.3],
                subsample:     vec![1.0],
            },
            ..Settings::default()
        }
    }

    #[test]
    fn test_training_registers_new_versions() {
        let dir = tempfile::tempdir().unwrap();
        let settings = small_settings(dir.path());

        let v1 = TrainUseCase::new(InMemorySource(synthetic_rows()), settings.clone())
            .execute()
            .unwrap();
        assert_eq!(v1.version, 1);
        assert_eq!(v1.name, "DiamondsRegressor");
        assert!(v1.source.join(MODEL_FILE).is_file());
        assert!(v1.source.join("input_example.json").is_file());
        assert!(v1.source.join("search_results.csv").is_file());
        assert!(v1.run.metrics.rmse.is_finite());
        assert_eq!(v1.run.params.n_estimators, 30);

        let v2 = TrainUseCase::new(InMemorySource(synthetic_rows()), settings)
            .execute()
            .unwrap();
        assert_eq!(v2.version, 2);
        assert_ne!(v1.run.run_id, v2.run.run_id);
    }

    #[test]
    fn test_registered_model_loads_and_predicts() {
        let dir = tempfile::tempdir().unwrap();
        let v = TrainUseCase::new(InMemorySource(synthetic_rows()), small_settings(dir.path()))
            .execute()
            .unwrap();

        let model = GbdtRegressor::load(&v.source.join(MODEL_FILE)).unwrap();
        let row   = synthetic_rows()[5].encode().unwrap().feature_row();
        let price = crate::domain::traits::Regressor::predict(&model, &row).unwrap();
        assert!(price > 0.0);
    }

    #[test]
    fn test_input_example_has_named_features() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_example.json");
        let rows = vec![[1.0, 61.5, 55.0, 6.5, 6.5, 4.0, 4.0, 5.0, 2.0]; 8];
        write_input_example(&path, &rows).unwrap();

        let json: Vec<Map<String, Value>> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json.len(), INPUT_EXAMPLE_ROWS);
        assert_eq!(json[0]["clarity"], Value::from(2.0));
        assert_eq!(json[0]["carat"], Value::from(1.0));
    }
}
