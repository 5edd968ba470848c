// ============================================================
// Layer 2 — Prediction Service Context
// ============================================================
// Owns the one piece of process-wide state of the server:
// the loaded model, or the fact that there is none.
//
// The context is built once at startup and handed to every
// request handler (dependency injection instead of a global
// model slot). The model inside is never mutated after
// loading, so handlers share it through an Arc without locks.
//
// Per request:
//   1. No model loaded        → ServeError::ModelUnavailable (503)
//   2. Validate the contract  → ServeError::Validation (400)
//   3. Encode categories      → ServeError::Category (400)
//   4. Predict                → ServeError::Inference (500)
//   5. Round to cents and attach the model version
//
// Reference: Rust Book §16 (Shared-State Concurrency, Arc)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc};

use crate::domain::contract::{PredictionRequest, PredictionResponse};
use crate::domain::error::ServeError;
use crate::domain::traits::Regressor;
use crate::infra::registry::ModelVersion;
use crate::ml::model::{GbdtRegressor, MODEL_FILE};

/// A model ready to serve, with the version reported to clients
pub struct LoadedModel {
    regressor: Arc<dyn Regressor>,
    version:   String,
}

impl LoadedModel {
    pub fn new(regressor: Arc<dyn Regressor>, version: impl Into<String>) -> Self {
        Self { regressor, version: version.into() }
    }

    /// Load the artifact fetched into `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let regressor = GbdtRegressor::load(&dir.join(MODEL_FILE))?;

        let version = match ModelVersion::read_from(dir) {
            Ok(meta) => meta.label(),
            Err(e) => {
                tracing::warn!("No registry metadata next to the model: {:#}", e);
                "unregistered".to_string()
            }
        };

        Ok(Self::new(Arc::new(regressor), version))
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Whether the service can currently answer predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Active,
    Inactive,
}

/// Body of the health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
}

#[derive(Clone)]
pub struct ServiceContext {
    model: Option<Arc<LoadedModel>>,
}

impl ServiceContext {
    pub fn new(model: Option<LoadedModel>) -> Self {
        Self { model: model.map(Arc::new) }
    }

    /// Load the model from `dir`. A failure is logged and the
    /// service starts without a model instead of exiting.
    pub fn load(dir: &Path) -> Self {
        tracing::info!("Initializing prediction service, model dir '{}'", dir.display());
        match LoadedModel::from_dir(dir) {
            Ok(model) => {
                tracing::info!("Model {} loaded successfully", model.version());
                Self::new(Some(model))
            }
            Err(e) => {
                tracing::error!("Model loading error: {:#}", e);
                Self::new(None)
            }
        }
    }

    pub fn health(&self) -> HealthResponse {
        let status = if self.model.is_some() {
            ServiceStatus::Active
        } else {
            ServiceStatus::Inactive
        };
        HealthResponse { status }
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ServeError> {
        let model = self.model.as_ref().ok_or(ServeError::ModelUnavailable)?;

        request.validate()?;
        let row = request.feature_row()?;

        let price = model
            .regressor
            .predict(&row)
            .map_err(|e| ServeError::Inference(format!("{e:#}")))?;
        if !price.is_finite() {
            return Err(ServeError::Inference(format!("model returned {price}")));
        }

        Ok(PredictionResponse::new(price, model.version.as_str()))
    }
}

// ─── Test Doubles ─────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::domain::diamond::FeatureRow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Price = 1000 · carat + 0.5; counts its invocations
    #[derive(Default)]
    pub struct FakeRegressor {
        pub calls: AtomicUsize,
    }

    impl FakeRegressor {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Regressor for FakeRegressor {
        fn predict(&self, row: &FeatureRow) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(row[0] * 1000.0 + 0.5)
        }
    }

    pub fn context_with(fake: Arc<FakeRegressor>) -> ServiceContext {
        ServiceContext::new(Some(LoadedModel::new(fake, "DiamondsRegressor/v1")))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::domain::contract::sample_request;

    #[test]
    fn test_prediction_with_loaded_model() {
        let fake = Arc::new(FakeRegressor::default());
        let ctx  = context_with(fake.clone());

        let resp = ctx.predict(&sample_request()).unwrap();
        assert_eq!(resp.predicted_price, 1000.5);
        assert_eq!(resp.model_version, "DiamondsRegressor/v1");
        assert_eq!(fake.calls(), 1);
        assert_eq!(ctx.health().status, ServiceStatus::Active);
    }

    #[test]
    fn test_unknown_category_never_reaches_model() {
        let fake = Arc::new(FakeRegressor::default());
        let ctx  = context_with(fake.clone());

        let mut req = sample_request();
        req.cut = "Unknown".into();
        let err = ctx.predict(&req).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_no_model_is_unavailable() {
        let ctx = ServiceContext::new(None);
        assert_eq!(ctx.health().status, ServiceStatus::Inactive);
        let err = ctx.predict(&sample_request()).unwrap_err();
        assert!(matches!(err, ServeError::ModelUnavailable));
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_missing_model_dir_starts_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::load(&dir.path().join("nothing_here"));
        assert_eq!(ctx.health().status, ServiceStatus::Inactive);
    }

    fn trained_model() -> GbdtRegressor {
        use crate::domain::diamond::FeatureRow;
        use crate::ml::search::BoostParams;

        let x: Vec<FeatureRow> = (0..30)
            .map(|i| {
                let carat = 0.3 + (i % 10) as f64 * 0.2;
                [carat, 61.5, 55.0, 6.5, 6.5, 4.0, 4.0, 5.0, 2.0]
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 500.0 + r[0] * 4000.0).collect();
        let params = BoostParams { n_estimators: 20, max_depth: 3, learning_rate: 0.3, subsample: 1.0 };
        GbdtRegressor::fit(&x, &y, &params).unwrap()
    }

    #[test]
    fn test_fetched_model_reports_registered_version() {
        use crate::application::fetch_use_case::{FetchOutcome, FetchUseCase};
        use crate::infra::metrics::EvalMetrics;
        use crate::infra::registry::{FsModelRegistry, ModelRegistry, RunInfo};

        let dir = tempfile::tempdir().unwrap();
        let run = dir.path().join("run");
        std::fs::create_dir_all(&run).unwrap();
        let model = trained_model();
        model.save(&run.join(MODEL_FILE)).unwrap();

        let registry = FsModelRegistry::new(dir.path().join("mlruns"));
        let info = RunInfo {
            run_id:     "run".into(),
            run_name:   "gbdt-grid-search".into(),
            experiment: "Diamonds Price Prediction".into(),
            params:     model.params().clone(),
            cv_rmse:    1.0,
            metrics:    EvalMetrics { rmse: 1.0, mae: 1.0, r2: 0.9 },
        };
        registry.register("DiamondsRegressor", &run, info).unwrap();

        let model_dir = dir.path().join("model_files");
        let fetched   = FetchUseCase::new(registry, "DiamondsRegressor", &model_dir).execute().unwrap();
        assert!(matches!(fetched, FetchOutcome::Fetched { .. }));

        let ctx = ServiceContext::load(&model_dir);
        assert_eq!(ctx.health().status, ServiceStatus::Active);
        let resp = ctx.predict(&sample_request()).unwrap();
        assert_eq!(resp.model_version, "DiamondsRegressor/v1");
        assert!(resp.predicted_price > 0.0);
    }

    #[test]
    fn test_model_without_metadata_is_unregistered() {
        let dir = tempfile::tempdir().unwrap();
        trained_model().save(&dir.path().join(MODEL_FILE)).unwrap();

        let ctx = ServiceContext::load(dir.path());
        assert_eq!(ctx.health().status, ServiceStatus::Active);
        assert_eq!(ctx.predict(&sample_request()).unwrap().model_version, "unregistered");
    }

    #[test]
    fn test_health_serialises_like_the_api() {
        let json = serde_json::to_string(&ServiceContext::new(None).health()).unwrap();
        assert_eq!(json, r#"{"status":"Inactive"}"#);
    }

    #[test]
    fn test_concurrent_requests_share_one_model() {
        let fake = Arc::new(FakeRegressor::default());
        let ctx  = context_with(fake.clone());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ctx = ctx.clone();
                std::thread::spawn(move || {
                    let mut req = sample_request();
                    req.carat = 1.0 + i as f64;
                    ctx.predict(&req).unwrap().predicted_price
                })
            })
            .collect();

        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), (1.0 + i as f64) * 1000.0 + 0.5);
        }
        assert_eq!(fake.calls(), 8);
    }
}
