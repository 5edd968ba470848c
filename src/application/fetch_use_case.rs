// ============================================================
// Layer 2 — FetchUseCase
// ============================================================
// Copies the latest registered model version into the local
// serving directory:
//
//   Step 1: Look up all versions of the registered name
//   Step 2: Pick the highest version number
//   Step 3: Clear the serving directory
//   Step 4: Copy the version's artifacts into it
//
// An empty registry is not an error: there is simply nothing
// to fetch yet, and the caller is told to run `train` first.

use anyhow::Result;
use std::path::PathBuf;

use crate::infra::registry::{ModelRegistry, ModelVersion};

/// Result of a fetch
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched { version: ModelVersion, files: Vec<PathBuf> },
    RegistryEmpty,
}

pub struct FetchUseCase<R: ModelRegistry> {
    registry: R,
    name:     String,
    dest:     PathBuf,
}

impl<R: ModelRegistry> FetchUseCase<R> {
    pub fn new(registry: R, name: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self { registry, name: name.into(), dest: dest.into() }
    }

    pub fn execute(&self) -> Result<FetchOutcome> {
        tracing::info!("Looking up registered model '{}'", self.name);

        let Some(latest) = self.registry.latest(&self.name)? else {
            tracing::warn!("Registry has no versions of '{}'", self.name);
            return Ok(FetchOutcome::RegistryEmpty);
        };

        tracing::info!(
            "Found version {} (registered {}, source '{}')",
            latest.version,
            latest.registered_at,
            latest.source.display()
        );

        let files = self.registry.download(&latest, &self.dest)?;
        tracing::info!("Downloaded {} files to '{}'", files.len(), self.dest.display());

        Ok(FetchOutcome::Fetched { version: latest, files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::metrics::EvalMetrics;
    use crate::infra::registry::{FsModelRegistry, RunInfo};
    use crate::ml::search::BoostParams;
    use std::fs;

    fn run_info() -> RunInfo {
        RunInfo {
            run_id:     "r".into(),
            run_name:   "n".into(),
            experiment: "e".into(),
            params:     BoostParams { n_estimators: 1, max_depth: 1, learning_rate: 0.1, subsample: 1.0 },
            cv_rmse:    1.0,
            metrics:    EvalMetrics { rmse: 1.0, mae: 1.0, r2: 0.5 },
        }
    }

    #[test]
    fn test_empty_registry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let uc  = FetchUseCase::new(
            FsModelRegistry::new(dir.path().join("mlruns")),
            "DiamondsRegressor",
            dir.path().join("model_files"),
        );
        assert!(matches!(uc.execute().unwrap(), FetchOutcome::RegistryEmpty));
        assert!(!dir.path().join("model_files").exists());
    }

    #[test]
    fn test_fetches_highest_version() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FsModelRegistry::new(dir.path().join("mlruns"));

        let run = dir.path().join("run");
        fs::create_dir_all(&run).unwrap();
        for marker in ["first", "second", "third"] {
            fs::write(run.join("model.json"), marker).unwrap();
            reg.register("DiamondsRegressor", &run, run_info()).unwrap();
        }

        let dest = dir.path().join("model_files");
        let uc   = FetchUseCase::new(reg, "DiamondsRegressor", &dest);
        match uc.execute().unwrap() {
            FetchOutcome::Fetched { version, files } => {
                assert_eq!(version.version, 3);
                assert_eq!(files.len(), 2);
            }
            FetchOutcome::RegistryEmpty => panic!("expected a fetched model"),
        }
        assert_eq!(fs::read_to_string(dest.join("model.json")).unwrap(), "third");
    }
}
