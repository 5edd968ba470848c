// ============================================================
// Layer 6 — Model Registry
// ============================================================
// Versioned storage for trained model artifacts.
//
// The training use case writes a run's artifacts into a run
// directory, then registers them under a model name. Each
// registration creates the next version number for that name
// and copies the artifacts into it, together with meta.json
// describing the run that produced them:
//
//   mlruns/
//     Diamonds Price Prediction/          ← experiment
//       <run-id>/                         ← one training run
//         model.json
//         input_example.json
//         search_results.csv
//     models/
//       DiamondsRegressor/
//         version-1/
//           model.json ... meta.json
//         version-2/
//           ...
//
// The fetch use case asks for the latest version and
// downloads (copies) its files into the serving directory.
//
// The registry sits behind the ModelRegistry trait so a remote
// registry can replace the filesystem one without touching the
// use cases.
//
// Reference: Rust Book §10 (Traits), §12 (Working with files)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::metrics::EvalMetrics;
use crate::ml::search::BoostParams;

/// Metadata file stored in every version directory
pub const META_FILE: &str = "meta.json";

const VERSION_PREFIX: &str = "version-";

/// Description of the training run behind a model version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id:     String,
    pub run_name:   String,
    pub experiment: String,
    pub params:     BoostParams,
    pub cv_rmse:    f64,
    pub metrics:    EvalMetrics,
}

/// One registered version of a named model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name:          String,
    pub version:       u32,
    /// Directory holding this version's artifacts
    pub source:        PathBuf,
    pub registered_at: DateTime<Utc>,
    pub run:           RunInfo,
}

impl ModelVersion {
    /// Identifier reported to API clients, e.g. "DiamondsRegressor/v3"
    pub fn label(&self) -> String {
        format!("{}/v{}", self.name, self.version)
    }

    /// Read the meta.json in `dir`
    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(META_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed model metadata '{}'", path.display()))
    }
}

// ─── ModelRegistry ────────────────────────────────────────────────────────────
/// Anything that can store and hand out versioned model artifacts.
pub trait ModelRegistry {
    /// Copy every file in `artifact_dir` into a new version of `name`
    fn register(&self, name: &str, artifact_dir: &Path, run: RunInfo) -> Result<ModelVersion>;

    /// All versions of `name`, oldest first. Unknown names have none.
    fn versions(&self, name: &str) -> Result<Vec<ModelVersion>>;

    /// Highest version of `name`, if any
    fn latest(&self, name: &str) -> Result<Option<ModelVersion>> {
        Ok(self.versions(name)?.into_iter().max_by_key(|v| v.version))
    }

    /// Replace `dest` with a copy of the version's files.
    /// Returns the copied paths, sorted.
    fn download(&self, version: &ModelVersion, dest: &Path) -> Result<Vec<PathBuf>>;
}

// ─── FsModelRegistry ──────────────────────────────────────────────────────────
/// Registry stored under a local directory.
pub struct FsModelRegistry {
    root: PathBuf,
}

impl FsModelRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for a new training run of `experiment`
    pub fn run_dir(&self, experiment: &str, run_id: &str) -> PathBuf {
        self.root.join(experiment).join(run_id)
    }

    fn model_dir(&self, name: &str) -> PathBuf {
        self.root.join("models").join(name)
    }

    /// Every `version-<n>` directory of `name`, ascending by n,
    /// whether or not its metadata is readable
    fn version_dirs(&self, name: &str) -> Result<Vec<(u32, PathBuf)>> {
        let dir = self.model_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
        {
            let path = entry?.path();
            let number = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(VERSION_PREFIX))
                .and_then(|n| n.parse::<u32>().ok());
            if let Some(n) = number {
                dirs.push((n, path));
            }
        }
        dirs.sort_by_key(|(n, _)| *n);
        Ok(dirs)
    }
}

impl ModelRegistry for FsModelRegistry {
    fn register(&self, name: &str, artifact_dir: &Path, run: RunInfo) -> Result<ModelVersion> {
        // Numbered from directory names, so a version left behind
        // without metadata still occupies its number
        let next = self.version_dirs(name)?.last().map_or(1, |(n, _)| n + 1);
        let dest = self.model_dir(name).join(format!("{VERSION_PREFIX}{next}"));

        fs::create_dir_all(dest.parent().unwrap_or(&self.root))?;
        // Fails if the version directory already exists
        fs::create_dir(&dest)
            .with_context(|| format!("Version directory '{}' already exists", dest.display()))?;

        let version = ModelVersion {
            name:          name.to_string(),
            version:       next,
            source:        dest.clone(),
            registered_at: Utc::now(),
            run,
        };

        if let Err(e) = fill_version_dir(artifact_dir, &dest, &version) {
            if let Err(cleanup) = fs::remove_dir_all(&dest) {
                tracing::warn!("Cannot remove incomplete '{}': {}", dest.display(), cleanup);
            }
            return Err(e);
        }

        tracing::info!("Registered '{}' version {}", name, next);
        Ok(version)
    }

    fn versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        let mut versions = Vec::new();
        for (_, path) in self.version_dirs(name)? {
            match ModelVersion::read_from(&path) {
                Ok(v) => versions.push(v),
                // A version without readable metadata is skipped, not fatal
                Err(e) => tracing::warn!("Skipping '{}': {:#}", path.display(), e),
            }
        }
        Ok(versions)
    }

    fn download(&self, version: &ModelVersion, dest: &Path) -> Result<Vec<PathBuf>> {
        if dest.exists() {
            tracing::info!("Cleaning old model directory '{}'", dest.display());
            fs::remove_dir_all(dest)
                .with_context(|| format!("Cannot remove '{}'", dest.display()))?;
        }
        fs::create_dir_all(dest)
            .with_context(|| format!("Cannot create '{}'", dest.display()))?;

        copy_files(&version.source, dest)
    }
}

/// Copy the artifacts into a fresh version directory, then write
/// meta.json last through a tempfile so a version only becomes
/// readable once it is complete
fn fill_version_dir(artifact_dir: &Path, dest: &Path, version: &ModelVersion) -> Result<()> {
    copy_files(artifact_dir, dest)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dest)
        .with_context(|| format!("Cannot create temporary file in '{}'", dest.display()))?;
    serde_json::to_writer_pretty(&mut tmp, version)?;
    tmp.persist(dest.join(META_FILE))
        .with_context(|| format!("Cannot write metadata in '{}'", dest.display()))?;
    Ok(())
}

/// Copy every regular file of `from` into `to` (non-recursive)
fn copy_files(from: &Path, to: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for entry in fs::read_dir(from)
        .with_context(|| format!("Cannot read artifacts in '{}'", from.display()))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(file_name) = path.file_name() {
            let target = to.join(file_name);
            fs::copy(&path, &target).with_context(|| {
                format!("Cannot copy '{}' to '{}'", path.display(), target.display())
            })?;
            copied.push(target);
        }
    }
    copied.sort();
    Ok(copied)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn run_info() -> RunInfo {
        RunInfo {
            run_id:     "run-1".into(),
            run_name:   "gbdt-grid".into(),
            experiment: "exp".into(),
            params:     BoostParams { n_estimators: 10, max_depth: 3, learning_rate: 0.1, subsample: 1.0 },
            cv_rmse:    600.0,
            metrics:    EvalMetrics { rmse: 550.0, mae: 300.0, r2: 0.97 },
        }
    }

    fn artifacts(dir: &Path) -> PathBuf {
        let run = dir.join("run");
        fs::create_dir_all(&run).unwrap();
        fs::write(run.join("model.json"), "{}").unwrap();
        fs::write(run.join("search_results.csv"), "a\n").unwrap();
        run
    }

    #[test]
    fn test_versions_increment_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FsModelRegistry::new(dir.path().join("mlruns"));
        let run = artifacts(dir.path());

        assert!(reg.latest("DiamondsRegressor").unwrap().is_none());

        let v1 = reg.register("DiamondsRegressor", &run, run_info()).unwrap();
        let v2 = reg.register("DiamondsRegressor", &run, run_info()).unwrap();
        assert_eq!(v1.version, 1);
        assert_eq!(v2.version, 2);
        assert_eq!(v2.label(), "DiamondsRegressor/v2");

        let versions = reg.versions("DiamondsRegressor").unwrap();
        assert_eq!(versions.iter().map(|v| v.version).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(reg.latest("DiamondsRegressor").unwrap().unwrap().version, 2);
    }

    #[test]
    fn test_latest_is_numeric_not_lexical() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FsModelRegistry::new(dir.path());
        let run = artifacts(dir.path());
        for _ in 0..10 {
            reg.register("m", &run, run_info()).unwrap();
        }
        // "version-10" sorts before "version-9" as a string
        assert_eq!(reg.latest("m").unwrap().unwrap().version, 10);
    }

    #[test]
    fn test_download_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FsModelRegistry::new(dir.path().join("mlruns"));
        let run = artifacts(dir.path());
        let v1  = reg.register("m", &run, run_info()).unwrap();

        let dest = dir.path().join("app").join("model_files");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.bin"), "old").unwrap();

        let files = reg.download(&v1, &dest).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["meta.json", "model.json", "search_results.csv"]);
        assert!(!dest.join("stale.bin").exists());

        let meta = ModelVersion::read_from(&dest).unwrap();
        assert_eq!(meta.version, 1);
        assert_eq!(meta.run.run_name, "gbdt-grid");
    }

    #[test]
    fn test_unreadable_version_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FsModelRegistry::new(dir.path());
        let run = artifacts(dir.path());
        reg.register("m", &run, run_info()).unwrap();

        fs::create_dir_all(dir.path().join("models/m/version-7")).unwrap();
        assert_eq!(reg.versions("m").unwrap().len(), 1);
    }

    #[test]
    fn test_register_skips_past_version_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FsModelRegistry::new(dir.path());
        let run = artifacts(dir.path());
        reg.register("m", &run, run_info()).unwrap();

        // Left behind by an interrupted registration
        fs::create_dir_all(dir.path().join("models/m/version-2")).unwrap();

        let v3 = reg.register("m", &run, run_info()).unwrap();
        let v4 = reg.register("m", &run, run_info()).unwrap();
        assert_eq!(v3.version, 3);
        assert_eq!(v4.version, 4);
        assert_eq!(reg.latest("m").unwrap().unwrap().version, 4);
    }

    #[test]
    fn test_failed_registration_leaves_no_version() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FsModelRegistry::new(dir.path());

        let missing = dir.path().join("no_such_run");
        assert!(reg.register("m", &missing, run_info()).is_err());
        assert!(!dir.path().join("models/m/version-1").exists());

        let v1 = reg.register("m", &artifacts(dir.path()), run_info()).unwrap();
        assert_eq!(v1.version, 1);
    }
}

