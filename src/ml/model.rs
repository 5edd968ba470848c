// ============================================================
// Layer 5 — Gradient-Boosted Regressor
// ============================================================
// Thin adapter over the `gbdt` crate. Boosting itself is
// entirely the crate's job; this module only
//   - maps BoostParams onto a gbdt Config,
//   - converts FeatureRows into gbdt's Data rows,
//   - saves/loads the trained booster as a JSON artifact.
//
// Artifact layout (model.json):
//   {
//     "feature_names": ["carat", "depth", ..., "clarity"],
//     "schema":        { "version": 1, "cut": [...], ... },
//     "params":        { "n_estimators": 300, ... },
//     "booster":       { ...gbdt trees... }
//   }
//
// Loading refuses an artifact whose feature order or ordinal
// schema differs from this binary's: serving such a model
// would silently feed it differently encoded rows.
//
// Reference: gbdt crate documentation
//            Friedman (2001) Greedy Function Approximation

use anyhow::{Context, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::{fs, io::BufReader, io::BufWriter, path::Path};

use crate::domain::diamond::{FeatureRow, FEATURE_COUNT, FEATURE_NAMES};
use crate::domain::traits::Regressor;
use crate::domain::vocabulary::OrdinalSchema;
use crate::ml::search::BoostParams;

/// File name of the serialized model inside an artifact directory
pub const MODEL_FILE: &str = "model.json";

pub struct GbdtRegressor {
    booster: GBDT,
    params:  BoostParams,
}

#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    schema:        OrdinalSchema,
    params:        BoostParams,
    booster:       GBDT,
}

impl GbdtRegressor {
    /// Fit a squared-error booster on (x, y)
    pub fn fit(x: &[FeatureRow], y: &[f64], params: &BoostParams) -> Result<Self> {
        anyhow::ensure!(!x.is_empty(), "cannot fit on an empty training set");
        anyhow::ensure!(x.len() == y.len(), "features and targets differ in length");

        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_COUNT);
        cfg.set_max_depth(params.max_depth);
        cfg.set_iterations(params.n_estimators);
        cfg.set_shrinkage(params.learning_rate as ValueType);
        cfg.set_data_sample_ratio(params.subsample);
        cfg.set_loss("SquaredError");
        cfg.set_debug(false);

        let mut data: DataVec = x
            .iter()
            .zip(y)
            .map(|(row, &target)| {
                Data::new_training_data(to_features(row), 1.0, target as ValueType, None)
            })
            .collect();

        let mut booster = GBDT::new(&cfg);
        booster.fit(&mut data);

        Ok(Self { booster, params: params.clone() })
    }

    pub fn params(&self) -> &BoostParams {
        &self.params
    }

    /// Predict a batch of rows in one call
    pub fn predict_batch(&self, rows: &[FeatureRow]) -> Vec<f64> {
        let data: DataVec = rows
            .iter()
            .map(|row| Data::new_test_data(to_features(row), None))
            .collect();
        self.booster
            .predict(&data)
            .into_iter()
            .map(f64::from)
            .collect()
    }

    /// Write the model artifact to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let artifact = ArtifactRef {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            schema:        OrdinalSchema::current(),
            params:        &self.params,
            booster:       &self.booster,
        };
        let file = fs::File::create(path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), &artifact)
            .with_context(|| format!("Cannot serialise model to '{}'", path.display()))?;
        Ok(())
    }

    /// Read a model artifact, checking it matches this binary's encoding
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("Cannot open model '{}'", path.display()))?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Cannot parse model '{}'", path.display()))?;

        anyhow::ensure!(
            artifact.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES),
            "model '{}' expects features {:?}, this build produces {:?}",
            path.display(),
            artifact.feature_names,
            FEATURE_NAMES
        );
        anyhow::ensure!(
            artifact.schema.is_current(),
            "model '{}' was trained with ordinal schema v{}, this build encodes with v{}",
            path.display(),
            artifact.schema.version,
            OrdinalSchema::current().version
        );

        Ok(Self { booster: artifact.booster, params: artifact.params })
    }
}

/// Borrowing twin of ModelArtifact for serialisation
#[derive(Serialize)]
struct ArtifactRef<'a> {
    feature_names: Vec<String>,
    schema:        OrdinalSchema,
    params:        &'a BoostParams,
    booster:       &'a GBDT,
}

impl Regressor for GbdtRegressor {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        self.predict_batch(std::slice::from_ref(row))
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("booster returned no prediction"))
    }
}

fn to_features(row: &FeatureRow) -> Vec<ValueType> {
    row.iter().map(|&v| v as ValueType).collect()
}
