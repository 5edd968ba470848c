// ============================================================
// Layer 4 — Processed Dataset Store
// ============================================================
// Writes the cleaned, encoded dataset to CSV.
//
// Each run fully replaces the previous file. Rows are written
// to a temporary file in the destination directory, which is
// then renamed over the target, so readers never observe a
// half-written dataset and a failed write leaves the previous
// version untouched.
//
// Reference: csv crate documentation (serde serialization)
//            tempfile crate documentation (NamedTempFile::persist)

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::dataset::Dataset;
use crate::domain::diamond::EncodedDiamond;

pub struct ProcessedStore {
    path: PathBuf,
}

impl ProcessedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the processed CSV with `dataset`
    pub fn save(&self, dataset: &Dataset<EncodedDiamond>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Cannot create temporary file in '{}'", dir.display()))?;

        {
            let mut writer = csv::Writer::from_writer(tmp.as_file());
            for row in dataset.rows() {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        tmp.persist(&self.path)
            .with_context(|| format!("Cannot write '{}'", self.path.display()))?;

        tracing::info!(
            "Processed data saved to '{}' ({} rows)",
            self.path.display(),
            dataset.len()
        );
        Ok(())
    }
}

#[cfg(test)]
impl ProcessedStore {
    /// Read the processed CSV back
    pub fn load(&self) -> Result<Dataset<EncodedDiamond>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Cannot open '{}'", self.path.display()))?;
        let rows = reader
            .deserialize::<EncodedDiamond>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Malformed processed data in '{}'", self.path.display()))?;
        Ok(Dataset::new(rows))
    }
}
