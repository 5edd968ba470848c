// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the five pipeline subcommands and their flags:
//
//   extract → download the raw dataset
//   prepare → clean, encode and persist it
//   train   → grid search, evaluate, register a version
//   fetch   → copy the latest version to the serving dir
//   serve   → run the prediction API
//
// Every flag is optional and overrides the matching key of
// the loaded Settings; unset flags leave the config untouched.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::infra::config::Settings;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the raw diamonds CSV
    Extract(ExtractArgs),

    /// Clean, encode and persist the raw dataset
    Prepare(PrepareArgs),

    /// Search hyperparameters, evaluate and register a model
    Train(TrainArgs),

    /// Copy the latest registered model into the serving directory
    Fetch(FetchArgs),

    /// Serve predictions over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Source URL of the dataset
    #[arg(long)]
    pub url: Option<String>,

    /// Where to store the downloaded CSV
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Raw CSV to read
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Processed CSV to write
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Raw CSV to train from
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Experiment the run is recorded under
    #[arg(long)]
    pub experiment: Option<String>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub cv_folds: Option<usize>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Registered model name
    #[arg(long)]
    pub name: Option<String>,

    /// Destination directory (cleared first)
    #[arg(long)]
    pub dest: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory holding model.json and meta.json
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(long)]
    pub bind: Option<String>,
}

/// Flags that override a subset of the Settings.
/// The application layer only ever sees the resulting Settings,
/// never clap types.
pub trait Overrides {
    fn apply(self, settings: &mut Settings);
}

impl Overrides for ExtractArgs {
    fn apply(self, s: &mut Settings) {
        if let Some(url) = self.url       { s.dataset_url   = url; }
        if let Some(path) = self.output   { s.raw_data_path = path; }
    }
}

impl Overrides for PrepareArgs {
    fn apply(self, s: &mut Settings) {
        if let Some(path) = self.input    { s.raw_data_path       = path; }
        if let Some(path) = self.output   { s.processed_data_path = path; }
    }
}

impl Overrides for TrainArgs {
    fn apply(self, s: &mut Settings) {
        if let Some(path) = self.input       { s.raw_data_path   = path; }
        if let Some(name) = self.experiment  { s.experiment_name = name; }
        if let Some(k) = self.cv_folds       { s.cv_folds        = k; }
    }
}

impl Overrides for FetchArgs {
    fn apply(self, s: &mut Settings) {
        if let Some(name) = self.name     { s.registry_name = name; }
        if let Some(dir) = self.dest      { s.model_dir     = dir; }
    }
}

impl Overrides for ServeArgs {
    fn apply(self, s: &mut Settings) {
        if let Some(dir) = self.model_dir { s.model_dir = dir; }
        if let Some(addr) = self.bind     { s.bind_addr = addr; }
    }
}
