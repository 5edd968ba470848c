// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Each pipeline stage is its own subcommand, so the stages can
// be run one by one in order:
//   extract → prepare → train → fetch → serve
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};

use crate::infra::config::Settings;
use commands::{Commands, Overrides};

/// The main CLI struct. clap reads the fields and generates
/// argument parsing code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "diamonds-price",
    version = "0.1.0",
    about = "Prepare the diamonds dataset, train and register a price model, then serve it."
)]
pub struct Cli {
    /// JSON settings file; built-in defaults are used when absent
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load the settings, apply the subcommand's flags, dispatch.
    pub fn run(self) -> Result<()> {
        let mut settings = Settings::load(self.config.as_deref())?;

        match self.command {
            Commands::Extract(args) => {
                args.apply(&mut settings);
                run_extract(&settings)
            }
            Commands::Prepare(args) => {
                args.apply(&mut settings);
                run_prepare(&settings)
            }
            Commands::Train(args) => {
                args.apply(&mut settings);
                run_train(settings)
            }
            Commands::Fetch(args) => {
                args.apply(&mut settings);
                run_fetch(&settings)
            }
            Commands::Serve(args) => {
                args.apply(&mut settings);
                run_serve(&settings)
            }
        }
    }
}

fn run_extract(settings: &Settings) -> Result<()> {
    use crate::infra::download::download_to;

    settings.ensure_directories()?;
    let bytes = download_to(&settings.dataset_url, &settings.raw_data_path)?;
    println!("Downloaded {} bytes to {}", bytes, settings.raw_data_path.display());
    Ok(())
}

fn run_prepare(settings: &Settings) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;
    use crate::data::loader::CsvDiamondSource;

    settings.check()?;
    settings.ensure_directories()?;

    let source   = CsvDiamondSource::new(&settings.raw_data_path);
    let use_case = PrepareUseCase::new(source, settings);
    let (_, report) = use_case.process()?;

    println!(
        "Processed {} → {} rows ({} zero-dimension, {} outliers removed). Saved to {}",
        report.raw_rows,
        report.processed_rows,
        report.zero_dim_rows,
        report.outlier_rows,
        settings.processed_data_path.display()
    );
    Ok(())
}

fn run_train(settings: Settings) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;
    use crate::data::loader::CsvDiamondSource;

    settings.check()?;
    settings.ensure_directories()?;

    let source  = CsvDiamondSource::new(&settings.raw_data_path);
    let version = TrainUseCase::new(source, settings).execute()?;

    println!("Training complete. Registered {}", version.label());
    println!(
        "  params: {:?}\n  test rmse={:.2} mae={:.2} r2={:.4}",
        version.run.params, version.run.metrics.rmse, version.run.metrics.mae, version.run.metrics.r2
    );
    Ok(())
}

fn run_fetch(settings: &Settings) -> Result<()> {
    use crate::application::fetch_use_case::{FetchOutcome, FetchUseCase};
    use crate::infra::registry::FsModelRegistry;

    let registry = FsModelRegistry::new(&settings.registry_dir);
    let use_case = FetchUseCase::new(registry, &settings.registry_name, &settings.model_dir);

    match use_case.execute()? {
        FetchOutcome::Fetched { version, files } => {
            println!("Fetched {} into {}", version.label(), settings.model_dir.display());
            for file in files {
                println!("  {}", file.display());
            }
        }
        FetchOutcome::RegistryEmpty => {
            println!(
                "No registered versions of '{}'. Run `train` first.",
                settings.registry_name
            );
        }
    }
    Ok(())
}

fn run_serve(settings: &Settings) -> Result<()> {
    use crate::api;
    use crate::application::predict_use_case::ServiceContext;

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", settings.bind_addr))?;

    let ctx = ServiceContext::load(&settings.model_dir);

    let runtime = tokio::runtime::Runtime::new().context("Cannot start the async runtime")?;
    runtime.block_on(api::serve(ctx, addr))
}
