//! # onnx-widen
//!
//! ```bash
//! # Widen the configured batch of float16 restoration models
//! onnx-widen convert
//!
//! # Widen a single model
//! onnx-widen convert model-fp16.onnx model-fp32.onnx
//!
//! # Show what cleanup would delete, then do it
//! onnx-widen cleanup --dry-run
//! onnx-widen cleanup
//!
//! # Check UI ids against the copy manifest and the files on disk
//! onnx-widen audit --strict
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use asset_audit::AssetConvention;
use clap::{Parser, Subcommand};
use onnx_widen::cleanup;
use onnx_widen::config::{ModelPair, WidenConfig};
use onnx_widen::driver::{self, BatchSummary, ConversionOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "onnx-widen",
    about = "Float16 to float32 widening and asset checks for ONNX model bundles",
    version
)]
struct Cli {
    /// Path to a JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Widen float16 models to float32.
    Convert {
        /// Directory the model names are relative to.
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Convert this single input instead of the configured batch.
        #[arg(requires = "output")]
        input: Option<PathBuf>,

        /// Output path for the single input.
        output: Option<PathBuf>,
    },

    /// Remove everything in the model directory that is not an allow-listed model.
    Cleanup {
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Only list what would be removed.
        #[arg(long)]
        dry_run: bool,
    },

    /// Check UI model ids against the copy manifest and the assets on disk.
    Audit {
        /// UI source declaring the model ids.
        #[arg(long)]
        ui: Option<PathBuf>,

        /// Copy manifest mapping ids to source assets.
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Directory relative asset paths resolve against.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,

        /// Exit with a failure code when any check fails.
        #[arg(long)]
        strict: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &BatchSummary) {
    for entry in &summary.entries {
        match &entry.outcome {
            ConversionOutcome::Converted(report) => {
                println!("Saved FP32 model to {} ({report})", entry.output.display())
            }
            ConversionOutcome::Skipped => println!("Skipping {} (not found)", entry.input.display()),
            ConversionOutcome::Failed(err) => {
                println!("Error converting {}: {err}", entry.input.display())
            }
        }
    }
    println!(
        "{} converted, {} skipped, {} failed",
        summary.converted(),
        summary.skipped(),
        summary.failed()
    );
}

fn run_convert(
    config: &WidenConfig,
    model_dir: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> ExitCode {
    let summary = match (input, output) {
        (Some(input), Some(output)) => {
            let pair = ModelPair {
                input: input.to_string_lossy().to_string(),
                output: output.to_string_lossy().to_string(),
            };
            driver::run_batch(model_dir.as_deref().unwrap_or(Path::new("")), &[pair])
        }
        _ => {
            let model_dir = model_dir.unwrap_or_else(|| config.model_dir.clone());
            tracing::info!(
                "Converting {} model(s) under {}",
                config.models.len(),
                model_dir.display()
            );
            driver::run_batch(&model_dir, &config.models)
        }
    };
    print_summary(&summary);
    if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_cleanup(
    config: &WidenConfig,
    model_dir: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<ExitCode> {
    let model_dir = model_dir.unwrap_or_else(|| config.model_dir.clone());
    println!(
        "Maintaining {} standardized models...",
        config.keep_models.len()
    );
    let plan = cleanup::plan_cleanup(&model_dir, &config.keep_models)?;
    let removed = cleanup::apply_cleanup(&plan, dry_run)?;
    for path in &removed {
        let verb = if dry_run { "Would remove" } else { "Removed" };
        println!("{verb} {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_audit(
    config: &WidenConfig,
    ui: Option<PathBuf>,
    manifest: Option<PathBuf>,
    root: Option<PathBuf>,
    json: bool,
    strict: bool,
) -> anyhow::Result<ExitCode> {
    let settings = &config.audit;
    let ui = ui.unwrap_or_else(|| settings.ui_source.clone());
    let manifest = manifest.unwrap_or_else(|| settings.manifest.clone());
    let root = root.unwrap_or_else(|| settings.asset_root.clone());
    let mut convention = AssetConvention::new(&settings.asset_suffix);
    if let Some(served_dir) = &settings.served_dir {
        convention = convention.with_served_dir(served_dir);
    }

    let report = asset_audit::audit_files(&ui, &manifest, &root, &convention)?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }
    if strict && !report.passed() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = WidenConfig::load_or_default(cli.config.as_deref())
        .with_context(|| "loading configuration")?;

    match cli.command {
        Commands::Convert {
            model_dir,
            input,
            output,
        } => Ok(run_convert(&config, model_dir, input, output)),
        Commands::Cleanup { model_dir, dry_run } => run_cleanup(&config, model_dir, dry_run),
        Commands::Audit {
            ui,
            manifest,
            root,
            json,
            strict,
        } => run_audit(&config, ui, manifest, root, json, strict),
    }
}
