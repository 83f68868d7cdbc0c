//! Delivery ETA - Main Entry Point
//!
//! Trains and evaluates the two-stage delivery duration model on a CSV of
//! historical delivery records.

use clap::{Parser, Subcommand};
use delivery_eta::evaluation::render_report;
use delivery_eta::pipeline::{Pipeline, PipelineConfig};
use delivery_eta::utils::DataLoader;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "delivery-eta", about = "Two-stage delivery duration prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the model and report evaluation metrics
    Train {
        /// Path to the historical delivery records CSV
        #[arg(long)]
        data: String,
        /// Held-out fraction of the outer split
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,
        /// Seed for every randomized stage
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Write metrics as JSON to this path
        #[arg(long)]
        metrics_out: Option<PathBuf>,
        /// Write the HTML evaluation report to this path
        #[arg(long)]
        report_out: Option<PathBuf>,
    },
    /// Print basic information about a dataset
    Info {
        /// Path to the CSV file
        #[arg(long)]
        data: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delivery_eta=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            test_size,
            seed,
            metrics_out,
            report_out,
        } => {
            let df = DataLoader::new().load_csv(&data)?;

            let config = PipelineConfig {
                test_size,
                seed,
                ..Default::default()
            };
            let report = Pipeline::with_config(config).run(&df)?;

            info!(
                rmse = report.combined_metrics.rmse,
                mae = report.combined_metrics.mae,
                r2 = report.combined_metrics.r2,
                "combined estimate vs ground truth"
            );
            info!(
                rmse = report.ensemble_metrics.rmse,
                mae = report.ensemble_metrics.mae,
                r2 = report.ensemble_metrics.r2,
                "ensemble corrector held-out metrics"
            );

            if let Some(path) = metrics_out {
                let json = serde_json::to_string_pretty(&report.ensemble_metrics)?;
                std::fs::write(&path, json)?;
                info!(path = %path.display(), "wrote metrics");
            }

            if let Some(path) = report_out {
                let html = render_report(
                    &report.actual_durations,
                    &report.final_predictions,
                    &report.combined_metrics,
                );
                std::fs::write(&path, html)?;
                info!(path = %path.display(), "wrote evaluation report");
            }
        }
        Commands::Info { data } => {
            let info = DataLoader::new().get_file_info(&data)?;
            info!(
                rows = info.n_rows,
                cols = info.n_cols,
                bytes = info.file_size,
                "dataset info"
            );
            for column in info.columns {
                println!("{column}");
            }
        }
    }

    Ok(())
}
