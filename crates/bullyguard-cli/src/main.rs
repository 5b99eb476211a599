//! BullyGuard CLI
//!
//! Trains, persists and runs the cyberbullying detector from the command
//! line. Results go to stdout as JSON, logs go to stderr.

use anyhow::{Context, Result};
use bullyguard_classifiers::{model, Classifier, CyberbullyDetector, DetectorConfig, TrainingCorpus};
use clap::Parser;
use std::path::Path;
use tracing::info;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    let mut config = load_config(&cli.config)?;

    match cli.command {
        Commands::Train { corpus, output } => {
            if let Some(output) = output {
                config.model_path = Some(output);
            }
            let path = config
                .model_path
                .clone()
                .context("no model path configured, pass --output")?;

            let corpus = match corpus {
                Some(file) => TrainingCorpus::from_json_file(&file)
                    .with_context(|| format!("Failed to read corpus {}", file.display()))?,
                None => TrainingCorpus::builtin(),
            };
            info!("Training on {} examples", corpus.len());

            let detector = CyberbullyDetector::with_config(&config)?;
            let report = detector.retrain(&corpus)?;
            if let Some(trained) = detector.model() {
                model::save_to_file(&trained, &path)?;
            }

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Classify { text, model } => {
            if let Some(model) = model {
                config.model_path = Some(model);
                config.train_if_missing = false;
            }

            let detector = CyberbullyDetector::from_config(&config)?;
            let result = Classifier::classify(&detector, &text).await?;

            println!("{}", serde_json::to_string(&result)?);
        }

        Commands::Features { text } => {
            let detector = CyberbullyDetector::with_config(&config)?;
            let features = detector.extract_features(&text);

            println!("{}", serde_json::to_string_pretty(&features)?);
        }
    }

    Ok(())
}

/// Configuration file when present, defaults otherwise
fn load_config(path: &Path) -> Result<DetectorConfig> {
    if path.exists() {
        let config = DetectorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    } else {
        Ok(DetectorConfig::default())
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("bullyguard=debug,bullyguard_classifiers=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bullyguard=info,bullyguard_classifiers=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
