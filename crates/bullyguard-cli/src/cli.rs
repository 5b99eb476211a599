use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bullyguard")]
#[command(author, version, about = "Cyberbullying detection for short messages")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Detector configuration file (YAML)
    #[arg(short, long, global = true, env = "BULLYGUARD_CONFIG", default_value = "bullyguard.yaml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model and save it
    Train {
        /// JSON corpus of `{"text", "label"}` records; built-in corpus when omitted
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Where to write the model (overrides `model_path`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify one message and print the result as JSON
    Classify {
        /// Message text
        text: String,

        /// Model file (overrides `model_path`)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Print the heuristic feature vector of a message as JSON
    Features {
        /// Message text
        text: String,
    },
}
