pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::disease::ModelId;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "agrismart")]
#[command(about = "Crop recommendation and leaf disease detection")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "agrismart.toml")]
    pub config: String,

    /// Override dataset path from config
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU / memory usage per stage")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Recommend a crop for a location, soil type and area
    Predict {
        #[arg(long)]
        location: String,
        #[arg(long)]
        soil: String,
        #[arg(long)]
        area: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Extract location, soil and area from a free-text question and predict
    Ask { query: String },
    /// Run predictions for every row of a request CSV and write a zip report
    Batch {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: Option<String>,
    },
    /// Classify leaf disease from an image
    Classify {
        #[arg(long)]
        image: String,
        #[arg(long)]
        model: Option<ModelId>,
    },
}
