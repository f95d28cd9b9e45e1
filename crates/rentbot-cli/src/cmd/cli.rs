use clap::{Args, Parser, Subcommand, ValueHint};
use glob::glob;
use std::path::PathBuf;

use crate::cmd::config::{Action, Config, Predict, Synth, Train};
use rentbot_core::artifacts::{ArtifactPaths, DEFAULT_MAPPINGS_FILE, DEFAULT_MODEL_FILE};
use rentbot_core::record::PropertyForm;

#[derive(Debug, Parser)]
#[command(
    name = "rentbot",
    about = "Monthly rent estimates for Kigali listings",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fit the rent model and write the model and mappings files
    Train(TrainArgs),

    /// Predict rent with a trained model
    Predict(PredictArgs),

    /// Rule-based estimate, no model needed
    Estimate(PropertyArgs),

    /// Write a synthetic training dataset
    Synth(SynthArgs),
}

#[derive(Debug, Args)]
pub struct ArtifactArgs {
    /// Model file
    #[arg(long = "model", value_name = "PATH", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    /// Category mappings file
    #[arg(long = "mappings", value_name = "PATH", default_value = DEFAULT_MAPPINGS_FILE)]
    pub mappings: PathBuf,
}

impl ArtifactArgs {
    fn into_paths(self) -> ArtifactPaths {
        ArtifactPaths { model: self.model, mappings: self.mappings }
    }
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// CSV files or glob patterns (quote the pattern). Uses the built-in sample when omitted
    #[arg(num_args = 1..,
        value_hint = ValueHint::AnyPath,
        short = 'i', long = "inputs",
        value_name = "Input files")]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

impl TrainArgs {
    /// Expand `inputs` into actual files.
    ///
    /// Also returns every wildcard pattern that matched no file, invalid ones included.
    pub fn resolve_files(&self) -> (Vec<PathBuf>, Vec<String>) {
        let mut out = Vec::new();
        let mut unmatched = Vec::new();

        for inp in &self.inputs {
            // treat as glob if it has wildcards
            if inp.contains('*') || inp.contains('?') || inp.contains('[') {
                let before = out.len();
                match glob(inp) {
                    Ok(paths) => out.extend(paths.filter_map(Result::ok)),
                    Err(e) => tracing::warn!("Invalid glob '{}': {}", inp, e),
                }
                if out.len() == before {
                    unmatched.push(inp.clone());
                }
            } else {
                out.push(PathBuf::from(inp));
            }
        }

        (out, unmatched)
    }
}

#[derive(Debug, Args)]
pub struct PropertyArgs {
    #[arg(long)]
    pub district: String,

    #[arg(long = "house-type")]
    pub house_type: String,

    #[arg(long, allow_negative_numbers = true)]
    pub bedrooms: i64,

    #[arg(long, allow_negative_numbers = true)]
    pub bathrooms: i64,

    /// Main amenity, e.g. Garden
    #[arg(long)]
    pub amenity: String,
}

impl From<PropertyArgs> for PropertyForm {
    fn from(p: PropertyArgs) -> Self {
        PropertyForm {
            district: Some(p.district),
            house_type: Some(p.house_type),
            bedrooms: Some(p.bedrooms),
            bathrooms: Some(p.bathrooms),
            amenity: Some(p.amenity),
        }
    }
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub property: PropertyArgs,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Use the rule-based estimate if the model files can't be loaded
    #[arg(long)]
    pub fallback: bool,
}

#[derive(Debug, Args)]
pub struct SynthArgs {
    /// Output CSV file
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Number of rows
    #[arg(short = 'n', long = "rows", default_value_t = 200)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

// -------- Map CLI -> Config/Action --------

impl Cli {
    pub fn into_config(self) -> Config {
        let action = match self.command {
            Commands::Train(args) => {
                let (inputs, unmatched) = args.resolve_files();
                Action::Train(Train { inputs, unmatched, paths: args.artifacts.into_paths() })
            },
            Commands::Predict(args) => Action::Predict(Predict {
                form: args.property.into(),
                paths: args.artifacts.into_paths(),
                allow_fallback: args.fallback,
            }),
            Commands::Estimate(property) => Action::Estimate(property.into()),
            Commands::Synth(args) => {
                Action::Synth(Synth { output: args.output, rows: args.rows, seed: args.seed })
            },
        };
        Config { action }
    }
}
