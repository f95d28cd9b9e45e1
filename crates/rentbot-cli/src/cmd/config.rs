use rentbot_core::artifacts::{save_artifacts, ArtifactError, ArtifactPaths};
use rentbot_core::chart::format_rwf;
use rentbot_core::dataset::{read_datasets, sample_rows, write_dataset_csv, DatasetError};
use rentbot_core::fallback;
use rentbot_core::predictor::{Estimate, EstimateSource, PredictError, PredictionContext};
use rentbot_core::record::{PropertyForm, ValidationError};
use rentbot_core::synth::synth;
use rentbot_core::trainer::{train, TrainError};

use std::path::PathBuf;

/* =================== Public configuration types =================== */

#[derive(Debug)]
pub struct Config {
    pub action: Action,
}

#[derive(Debug, Clone)]
pub enum Action {
    Train(Train),
    Predict(Predict),
    Estimate(PropertyForm),
    Synth(Synth),
}

#[derive(Debug, Clone)]
pub struct Train {
    /// Resolved data files, empty means the built-in sample.
    pub inputs: Vec<PathBuf>,
    /// Wildcard patterns that matched no file.
    pub unmatched: Vec<String>,
    pub paths: ArtifactPaths,
}

#[derive(Debug, Clone)]
pub struct Predict {
    pub form: PropertyForm,
    pub paths: ArtifactPaths,
    pub allow_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct Synth {
    pub output: PathBuf,
    pub rows: usize,
    pub seed: u64,
}

/* =================== Error type (no process::exit) =================== */

#[derive(thiserror::Error, Debug)]
pub enum CmdError {
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("could not read data: {0}")]
    Dataset(#[from] DatasetError),
    #[error("training failed: {0}")]
    Train(#[from] TrainError),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Msg(String),
}

/* =================== Entry point =================== */

impl Config {
    pub fn run(&self) -> Result<(), CmdError> {
        match &self.action {
            Action::Train(t) => {
                let summary = run_train(t)?;
                println!("{summary}");
            },
            Action::Predict(p) => print_estimate(&run_predict(p)?),
            Action::Estimate(form) => print_estimate(&run_estimate(form)?),
            Action::Synth(s) => {
                run_synth(s)?;
                println!("Wrote {} rows to {}", s.rows, s.output.display());
            },
        }
        Ok(())
    }
}

fn print_estimate(est: &Estimate) {
    match est.source {
        EstimateSource::Model => println!("Predicted Rent: {}", format_rwf(est.rent)),
        EstimateSource::Fallback => {
            println!("Predicted Rent: {} (baseline estimate)", format_rwf(est.rent))
        },
    }
}

/* =================== Actions =================== */

fn run_train(t: &Train) -> Result<String, CmdError> {
    if !t.unmatched.is_empty() {
        return Err(CmdError::Msg(format!("No files matched {:?}", t.unmatched)));
    }
    let rows = if t.inputs.is_empty() {
        tracing::info!("No input files given, training on the built-in sample");
        sample_rows()
    } else {
        read_datasets(&t.inputs)?
    };

    let (model, mappings) = train(&rows)?;
    save_artifacts(&t.paths, &model, &mappings)?;
    Ok(format!("Trained on {} rows. {}", rows.len(), model))
}

fn run_predict(p: &Predict) -> Result<Estimate, CmdError> {
    let record = p.form.validate()?;
    let ctx = if p.allow_fallback {
        PredictionContext::load_or_fallback(&p.paths)
    } else {
        PredictionContext::load(&p.paths)?
    };
    let est = ctx.estimate(&record).inspect_err(|e| tracing::error!("{record}: {e}"))?;
    tracing::debug!("{record} -> {} ({})", est.rent, est.source);
    Ok(est)
}

fn run_estimate(form: &PropertyForm) -> Result<Estimate, CmdError> {
    let record = form.validate()?;
    Ok(Estimate { rent: fallback::estimate(&record), source: EstimateSource::Fallback })
}

fn run_synth(s: &Synth) -> Result<(), CmdError> {
    if s.rows == 0 {
        return Err(CmdError::Msg("Refusing to write an empty dataset".to_owned()));
    }
    let rows = synth(s.rows, s.seed);
    write_dataset_csv(&s.output, &rows)?;
    Ok(())
}
