//! Persisted model and category mappings.
//!
//! Both live as JSON next to each other. Writes go through a temporary file in
//! the target directory and are renamed into place, so a reader never sees a
//! half-written artifact.

use crate::mapping::Mappings;
use crate::model::TrainedModel;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const DEFAULT_MODEL_FILE: &str = "rent_model.json";
pub const DEFAULT_MAPPINGS_FILE: &str = "mappings.json";

#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("missing file: {0} (check your training step and file names)")]
    Missing(PathBuf),
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("invalid contents in {path}: {reason}")]
    Schema { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub mappings: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL_FILE.into(), mappings: DEFAULT_MAPPINGS_FILE.into() }
    }
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self { model: dir.join(DEFAULT_MODEL_FILE), mappings: dir.join(DEFAULT_MAPPINGS_FILE) }
    }
}

pub fn save_artifacts(
    paths: &ArtifactPaths,
    model: &TrainedModel,
    mappings: &Mappings,
) -> Result<(), ArtifactError> {
    write_json_atomic(&paths.model, model)?;
    write_json_atomic(&paths.mappings, mappings)?;
    tracing::info!(
        "Saved model to {} and mappings to {}",
        paths.model.display(),
        paths.mappings.display()
    );
    Ok(())
}

pub fn load_artifacts(paths: &ArtifactPaths) -> Result<(TrainedModel, Mappings), ArtifactError> {
    let model = load_model(&paths.model)?;
    let mappings = load_mappings(&paths.mappings)?;
    tracing::info!("Loaded model ({}) and mappings from {}", model, paths.mappings.display());
    Ok((model, mappings))
}

pub fn load_model(path: &Path) -> Result<TrainedModel, ArtifactError> {
    let model: TrainedModel = read_json(path)?;
    model
        .check_schema()
        .map_err(|reason| ArtifactError::Schema { path: path.to_path_buf(), reason })?;
    Ok(model)
}

pub fn load_mappings(path: &Path) -> Result<Mappings, ArtifactError> {
    let raw: BTreeMap<String, BTreeMap<String, i64>> = read_json(path)?;
    Mappings::from_raw(raw).map_err(|reason| ArtifactError::Schema { path: path.to_path_buf(), reason })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    let file =
        File::open(path).map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io { path: path.to_path_buf(), source };

    let parent_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(parent_dir).map_err(io_err)?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    temp_file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
