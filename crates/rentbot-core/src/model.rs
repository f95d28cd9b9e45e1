use crate::features::{FeatureVector, FEATURE_COLUMNS, N_FEATURES};
use crate::stats::Ols;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fitted rent regression plus the metadata it was produced with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    /// Column order the coefficients refer to.
    pub features: Vec<String>,
    #[serde(flatten)]
    pub fit: Ols,
    pub n_samples: usize,
    pub r2: Option<f64>,
    pub rmse: Option<f64>,
    pub trained_at: DateTime<Utc>,
}

impl fmt::Display for TrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} samples, r2: {}, rmse: {}, trained {}",
            self.n_samples,
            self.r2.map_or("n/a".to_string(), |v| format!("{v:.4}")),
            self.rmse.map_or("n/a".to_string(), |v| format!("{v:.0}")),
            self.trained_at.to_rfc3339()
        )
    }
}

impl TrainedModel {
    pub fn new(fit: Ols, n_samples: usize, r2: Option<f64>, rmse: Option<f64>) -> Self {
        Self {
            features: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            fit,
            n_samples,
            r2,
            rmse,
            trained_at: Utc::now(),
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.fit.calculate(&features.to_array())
    }

    /// Reject models fitted on another column layout.
    pub fn check_schema(&self) -> Result<(), String> {
        if self.features != FEATURE_COLUMNS {
            return Err(format!(
                "model was trained on columns {:?}, expected {:?}",
                self.features, FEATURE_COLUMNS
            ));
        }
        if self.fit.coefficients.len() != N_FEATURES {
            return Err(format!(
                "model has {} coefficients, expected {}",
                self.fit.coefficients.len(),
                N_FEATURES
            ));
        }
        if !self.fit.intercept.is_finite() || self.fit.coefficients.iter().any(|c| !c.is_finite())
        {
            return Err("model has non-finite coefficients".to_owned());
        }
        Ok(())
    }
}
