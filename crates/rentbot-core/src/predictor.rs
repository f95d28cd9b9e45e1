use crate::artifacts::{load_artifacts, ArtifactError, ArtifactPaths};
use crate::fallback;
use crate::features::FeatureVector;
use crate::mapping::Mappings;
use crate::model::TrainedModel;
use crate::record::{PropertyRecord, ValidationError};

use serde::Serialize;
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("prediction failed: {0}")]
    Computation(String),
}

/// Predict the monthly rent for one record with a loaded model.
///
/// Categories are checked against the mappings and room counts against the
/// allowed range before the model runs. Negative outputs clamp to zero.
pub fn predict(
    record: &PropertyRecord,
    model: &TrainedModel,
    mappings: &Mappings,
) -> Result<f64, PredictError> {
    record.check_bounds()?;
    let features = FeatureVector::encode(record, mappings)?;

    let rent = model.predict(&features);
    if !rent.is_finite() {
        return Err(PredictError::Computation(format!(
            "model returned {rent} for {features:?}"
        )));
    }
    Ok(rent.max(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Model,
    Fallback,
}

impl fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateSource::Model => write!(f, "model"),
            EstimateSource::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub rent: f64,
    pub source: EstimateSource,
}

/// Labels offered for each categorical input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choices {
    pub districts: Vec<String>,
    pub house_types: Vec<String>,
    pub amenities: Vec<String>,
}

/// Everything a prediction needs, built once at startup and never mutated.
#[derive(Debug, Clone)]
pub enum PredictionContext {
    Model { model: TrainedModel, mappings: Mappings },
    Fallback,
}

impl PredictionContext {
    pub fn with_model(model: TrainedModel, mappings: Mappings) -> Self {
        Self::Model { model, mappings }
    }

    /// Load the artifact pair.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let (model, mappings) = load_artifacts(paths)?;
        Ok(Self::Model { model, mappings })
    }

    /// Load the artifact pair, or run on the fallback rule if that fails.
    pub fn load_or_fallback(paths: &ArtifactPaths) -> Self {
        match Self::load(paths) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!("Could not load model ({e}). Falling back to baseline rule.");
                Self::Fallback
            },
        }
    }

    pub fn source(&self) -> EstimateSource {
        match self {
            PredictionContext::Model { .. } => EstimateSource::Model,
            PredictionContext::Fallback => EstimateSource::Fallback,
        }
    }

    pub fn estimate(&self, record: &PropertyRecord) -> Result<Estimate, PredictError> {
        let rent = match self {
            PredictionContext::Model { model, mappings } => predict(record, model, mappings)?,
            PredictionContext::Fallback => {
                record.check_bounds()?;
                fallback::estimate(record)
            },
        };
        Ok(Estimate { rent, source: self.source() })
    }

    pub fn choices(&self) -> Choices {
        match self {
            PredictionContext::Model { mappings, .. } => Choices {
                districts: mappings.district.labels().to_vec(),
                house_types: mappings.house_type.labels().to_vec(),
                amenities: mappings.amenity.labels().to_vec(),
            },
            PredictionContext::Fallback => Choices {
                districts: fallback::known_labels(fallback::DISTRICT_PREMIUMS),
                house_types: fallback::known_labels(fallback::HOUSE_TYPE_PREMIUMS),
                amenities: fallback::known_labels(fallback::AMENITY_PREMIUMS),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_rows;
    use crate::mapping::CategoryField;
    use crate::stats::Ols;
    use crate::trainer::train;

    fn context() -> PredictionContext {
        let (model, mappings) = train(&sample_rows()).unwrap();
        PredictionContext::with_model(model, mappings)
    }

    #[test]
    fn test_valid_records_give_finite_rent() {
        let ctx = context();
        let choices = ctx.choices();
        for d in &choices.districts {
            for h in &choices.house_types {
                for a in &choices.amenities {
                    for rooms in [0, 5, 10] {
                        let rec = PropertyRecord::new(d, h, rooms, 10 - rooms, a);
                        let est = ctx.estimate(&rec).unwrap();
                        assert!(est.rent.is_finite());
                        assert!(est.rent >= 0.);
                        assert_eq!(est.source, EstimateSource::Model);
                    }
                }
            }
        }
    }

    #[test]
    fn test_predict_is_bit_identical() {
        let (model, mappings) = train(&sample_rows()).unwrap();
        let rec = PropertyRecord::new("Gasabo", "Apartment", 2, 2, "Garden");
        let a = predict(&rec, &model, &mappings).unwrap();
        let b = predict(&rec, &model, &mappings).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_unknown_category_never_reaches_model() {
        let ctx = context();
        let rec = PropertyRecord::new("Musanze", "Villa", 2, 2, "Garden");
        assert_eq!(
            ctx.estimate(&rec),
            Err(PredictError::Validation(ValidationError::UnknownCategory {
                field: CategoryField::District,
                value: "Musanze".to_owned()
            }))
        );
    }

    #[test]
    fn test_out_of_range_rooms_rejected_in_both_modes() {
        let rec = PropertyRecord::new("Gasabo", "Villa", 11, 2, "Garden");
        assert!(matches!(
            context().estimate(&rec),
            Err(PredictError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            PredictionContext::Fallback.estimate(&rec),
            Err(PredictError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_negative_output_clamped() {
        let (mut model, mappings) = train(&sample_rows()).unwrap();
        model.fit = Ols::from_coeffs(-1_000_000., vec![0.; 5]);
        let rec = PropertyRecord::new("Gasabo", "Villa", 1, 1, "Garden");
        assert_eq!(predict(&rec, &model, &mappings), Ok(0.));
    }

    #[test]
    fn test_non_finite_output_is_computation_error() {
        let (mut model, mappings) = train(&sample_rows()).unwrap();
        model.fit = Ols::from_coeffs(f64::INFINITY, vec![0.; 5]);
        let rec = PropertyRecord::new("Gasabo", "Villa", 1, 1, "Garden");
        assert!(matches!(predict(&rec, &model, &mappings), Err(PredictError::Computation(_))));
    }

    #[test]
    fn test_fallback_context() {
        let ctx = PredictionContext::Fallback;
        let rec = PropertyRecord::new("Nyarugenge", "Villa", 4, 3, "Parking");
        assert_eq!(
            ctx.estimate(&rec),
            Ok(Estimate { rent: 770_000., source: EstimateSource::Fallback })
        );
        assert_eq!(ctx.choices().districts, vec!["Gasabo", "Kicukiro", "Nyarugenge"]);
    }

    #[test]
    fn test_missing_artifacts_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        assert!(matches!(PredictionContext::load(&paths), Err(ArtifactError::Missing(_))));
        assert_eq!(PredictionContext::load_or_fallback(&paths).source(), EstimateSource::Fallback);
    }
}
