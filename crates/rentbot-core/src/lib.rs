pub mod artifacts;
pub mod averages;
pub mod chart;
pub mod dataset;
pub mod fallback;
pub mod features;
pub mod mapping;
pub mod model;
pub mod predictor;
pub mod record;
pub mod stats;
pub mod synth;
pub mod trainer;
pub mod types;

pub use artifacts::{ArtifactError, ArtifactPaths};
pub use dataset::RentalRow;
pub use mapping::Mappings;
pub use model::TrainedModel;
pub use predictor::{Estimate, EstimateSource, PredictError, PredictionContext};
pub use record::{PropertyForm, PropertyRecord, ValidationError};
