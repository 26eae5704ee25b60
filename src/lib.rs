pub mod adapters;
pub mod config;
pub mod core;
pub mod disease;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::adapters::TfServingBackend;
pub use crate::config::{cli::LocalStorage, toml_config::AgriConfig};
pub use crate::core::{
    dataset::Dataset,
    engine::PredictionEngine,
    pipeline::BatchPipeline,
    predictor::{CropPredictor, PredictorSettings, Strategy},
    query::extract_crop_details,
};
pub use crate::disease::{Diagnosis, DiseaseLabels, LeafDiseaseClassifier, ModelId};
pub use crate::domain::model::{PredictionOutcome, PredictionRequest, PredictionResult, RawRequest};
pub use crate::utils::error::{AgriError, Result};
