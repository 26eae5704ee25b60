pub mod dataset;
pub mod encoding;
pub mod engine;
pub mod pipeline;
pub mod predictor;
pub mod preprocessing;
pub mod query;
pub mod svm;

pub use crate::domain::model::{BatchEntry, BatchReport, RawRequest, RequestRow};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
