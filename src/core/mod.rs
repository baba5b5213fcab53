pub mod aggregation;
pub mod dashboard;
pub mod etl;
pub mod persist;
pub mod pipeline;
pub mod validator;

pub use crate::domain::model::{CleanRecord, CleanedDataset, RawRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Renderer, Storage};
pub use crate::utils::error::Result;
