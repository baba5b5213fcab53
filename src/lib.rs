pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::render::{CsvRenderer, JsonRenderer, OutputFormat, TextRenderer};
pub use crate::adapters::storage::LocalStorage;
pub use crate::core::aggregation::{busiest_week, daily_cumulative_total, run_query, top_zip_codes};
pub use crate::core::dashboard::{build_report, Dashboard};
pub use crate::core::validator::{clean, clean_with_report};
pub use crate::core::{etl::EtlEngine, pipeline::OpenHousePipeline};
pub use crate::domain::model::{
    AggregateResult, CleanRecord, CleanReport, CleanedDataset, DashboardReport, QueryKind,
    RawRecord,
};
pub use crate::utils::error::{EtlError, Result};
