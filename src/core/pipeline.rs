use crate::core::{persist, validator};
use crate::domain::model::{raw_records_from_json, RawRecord, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use std::path::Path;

/// Reads a raw JSON feed, cleans it and writes the cleaned dataset.
pub struct OpenHousePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> OpenHousePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn output_file(&self) -> String {
        Path::new(self.config.output_path())
            .join(self.config.output_filename())
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for OpenHousePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::debug!("Reading raw open houses from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;

        let document: serde_json::Value = serde_json::from_slice(&bytes)?;
        raw_records_from_json(document)
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<TransformResult> {
        let (dataset, report) = validator::clean_with_report(data)?;
        if report.dropped() > 0 {
            tracing::warn!(
                "Dropped {} invalid records ({} without key, {} bad start, {} bad end, {} bad DateModified)",
                report.dropped(),
                report.missing_key,
                report.invalid_start_time,
                report.invalid_end_time,
                report.invalid_date_modified
            );
        }
        Ok(TransformResult { dataset, report })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_file = self.output_file();
        persist::save_dataset(&self.storage, &output_file, &result.dataset).await?;
        tracing::debug!("Cleaned dataset saved successfully");
        Ok(output_file)
    }
}
