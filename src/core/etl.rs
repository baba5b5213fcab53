use crate::domain::model::CleanReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// What one ingestion run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub report: CleanReport,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting open house processing");

        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Input produced {} raw records", raw_data.len());

        let transformed = self.pipeline.transform(raw_data).await?;
        let report = transformed.report;
        tracing::info!("Processing produced {} cleaned records", report.cleaned_records);

        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Cleaned dataset written to {}", output_path);

        Ok(RunSummary {
            output_path,
            report,
        })
    }
}
