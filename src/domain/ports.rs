use crate::domain::model::{DashboardReport, RawRecord, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Raw JSON feed to ingest.
    fn input_path(&self) -> &str;
    /// Directory the cleaned dataset is written to.
    fn output_path(&self) -> &str;
    /// File name of the cleaned dataset inside `output_path`.
    fn output_filename(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRecord>>;
    async fn transform(&self, data: Vec<RawRecord>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

/// Presents a dashboard report to its audience.
pub trait Renderer {
    fn render(&self, report: &DashboardReport) -> Result<String>;
}
