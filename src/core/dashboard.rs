use crate::core::{aggregation, persist};
use crate::domain::model::{CleanedDataset, DashboardReport, QueryKind};
use crate::domain::ports::{Renderer, Storage};
use crate::utils::error::Result;

/// Runs every dashboard query against one dataset.
pub fn build_report(dataset: &CleanedDataset) -> DashboardReport {
    let results = QueryKind::ALL
        .iter()
        .map(|&kind| aggregation::run_query(dataset, kind))
        .collect();

    DashboardReport {
        total_records: dataset.len(),
        results,
    }
}

/// Loads a persisted cleaned dataset and renders the dashboard from it.
pub struct Dashboard<S: Storage> {
    storage: S,
    data_path: String,
}

impl<S: Storage> Dashboard<S> {
    pub fn new(storage: S, data_path: impl Into<String>) -> Self {
        Self {
            storage,
            data_path: data_path.into(),
        }
    }

    pub async fn report(&self) -> Result<DashboardReport> {
        let dataset = persist::load_dataset(&self.storage, &self.data_path).await?;
        let report = build_report(&dataset);
        for result in &report.results {
            tracing::debug!("{}: {} rows", result.kind().title(), result.len());
        }
        Ok(report)
    }

    pub async fn display<R: Renderer>(&self, renderer: &R) -> Result<String> {
        let report = self.report().await?;
        renderer.render(&report)
    }
}
