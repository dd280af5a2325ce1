use crate::core::aggregate::{analyze, EcosystemReport, ReportSettings};
use crate::core::persist;
use crate::core::{Collection, ConfigProvider, Pipeline, Storage};
use crate::report::{self, ChartKind};
use crate::utils::error::{EtlError, Result};

/// Reads the collected JSON and renders the ten ecosystem charts.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) settings: ReportSettings,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C, settings: ReportSettings) -> Self {
        Self {
            storage,
            config,
            settings,
        }
    }

    fn chart_path(&self, kind: ChartKind) -> String {
        format!(
            "{}/{}",
            self.config.charts_dir().trim_end_matches('/'),
            kind.file_name()
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    type Extracted = Collection;
    type Transformed = EcosystemReport;

    fn name(&self) -> &str {
        "ecosystem report"
    }

    async fn extract(&self) -> Result<Collection> {
        let path = self.config.json_file();
        tracing::info!("Loading data from {}", path);

        let bytes = self.storage.read_file(path).await.map_err(|e| match e {
            EtlError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                EtlError::MissingConfigError {
                    field: format!("{} (run the collector first)", path),
                }
            }
            other => other,
        })?;

        let collection = persist::from_json(&bytes)?;
        tracing::info!("Loaded {} startups", collection.len());
        Ok(collection)
    }

    async fn transform(&self, collection: Collection) -> Result<EcosystemReport> {
        Ok(analyze(&collection.startups, &self.settings))
    }

    async fn load(&self, report: EcosystemReport) -> Result<String> {
        if report.is_empty() {
            tracing::warn!("No startups in the data file; no charts were generated");
            return Ok("no startups to report on, 0 charts written".to_string());
        }

        if !report::fonts_available() {
            tracing::warn!("No usable sans-serif font found; chart rendering will likely fail");
        }

        let mut written = 0;
        for kind in ChartKind::ALL {
            let path = self.chart_path(kind);
            match report::render(kind, &report) {
                Ok(png) => {
                    self.storage.write_file(&path, &png).await?;
                    tracing::info!("✓ Saved {}: {}", kind.description(), path);
                    written += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path, e);
                }
            }
        }

        Ok(format!(
            "{}/{} charts written to {}",
            written,
            ChartKind::ALL.len(),
            self.config.charts_dir()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::persist::tests::MockStorage;
    use serde_json::json;

    fn pipeline(storage: MockStorage) -> ReportPipeline<MockStorage, AppConfig> {
        let config = AppConfig::default();
        let settings = config.report.settings();
        ReportPipeline::new(storage, config, settings)
    }

    async fn seed(storage: &MockStorage, body: serde_json::Value) {
        storage
            .write_file("startups_data.json", body.to_string().as_bytes())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_data_file_points_at_the_collector() {
        let err = pipeline(MockStorage::new()).extract().await.unwrap_err();

        assert!(matches!(err, EtlError::MissingConfigError { .. }));
        assert!(err.to_string().contains("startups_data.json"));
    }

    #[tokio::test]
    async fn test_empty_dataset_writes_no_charts() {
        let storage = MockStorage::new();
        seed(&storage, json!({"total_count": 0, "startups": []})).await;
        let pipeline = pipeline(storage.clone());

        let collection = pipeline.extract().await.unwrap();
        let report = pipeline.transform(collection).await.unwrap();
        let summary = pipeline.load(report).await.unwrap();

        assert!(summary.contains("0 charts"));
        assert_eq!(storage.paths().await, vec!["startups_data.json".to_string()]);
    }

    #[tokio::test]
    async fn test_transform_aggregates_loaded_records() {
        let storage = MockStorage::new();
        seed(
            &storage,
            json!({
                "total_count": 3,
                "startups": [
                    {"id": 1, "industry": {"id": 1, "name": "FinTech"}, "stage": "seed", "is_verified": true},
                    {"id": 2, "industry": {"id": 1, "name": "FinTech"}, "stage": "expension"},
                    {"id": 3, "region": {"id": 4, "name": "Tashkent"}}
                ]
            }),
        )
        .await;
        let pipeline = pipeline(storage);

        let report = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.top_industries[0].label, "FinTech");
        assert_eq!(report.top_industries[0].count, 2);
        assert_eq!(report.status_flags[0].count, 1);
    }

    #[tokio::test]
    async fn test_renders_every_chart() {
        if !report::fonts_available() {
            eprintln!("skipping chart rendering check: no usable sans-serif font");
            return;
        }

        let storage = MockStorage::new();
        seed(
            &storage,
            json!({
                "total_count": 2,
                "startups": [
                    {"id": 1, "industry": {"id": 1, "name": "FinTech"}, "stage": "seed"},
                    {"id": 2, "industry": {"id": 2, "name": "EdTech"}, "stage": "series_a"}
                ]
            }),
        )
        .await;
        let pipeline = pipeline(storage.clone());

        let report = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();
        let summary = pipeline.load(report).await.unwrap();

        assert_eq!(summary, "10/10 charts written to charts");
        assert!(storage.get_file("charts/10_key_metrics.png").await.is_some());
    }
}
