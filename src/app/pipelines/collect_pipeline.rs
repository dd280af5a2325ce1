use crate::core::aggregate::log_collection_summary;
use crate::core::collector::{CollectOptions, CollectOutcome, Collector, StopReason};
use crate::core::persist::{self, PersistPayload};
use crate::core::{Collection, ConfigProvider, PageSource, Pipeline, Storage};
use crate::utils::error::Result;

/// A finished walk over the listing, serialized and waiting to be written.
#[derive(Debug, Clone)]
pub struct CollectedBatch {
    pub collection: Collection,
    pub stop: StopReason,
    pub pages_fetched: usize,
    pub payload: PersistPayload,
}

/// Pages through the listing and saves it as `startups_data.csv` / `.json`.
pub struct CollectPipeline<S: Storage, P: PageSource, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) source: P,
    pub(crate) config: C,
}

impl<S: Storage, P: PageSource, C: ConfigProvider> CollectPipeline<S, P, C> {
    pub fn new(storage: S, source: P, config: C) -> Self {
        Self {
            storage,
            source,
            config,
        }
    }

    fn options(&self) -> CollectOptions {
        CollectOptions {
            page_size: self.config.page_size(),
            request_delay: self.config.request_delay(),
            retry_attempts: self.config.retry_attempts(),
            retry_delay: self.config.retry_delay(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, P: PageSource, C: ConfigProvider> Pipeline for CollectPipeline<S, P, C> {
    type Extracted = CollectOutcome;
    type Transformed = CollectedBatch;

    fn name(&self) -> &str {
        "startup collector"
    }

    async fn extract(&self) -> Result<CollectOutcome> {
        tracing::info!(
            "Collecting from {} (location={}, page size={})",
            self.config.base_url(),
            self.config.location(),
            self.config.page_size()
        );
        Ok(Collector::new(&self.source, self.options()).collect().await)
    }

    async fn transform(&self, outcome: CollectOutcome) -> Result<CollectedBatch> {
        if outcome.collection.is_empty() {
            tracing::warn!("No startups were collected");
        }
        let payload = persist::render(&outcome.collection)?;

        Ok(CollectedBatch {
            collection: outcome.collection,
            stop: outcome.stop,
            pages_fetched: outcome.pages_fetched,
            payload,
        })
    }

    async fn load(&self, batch: CollectedBatch) -> Result<String> {
        if batch.collection.is_empty() {
            tracing::warn!(
                "No data was scraped ({}); {} and {} were left untouched",
                batch.stop,
                self.config.csv_file(),
                self.config.json_file()
            );
            return Ok(format!(
                "no startups collected from {} pages ({}), nothing written",
                batch.pages_fetched, batch.stop
            ));
        }

        let report = persist::write(
            &self.storage,
            &batch.payload,
            self.config.csv_file(),
            self.config.json_file(),
        )
        .await?;

        log_collection_summary(&batch.collection.startups);

        let mut summary = format!(
            "{} startups from {} pages -> {}",
            report.records, batch.pages_fetched, report.json_path
        );
        if let Some(csv_path) = &report.csv_path {
            summary.push_str(&format!(", {}", csv_path));
        }

        if batch.stop.is_aborted() {
            tracing::warn!("⚠️ Collection {}; partial data was saved", batch.stop);
            summary.push_str(&format!(" (partial: {})", batch.stop));
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::etl::EtlEngine;
    use crate::core::persist::tests::MockStorage;
    use crate::domain::model::Page;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct CannedSource {
        pages: Mutex<VecDeque<Result<Page>>>,
    }

    impl CannedSource {
        fn new(pages: Vec<Result<Page>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
            }
        }
    }

    #[async_trait]
    impl PageSource for CannedSource {
        async fn fetch_page(&self, offset: usize, _limit: usize) -> Result<Page> {
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request at offset {}", offset))
        }
    }

    fn page(count: usize, body: serde_json::Value, next: bool) -> Result<Page> {
        Ok(Page {
            count,
            results: serde_json::from_value(body).unwrap(),
            next: next.then(|| "next".to_string()),
        })
    }

    const PREVIOUS_JSON: &[u8] = br#"{"total_count": 1, "startups": [{"id": 7}]}"#;
    const PREVIOUS_CSV: &[u8] = b"id,name\n7,Kept\n";

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.source.page_size = 2;
        config.source.request_delay_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_collects_and_writes_both_files() {
        let storage = MockStorage::new();
        let source = CannedSource::new(vec![
            page(
                3,
                json!([
                    {"id": 1, "name": "Alpha", "industry": {"id": 1, "name": "FinTech"}, "stage": "seed"},
                    {"id": 2, "name": "Beta", "stage": "serias_a"}
                ]),
                true,
            ),
            page(3, json!([{"id": 3, "name": "Gamma"}]), false),
        ]);
        let engine = EtlEngine::new(CollectPipeline::new(storage.clone(), source, quiet_config()));

        let summary = engine.run().await.unwrap();

        assert!(summary.starts_with("3 startups from 2 pages"));
        assert!(!summary.contains("partial"));
        assert_eq!(
            storage.paths().await,
            vec!["startups_data.csv".to_string(), "startups_data.json".to_string()]
        );

        let json = storage.get_file("startups_data.json").await.unwrap();
        let saved: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(saved["total_count"], 3);
        assert_eq!(saved["startups"][2]["name"], "Gamma");

        let csv = String::from_utf8(storage.get_file("startups_data.csv").await.unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_aborted_collection_still_saves_partial_data() {
        let storage = MockStorage::new();
        let source = CannedSource::new(vec![
            page(5, json!([{"id": 1}, {"id": 2}]), true),
            Err(EtlError::DecodeError {
                offset: 2,
                message: "expected value at line 1 column 1".to_string(),
            }),
        ]);
        let engine = EtlEngine::new(CollectPipeline::new(storage.clone(), source, quiet_config()));

        let summary = engine.run().await.unwrap();

        assert!(summary.contains("partial: aborted at offset 2"));
        let json = storage.get_file("startups_data.json").await.unwrap();
        let saved: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(saved["total_count"], 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_leaves_previous_files_untouched() {
        let storage = MockStorage::new();
        storage.write_file("startups_data.json", PREVIOUS_JSON).await.unwrap();
        storage.write_file("startups_data.csv", PREVIOUS_CSV).await.unwrap();
        let source = CannedSource::new(vec![Err(EtlError::DecodeError {
            offset: 0,
            message: "missing field `count`".to_string(),
        })]);
        let pipeline = CollectPipeline::new(storage.clone(), source, quiet_config());

        let outcome = pipeline.extract().await.unwrap();
        assert!(outcome.stop.is_aborted());

        let batch = pipeline.transform(outcome).await.unwrap();
        assert!(batch.payload.csv.is_none());

        let summary = pipeline.load(batch).await.unwrap();
        assert!(summary.starts_with("no startups collected from 0 pages"));
        assert!(summary.ends_with("nothing written"));
        assert_eq!(storage.get_file("startups_data.json").await.unwrap(), PREVIOUS_JSON);
        assert_eq!(storage.get_file("startups_data.csv").await.unwrap(), PREVIOUS_CSV);
    }

    #[tokio::test]
    async fn test_empty_first_page_writes_nothing() {
        let storage = MockStorage::new();
        let source = CannedSource::new(vec![page(0, json!([]), false)]);
        let engine = EtlEngine::new(CollectPipeline::new(storage.clone(), source, quiet_config()));

        let summary = engine.run().await.unwrap();

        assert!(summary.contains("server returned an empty page"));
        assert!(storage.paths().await.is_empty());
    }
}
