use httpmock::prelude::*;
use serde_json::{json, Value};
use startup_ecosystem::core::collector::{CollectOptions, Collector, StopReason};
use startup_ecosystem::{AppConfig, CollectPipeline, EtlEngine, HttpPageSource, LocalStorage};
use std::time::Duration;
use tempfile::TempDir;

fn startups(ids: std::ops::Range<i64>) -> Value {
    Value::Array(
        ids.map(|id| {
            json!({
                "id": id,
                "name": format!("Startup {}", id),
                "industry": {"id": 1, "name": "FinTech"},
                "stage": "seed",
                "region": {"id": 2, "name": "Tashkent", "country": "Uzbekistan"},
                "is_verified": id % 2 == 0
            })
        })
        .collect(),
    )
}

fn config_for(server: &MockServer, output_path: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.source.base_url = server.url("/api/startups/");
    config.source.request_delay_ms = 0;
    config.output.path = output_path.to_string();
    config
}

fn options() -> CollectOptions {
    CollectOptions {
        page_size: 8,
        request_delay: Duration::ZERO,
        retry_attempts: 0,
        retry_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_stops_at_reported_count_without_extra_request() {
    let server = MockServer::start();
    let next = server.url("/api/startups/?limit=8&offset=next");

    let first = server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "0");
        then.status(200)
            .json_body(json!({"count": 20, "next": next, "results": startups(0..8)}));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "8");
        then.status(200)
            .json_body(json!({"count": 20, "next": next, "results": startups(8..16)}));
    });
    let third = server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "16");
        then.status(200)
            .json_body(json!({"count": 20, "next": next, "results": startups(16..24)}));
    });
    let fourth = server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "24");
        then.status(200)
            .json_body(json!({"count": 20, "next": null, "results": []}));
    });

    let source = HttpPageSource::from_config(&config_for(&server, ".").source).unwrap();
    let outcome = Collector::new(&source, options()).collect().await;

    first.assert();
    second.assert();
    third.assert();
    fourth.assert_hits(0);
    assert_eq!(outcome.stop, StopReason::CountReached);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.collection.len(), 20);
    assert_eq!(outcome.collection.startups[19].id, Some(19));
}

#[tokio::test]
async fn test_empty_page_ends_collection() {
    let server = MockServer::start();
    let next = server.url("/api/startups/?offset=next");

    server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "0");
        then.status(200)
            .json_body(json!({"count": 40, "next": next, "results": startups(0..8)}));
    });
    let empty = server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "8");
        then.status(200)
            .json_body(json!({"count": 40, "next": next, "results": []}));
    });

    let source = HttpPageSource::from_config(&config_for(&server, ".").source).unwrap();
    let outcome = Collector::new(&source, options()).collect().await;

    empty.assert();
    assert_eq!(outcome.stop, StopReason::EmptyPage);
    assert_eq!(outcome.collection.len(), 8);
}

#[tokio::test]
async fn test_server_error_keeps_first_page_and_writes_files() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();
    let next = server.url("/api/startups/?offset=next");

    let first = server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "0");
        then.status(200)
            .json_body(json!({"count": 40, "next": next, "results": startups(0..8)}));
    });
    let failing = server.mock(|when, then| {
        when.method(GET).path("/api/startups/").query_param("offset", "8");
        then.status(500).body("upstream exploded");
    });

    let config = config_for(&server, &output_path);
    let source = HttpPageSource::from_config(&config.source).unwrap();
    let pipeline = CollectPipeline::new(LocalStorage::new(&output_path), source, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let summary = engine.run().await.unwrap();

    first.assert();
    failing.assert();
    assert!(summary.contains("partial: aborted at offset 8"));

    let json_path = temp_dir.path().join("startups_data.json");
    let saved: Value = serde_json::from_slice(&std::fs::read(json_path).unwrap()).unwrap();
    assert_eq!(saved["total_count"], 8);
    assert_eq!(saved["startups"].as_array().unwrap().len(), 8);

    let csv = std::fs::read_to_string(temp_dir.path().join("startups_data.csv")).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("id,name,"));
    assert_eq!(lines.count(), 8);
}

#[tokio::test]
async fn test_failed_collection_keeps_previous_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let json_path = temp_dir.path().join("startups_data.json");
    let csv_path = temp_dir.path().join("startups_data.csv");
    let previous_json = serde_json::to_vec_pretty(&json!({
        "total_count": 2,
        "startups": startups(0..2),
    }))
    .unwrap();
    let previous_csv = "id,name\n0,Startup 0\n1,Startup 1\n";
    std::fs::write(&json_path, &previous_json).unwrap();
    std::fs::write(&csv_path, previous_csv).unwrap();

    let server = MockServer::start();
    let unavailable = server.mock(|when, then| {
        when.method(GET).path("/api/startups/");
        then.status(503).body("maintenance");
    });

    let config = config_for(&server, &output_path);
    let source = HttpPageSource::from_config(&config.source).unwrap();
    let engine = EtlEngine::new(CollectPipeline::new(
        LocalStorage::new(&output_path),
        source,
        config,
    ));

    let summary = engine.run().await.unwrap();

    unavailable.assert();
    assert!(summary.contains("nothing written"));
    assert_eq!(std::fs::read(&json_path).unwrap(), previous_json);
    assert_eq!(std::fs::read_to_string(&csv_path).unwrap(), previous_csv);
}

#[tokio::test]
async fn test_non_json_first_page_writes_no_files() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/api/startups/");
        then.status(200).body("<html>maintenance</html>");
    });

    let config = config_for(&server, &output_path);
    let source = HttpPageSource::from_config(&config.source).unwrap();
    let engine = EtlEngine::new(CollectPipeline::new(
        LocalStorage::new(&output_path),
        source,
        config,
    ));

    let summary = engine.run().await.unwrap();

    assert!(summary.starts_with("no startups collected"));
    assert!(!temp_dir.path().join("startups_data.csv").exists());
    assert!(!temp_dir.path().join("startups_data.json").exists());
}
