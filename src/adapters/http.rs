use crate::config::toml_config::SourceConfig;
use crate::domain::model::Page;
use crate::domain::ports::PageSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;

pub const ACCEPT_JSON: &str = "application/json, text/plain, */*";

/// `GET <base_url>?limit=..&location=..&offset=..` against the listing endpoint.
pub struct HttpPageSource {
    client: Client,
    base_url: String,
    location: String,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl HttpPageSource {
    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("source.user_agent", &source.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("source.accept_language", &source.accept_language)?,
        );
        headers.insert(REFERER, header_value("source.referer", &source.referer)?);

        for (key, value) in &source.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                EtlError::InvalidConfigValueError {
                    field: "source.headers".to_string(),
                    value: key.clone(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(name, header_value("source.headers", value)?);
        }

        Ok(Self {
            client: Client::new(),
            base_url: source.base_url.clone(),
            location: source.location.clone(),
            headers,
            timeout: source.timeout_seconds.map(Duration::from_secs),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page> {
        let mut request = self
            .client
            .get(&self.base_url)
            .headers(self.headers.clone())
            .query(&[
                ("limit", limit.to_string()),
                ("location", self.location.clone()),
                ("offset", offset.to_string()),
            ]);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(
            "GET {} limit={} location={} offset={}",
            self.base_url,
            limit,
            self.location,
            offset
        );

        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());
        let body = response.error_for_status()?.bytes().await?;

        serde_json::from_slice::<Page>(&body).map_err(|e| EtlError::DecodeError {
            offset,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn source_for(url: String) -> SourceConfig {
        SourceConfig {
            base_url: url,
            ..SourceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_sends_listing_query_and_browser_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/startups/")
                .query_param("limit", "8")
                .query_param("location", "all")
                .query_param("offset", "16")
                .header("accept", ACCEPT_JSON)
                .header("accept-language", "en")
                .header("referer", "https://startupbase.uz/en/startups")
                .header_exists("user-agent");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"count": 1, "next": null, "results": [{"id": 1, "name": "A"}]}));
        });

        let source =
            HttpPageSource::from_config(&source_for(server.url("/api/startups/"))).unwrap();
        let page = source.fetch_page(16, 8).await.unwrap();

        api_mock.assert();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/startups/");
            then.status(503);
        });

        let source =
            HttpPageSource::from_config(&source_for(server.url("/api/startups/"))).unwrap();
        let err = source.fetch_page(0, 8).await.unwrap_err();

        assert!(matches!(err, EtlError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_unexpected_body_is_a_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/startups/");
            then.status(200).body("<html>maintenance</html>");
        });

        let source =
            HttpPageSource::from_config(&source_for(server.url("/api/startups/"))).unwrap();
        let err = source.fetch_page(24, 8).await.unwrap_err();

        assert!(matches!(err, EtlError::DecodeError { offset: 24, .. }));
    }

    #[test]
    fn test_rejects_invalid_extra_header() {
        let mut config = source_for("http://localhost/api".to_string());
        config
            .headers
            .insert("bad header".to_string(), "x".to_string());

        assert!(HttpPageSource::from_config(&config).is_err());
    }
}
