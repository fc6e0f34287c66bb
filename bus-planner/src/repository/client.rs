//! HTTP client for a remote document store.
//!
//! The store exposes two read-only collections:
//! - `GET {base}/lines?category=..&city=..&parish=..` returns line records
//! - `GET {base}/lines/{code}/stops` returns that line's stop records
//!
//! Requests are authenticated with an `x-apikey` header and bounded by a
//! semaphore. Failures are returned as-is; there are no retries.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{AreaContext, Category, Line, LineCode, Stop};

use super::StopRepository;
use super::convert::{RepositoryConfig, convert_line, convert_stop};
use super::error::RepositoryError;
use super::records::{LineRecord, StopRecord};

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Configuration for the HTTP repository.
#[derive(Debug, Clone)]
pub struct HttpRepositoryConfig {
    /// Base URL of the store, without a trailing slash
    pub base_url: String,
    /// API key sent as `x-apikey`, if the store requires one
    pub api_key: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Record conversion settings
    pub conversion: RepositoryConfig,
}

impl HttpRepositoryConfig {
    /// Create a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            conversion: RepositoryConfig::default(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Set record conversion settings.
    pub fn with_conversion(mut self, conversion: RepositoryConfig) -> Self {
        self.conversion = conversion;
        self
    }
}

/// Repository reading from a remote document store.
#[derive(Debug, Clone)]
pub struct HttpRepository {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
    conversion: RepositoryConfig,
}

impl HttpRepository {
    /// Create a new client with the given configuration.
    pub fn new(config: HttpRepositoryConfig) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| RepositoryError::NotConfigured("invalid API key format".into()))?;
            headers.insert("x-apikey", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            conversion: config.conversion,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        not_found: impl FnOnce() -> RepositoryError,
    ) -> Result<T, RepositoryError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RepositoryError::NotConfigured("request semaphore closed".into()))?;

        debug!(url, "Fetching from store");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RepositoryError::Unauthorized);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RepositoryError::Json {
            message: format!("{e} (body: {})", body.chars().take(500).collect::<String>()),
        })
    }
}

impl StopRepository for HttpRepository {
    async fn fetch_lines(
        &self,
        category: Category,
        area: &AreaContext,
    ) -> Result<Vec<Line>, RepositoryError> {
        let url = format!("{}/lines", self.base_url);
        let mut query = vec![("category", category.as_str())];
        if let Some(city) = &area.city {
            query.push(("city", city.as_str()));
        }
        if let Some(parish) = &area.parish {
            query.push(("parish", parish.as_str()));
        }

        let records: Vec<LineRecord> = self
            .get_json(&url, &query, || RepositoryError::NotFound(format!("category {}", category.as_str())))
            .await?;

        let mut lines: Vec<Line> = records
            .iter()
            .filter_map(|record| match convert_line(record, &self.conversion) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(code = ?record.codigo, error = %e, "Skipping line record");
                    None
                }
            })
            // The store filters too, but a line of another category is never usable
            .filter(|line| line.category == category)
            .collect();
        lines.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(lines)
    }

    async fn fetch_stops(&self, line: &LineCode) -> Result<Vec<Stop>, RepositoryError> {
        let url = format!("{}/lines/{}/stops", self.base_url, line.as_str());
        let records: Vec<StopRecord> = self
            .get_json(&url, &[], || RepositoryError::NotFound(line.to_string()))
            .await?;

        Ok(records
            .iter()
            .filter_map(|record| match convert_stop(record, Some(line)) {
                Ok(stop) => Some(stop),
                Err(e) => {
                    warn!(line = %line, code = ?record.codigo, error = %e, "Skipping stop record");
                    None
                }
            })
            .collect())
    }

    async fn fetch_line(&self, line: &LineCode) -> Result<Option<Line>, RepositoryError> {
        let url = format!("{}/lines/{}", self.base_url, line.as_str());
        let result: Result<LineRecord, _> = self
            .get_json(&url, &[], || RepositoryError::NotFound(line.to_string()))
            .await;

        match result {
            Ok(record) => Ok(Some(
                convert_line(&record, &self.conversion).map_err(|e| RepositoryError::Json {
                    message: e.to_string(),
                })?,
            )),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = HttpRepositoryConfig::new("http://store.local/api/")
            .with_api_key("secret")
            .with_max_concurrent(0);
        assert_eq!(config.base_url, "http://store.local/api");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.max_concurrent, 1);
    }

    #[test]
    fn rejects_unprintable_api_key() {
        let config = HttpRepositoryConfig::new("http://store.local").with_api_key("bad\nkey");
        assert!(matches!(
            HttpRepository::new(config),
            Err(RepositoryError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_store_is_an_http_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let config = HttpRepositoryConfig::new("http://127.0.0.1:9");
        let repo = HttpRepository::new(config).unwrap();
        let code = LineCode::parse("1").unwrap();
        let err = repo.fetch_stops(&code).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Http(_)));
    }
}
