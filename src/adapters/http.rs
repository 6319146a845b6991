use crate::core::{ConfigProvider, DataSource, SecurityGroupFact};
use crate::domain::model::ImportRecord;
use crate::utils::error::{CheckupError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

const HELPERS_PATH: &str = "helpers";
const SECURITY_GROUPS_PATH: &str = "security-groups";
const LATEST_IMPORT_PATH: &str = "imports/latest";

/// Reads facts from an HTTP export service in front of the import store.
///
/// * `POST {base}/helpers` installs query helpers
/// * `GET {base}/security-groups` returns a JSON array of facts
/// * `GET {base}/imports/latest` returns the most recent import, or 404
pub struct HttpDataSource {
    client: Client,
    base_url: Url,
}

impl HttpDataSource {
    pub fn new(
        base_url: &str,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self> {
        // a trailing slash keeps the last path segment when joining
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| CheckupError::InvalidConfigValueError {
            field: "source.endpoint".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CheckupError::InvalidConfigValueError {
                    field: "source.headers".to_string(),
                    value: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let value =
                HeaderValue::from_str(value).map_err(|e| CheckupError::InvalidConfigValueError {
                    field: "source.headers".to_string(),
                    value: name.as_str().to_string(),
                    reason: e.to_string(),
                })?;
            header_map.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(header_map)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let endpoint = config
            .source_endpoint()
            .ok_or_else(|| CheckupError::MissingConfigError {
                field: "source.endpoint".to_string(),
            })?;
        Self::new(
            endpoint,
            &config.source_headers(),
            Duration::from_secs(config.request_timeout_seconds()),
        )
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CheckupError::ConfigError {
                message: format!("Cannot build URL for {}: {}", path, e),
            })
    }

    async fn get(&self, path: &str, query: &str) -> Result<Response> {
        let url = self.url(path)?;
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(e, query))?;
        tracing::debug!("API response status: {}", response.status());
        Ok(response)
    }
}

fn transport_error(e: reqwest::Error, query: &str) -> CheckupError {
    if e.is_connect() || e.is_timeout() {
        CheckupError::ConnectionError {
            message: e.to_string(),
        }
    } else {
        CheckupError::QueryError {
            query: query.to_string(),
            message: e.to_string(),
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response, query: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(CheckupError::QueryError {
            query: query.to_string(),
            message: format!("server answered {}", status),
        });
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, query))?;
    serde_json::from_slice(&body).map_err(|e| CheckupError::ScanError {
        query: query.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn ensure_helpers(&self) -> Result<()> {
        let url = self.url(HELPERS_PATH)?;
        let response = self.client.post(url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                CheckupError::ConnectionError {
                    message: e.to_string(),
                }
            } else {
                CheckupError::SetupError {
                    message: e.to_string(),
                }
            }
        })?;
        if !response.status().is_success() {
            return Err(CheckupError::SetupError {
                message: format!("server answered {}", response.status()),
            });
        }
        Ok(())
    }

    async fn fetch_security_group_facts(&self) -> Result<Vec<SecurityGroupFact>> {
        let query = "security groups";
        let response = self.get(SECURITY_GROUPS_PATH, query).await?;
        decode(response, query).await
    }

    async fn fetch_most_recent_import(&self) -> Result<ImportRecord> {
        let query = "most recent import";
        let response = self.get(LATEST_IMPORT_PATH, query).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CheckupError::NotFoundError {
                message: "no import job has completed".to_string(),
            });
        }
        decode(response, query).await
    }
}
