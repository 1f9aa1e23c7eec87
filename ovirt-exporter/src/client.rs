///! Resource client for the oVirt engine REST API
///!
///! `Transport` is the raw seam (one authenticated GET returning the body).
///! `ResourceClient` wraps a transport with the upstream concurrency limit and
///! XML decoding, and is what collectors talk to.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{ExporterError, Result};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body of `path`, relative to the API root
    async fn get(&self, path: &str) -> Result<String>;
}

/// Join the API root and a resource path with exactly one slash
pub fn resource_url(api_url: &str, path: &str) -> String {
    format!("{}/{}", api_url.trim_matches('/'), path.trim_matches('/'))
}

/// Transport over HTTPS with basic credentials on every request
pub struct HttpTransport {
    api_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
    debug: bool,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig, debug: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure_cert)
            .build()
            .map_err(|source| ExporterError::Http {
                path: config.url.clone(),
                source,
            })?;

        Ok(Self {
            api_url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            client,
            debug,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<String> {
        let url = resource_url(&self.api_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/xml")
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|source| ExporterError::Http {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ExporterError::Http {
            path: path.to_string(),
            source,
        })?;

        if self.debug {
            log_response_body(path, &body);
        }

        Ok(body)
    }
}

/// Emitted at debug so `--debug` alone makes bodies visible
fn log_response_body(path: &str, body: &str) {
    debug!(path = %path, "Response body: {}", body);
}

/// Transport plus request limit and decoding
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
    limiter: Semaphore,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>, max_concurrent_requests: usize) -> Self {
        Self {
            transport,
            limiter: Semaphore::new(max_concurrent_requests.max(1)),
        }
    }

    /// GET `path` and decode it into `T`
    ///
    /// The permit is held for the request only, never while decoding or
    /// while the caller awaits other work.
    pub async fn fetch_and_decode<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = {
            let _permit = self
                .limiter
                .acquire()
                .await
                .map_err(|_| ExporterError::LimiterClosed)?;
            self.transport.get(path).await?
        };

        ovirt_common::from_xml(&body).map_err(|source| ExporterError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// Refuse further requests; pending and later fetches fail with
    /// `LimiterClosed`
    pub fn close(&self) {
        self.limiter.close();
    }

    /// Permits currently free
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }
}
