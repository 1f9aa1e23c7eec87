///! Error types for the exporter
///!
///! Collection errors are logged and absorbed by the collectors; only
///! exposition failures reach the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// Transport failure talking to the engine
    #[error("Request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Engine answered with a non-2xx status
    #[error("Request to {path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("Invalid response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: ovirt_common::Error,
    },

    /// A resource references something the engine did not return
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("Upstream request limiter is closed")]
    LimiterClosed,
}

pub type Result<T> = std::result::Result<T, ExporterError>;

impl ExporterError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExporterError::NotFound(_) => StatusCode::NOT_FOUND,
            ExporterError::Http { .. } | ExporterError::Status { .. } | ExporterError::Decode { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}
