//! Typed errors and HTTP mapping.

use crate::response::json_with_status;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response carrying the request it belongs to.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("HTTP Error {}: {reason}", .status.as_u16())]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    pub method: String,
    pub reason: String,
    pub details: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody<'a> {
    pub status_code: u16,
    pub error: ErrorDetail<'a>,
}

#[derive(Serialize)]
pub struct ErrorDetail<'a> {
    pub reason: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a str>,
    pub url: &'a str,
    pub method: &'a str,
}

impl HttpError {
    pub fn new(status: StatusCode, target: &impl RequestInfo, reason: impl Into<String>) -> Self {
        HttpError {
            status,
            url: target.url().to_string(),
            method: target.method().to_string(),
            reason: reason.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(target: &impl RequestInfo, reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, target, reason)
    }

    pub fn not_found(target: &impl RequestInfo, reason: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, target, reason)
    }

    pub fn internal(target: &impl RequestInfo) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, target, "Internal server error")
    }

    pub fn body(&self) -> ErrorBody<'_> {
        ErrorBody {
            status_code: self.status.as_u16(),
            error: ErrorDetail {
                reason: &self.reason,
                details: self.details.as_deref(),
                url: &self.url,
                method: &self.method,
            },
        }
    }
}

/// What an error needs to know about the request that failed.
pub trait RequestInfo {
    fn url(&self) -> &str;
    fn method(&self) -> &str;
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(method = %self.method, url = %self.url, "{}", self);
        } else {
            tracing::debug!(method = %self.method, url = %self.url, "{}", self);
        }
        json_with_status(self.status, &self.body())
    }
}
