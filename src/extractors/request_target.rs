//! Extract the request line (method, raw url) and host for dispatch, logging and error bodies.

use crate::error::RequestInfo;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, Method},
};

/// Method, raw url (path and query, as received) and `Host` header of a request.
#[derive(Clone, Debug)]
pub struct RequestTarget {
    pub method: Method,
    pub url: String,
    pub host: Option<String>,
}

impl RequestTarget {
    /// Path part of the url, without query.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

impl RequestInfo for RequestTarget {
    fn url(&self) -> &str {
        &self.url
    }

    fn method(&self) -> &str {
        self.method.as_str()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestTarget
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(RequestTarget {
            method: parts.method.clone(),
            url,
            host,
        })
    }
}
