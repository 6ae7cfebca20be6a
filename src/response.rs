//! Response helpers. Every response with a status other than 204 carries the JSON content type.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialize `body` as the response payload.
pub fn json_with_status<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_json_header(status, Body::from(bytes)),
        Err(e) => {
            tracing::error!(error = %e, "response serialization failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn json_ok<T: Serialize + ?Sized>(body: &T) -> Response {
    json_with_status(StatusCode::OK, body)
}

/// Empty body, JSON content type.
pub fn empty(status: StatusCode) -> Response {
    with_json_header(status, Body::empty())
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// 201 with an empty body and a `Location` pointing at the new resource.
pub fn created(location: &str) -> Response {
    let mut res = empty(StatusCode::CREATED);
    match HeaderValue::from_str(location) {
        Ok(v) => {
            res.headers_mut().insert(header::LOCATION, v);
        }
        Err(e) => tracing::warn!(error = %e, location, "location header skipped"),
    }
    res
}

fn with_json_header(status: StatusCode, body: Body) -> Response {
    let mut res = Response::new(body);
    *res.status_mut() = status;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    res
}
