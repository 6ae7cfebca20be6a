//! User CRUD handlers and the dispatcher in front of them.
//!
//! Each request is matched once, handled once, and answered with exactly one response. Handler
//! failures come back as [`HttpError`] and are rendered here; a panicking handler is answered with
//! a 500 instead of taking the worker down.

use crate::error::HttpError;
use crate::extractors::RequestTarget;
use crate::identifier::{extract_user_id, normalize_path};
use crate::response::{created, empty, json_ok, no_content};
use crate::routes::{match_route, RouteShape, USERS_PATH};
use crate::service::{has_updatable_field, parse_new_user, parse_patch, USER_SHAPE};
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tokio::task::JoinError;

const INVALID_ID: &str = "Invalid userID format";
const USER_NOT_FOUND: &str = "User is not found";
const INVALID_OBJECT: &str = "Object is not valid";

/// Entry point for every request: log, classify, run the matching handler.
pub async fn dispatch(
    State(state): State<AppState>,
    target: RequestTarget,
    body: Body,
) -> Response {
    tracing::info!(
        "[{}] - [{}] - '{}'",
        target.method,
        target.host.as_deref().unwrap_or("-"),
        normalize_path(&target.url)
    );
    let Some(route) = match_route(&target.method, target.path()) else {
        return HttpError::not_found(&target, "Route not found").into_response();
    };
    let handled = tokio::spawn(handle(state, route, target.clone(), body)).await;
    finish(handled, &target)
}

/// Render the outcome of a handler task; a task that panicked becomes a 500.
fn finish(
    handled: Result<Result<Response, HttpError>, JoinError>,
    target: &RequestTarget,
) -> Response {
    match handled {
        Ok(Ok(res)) => res,
        Ok(Err(err)) => err.into_response(),
        Err(e) => {
            tracing::error!(error = %e, url = %target.url, "handler aborted");
            HttpError::internal(target).into_response()
        }
    }
}

async fn handle(
    state: AppState,
    route: RouteShape,
    target: RequestTarget,
    body: Body,
) -> Result<Response, HttpError> {
    match route {
        RouteShape::List => list(&state, &target),
        RouteShape::GetOne => get_one(&state, &target),
        RouteShape::Create => {
            let bytes = read_body(&state, &target, body).await?;
            create(&state, &target, &bytes)
        }
        RouteShape::Update => {
            let id = user_id(&target)?;
            let bytes = read_body(&state, &target, body).await?;
            update(&state, &target, &id, &bytes)
        }
        RouteShape::Delete => delete(&state, &target),
    }
}

/// GET /api/users
pub fn list(state: &AppState, target: &RequestTarget) -> Result<Response, HttpError> {
    let store = state.store.read().map_err(|_| HttpError::internal(target))?;
    if store.is_empty() {
        tracing::debug!("no users found in the store");
    }
    Ok(json_ok(store.get_all()))
}

/// GET /api/users/{id}
pub fn get_one(state: &AppState, target: &RequestTarget) -> Result<Response, HttpError> {
    let id = user_id(target)?;
    let store = state.store.read().map_err(|_| HttpError::internal(target))?;
    let user = store
        .get_by_id(&id)
        .ok_or_else(|| HttpError::not_found(target, USER_NOT_FOUND))?;
    Ok(json_ok(user))
}

/// POST /api/users
pub fn create(
    state: &AppState,
    target: &RequestTarget,
    body: &[u8],
) -> Result<Response, HttpError> {
    let new_user = decode_json(target, body)
        .ok()
        .and_then(parse_new_user)
        .ok_or_else(|| invalid_object(target))?;
    let user = state
        .store
        .write()
        .map_err(|_| HttpError::internal(target))?
        .create(new_user);
    Ok(created(&format!("{}/{}", USERS_PATH, user.id)))
}

/// PUT /api/users/{id}
///
/// A body without any truthy updatable field, including any JSON value that is not an object,
/// is answered with 404, and a well-formed id that matches no user is still answered with 200.
/// Existing clients rely on both. Only undecodable bodies and `null` are rejected with 400.
pub fn update(
    state: &AppState,
    target: &RequestTarget,
    id: &str,
    body: &[u8],
) -> Result<Response, HttpError> {
    let fields = match decode_json(target, body)? {
        Value::Null => return Err(invalid_object(target)),
        Value::Object(fields) => fields,
        _ => return Err(HttpError::not_found(target, USER_NOT_FOUND)),
    };
    if !has_updatable_field(&fields) {
        return Err(HttpError::not_found(target, USER_NOT_FOUND));
    }
    let patch = parse_patch(&fields)
        .map_err(|e| invalid_object(target).with_details(e.to_string()))?;
    let applied = state
        .store
        .write()
        .map_err(|_| HttpError::internal(target))?
        .update(id, patch);
    if !applied {
        tracing::debug!(id, "update for unknown user ignored");
    }
    Ok(empty(StatusCode::OK))
}

/// DELETE /api/users/{id}
pub fn delete(state: &AppState, target: &RequestTarget) -> Result<Response, HttpError> {
    let id = user_id(target)?;
    let removed = state
        .store
        .write()
        .map_err(|_| HttpError::internal(target))?
        .delete(&id);
    if removed {
        Ok(no_content())
    } else {
        Err(HttpError::not_found(target, USER_NOT_FOUND))
    }
}

fn user_id(target: &RequestTarget) -> Result<String, HttpError> {
    extract_user_id(target.path())
        .map(str::to_string)
        .ok_or_else(|| HttpError::bad_request(target, INVALID_ID))
}

fn invalid_object(target: &RequestTarget) -> HttpError {
    HttpError::bad_request(target, INVALID_OBJECT).with_details(USER_SHAPE)
}

fn decode_json(target: &RequestTarget, body: &[u8]) -> Result<Value, HttpError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "request body is not JSON");
        invalid_object(target)
    })
}

/// Read the whole body within the configured time and size limits.
async fn read_body(
    state: &AppState,
    target: &RequestTarget,
    body: Body,
) -> Result<Bytes, HttpError> {
    let limits = state.limits;
    let read = axum::body::to_bytes(body, limits.max_body_bytes);
    match tokio::time::timeout(limits.body_timeout, read).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "request body read failed");
            Err(HttpError::bad_request(target, "Request body could not be read")
                .with_details(format!("bodies are limited to {} bytes", limits.max_body_bytes)))
        }
        Err(_) => Err(HttpError::new(
            StatusCode::REQUEST_TIMEOUT,
            target,
            "Request body timed out",
        )),
    }
}
