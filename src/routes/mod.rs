//! Structural route matching and the users router.
//!
//! A request is classified by method and path shape only: every path below the users collection
//! is an item-level path, whatever its last segment looks like. Identifier validation happens in
//! the handlers.

use crate::handlers::dispatch;
use crate::identifier::normalize_path;
use crate::state::AppState;
use axum::{http::Method, Router};

pub const USERS_PATH: &str = "/api/users";
const USERS_ITEM_PREFIX: &str = "/api/users/";

/// The five routes the service answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteShape {
    List,
    GetOne,
    Create,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PathShape {
    Collection,
    Item,
}

fn path_shape(path: &str) -> Option<PathShape> {
    let path = normalize_path(path);
    if path.starts_with(USERS_ITEM_PREFIX) {
        Some(PathShape::Item)
    } else if path == USERS_PATH {
        Some(PathShape::Collection)
    } else {
        None
    }
}

/// Classify a request; `None` means no route matches.
pub fn match_route(method: &Method, path: &str) -> Option<RouteShape> {
    let shape = path_shape(path)?;
    match (method, shape) {
        (&Method::GET, PathShape::Collection) => Some(RouteShape::List),
        (&Method::POST, PathShape::Collection) => Some(RouteShape::Create),
        (&Method::GET, PathShape::Item) => Some(RouteShape::GetOne),
        (&Method::PUT, PathShape::Item) => Some(RouteShape::Update),
        (&Method::DELETE, PathShape::Item) => Some(RouteShape::Delete),
        _ => None,
    }
}

/// Every request goes through [`dispatch`], so unmatched routes get the service's own 404 body.
pub fn user_routes(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}
