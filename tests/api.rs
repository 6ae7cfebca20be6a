use axum::{
    body::Body,
    body::Bytes,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use users_api::{user_routes, AppState, IdGenerator, RequestLimits, User, UserStore};

const ANA_ID: &str = "6d03624f-16ec-4590-9ab3-3531a5eb9f25";

/// Hands out `00000000-0000-4000-8000-000000000001`, `...002`, ...
struct Counter(u64);

impl IdGenerator for Counter {
    fn next_id(&mut self) -> String {
        self.0 += 1;
        format!("00000000-0000-4000-8000-{:012x}", self.0)
    }
}

fn app_with(store: UserStore) -> Router {
    user_routes(AppState::new(store, RequestLimits::default()))
}

fn empty_app() -> Router {
    app_with(UserStore::with_generator(Counter(0)))
}

fn seeded_app() -> Router {
    app_with(UserStore::with_generator(Counter(0)).with_users(vec![User {
        id: ANA_ID.into(),
        username: "ana".into(),
        age: serde_json::Number::from(30),
        hobbies: vec!["chess".into()],
    }]))
}

type Reply = (StatusCode, Option<String>, Vec<u8>, HeaderMap);

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> Reply {
    send_body(app, method, uri, Body::from(body.to_string())).await
}

async fn send_body(app: &Router, method: Method, uri: &str, body: Body) -> Reply {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "localhost:4000")
        .body(body)
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, content_type, bytes.to_vec(), headers)
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn list_on_empty_store_is_ok_with_empty_array() {
    let app = empty_app();
    let (status, ct, body, _) = send(&app, Method::GET, "/api/users", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ct.as_deref(), Some("application/json"));
    assert_eq!(json_of(&body), json!([]));
}

#[tokio::test]
async fn list_returns_all_users_with_trailing_slash() {
    let app = seeded_app();
    let (status, _, body, _) = send(&app, Method::GET, "/api/users/", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_of(&body),
        json!([{"id": ANA_ID, "username": "ana", "age": 30, "hobbies": ["chess"]}])
    );
}

#[tokio::test]
async fn create_then_fetch_by_location() {
    let app = empty_app();
    let payload = r#"{"username":"ana","age":30,"hobbies":["chess"]}"#;
    let (status, ct, body, headers) = send(&app, Method::POST, "/api/users", payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ct.as_deref(), Some("application/json"));
    assert!(body.is_empty());
    let location = headers[header::LOCATION].to_str().unwrap().to_string();
    assert_eq!(location, "/api/users/00000000-0000-4000-8000-000000000001");

    let (status, _, body, _) = send(&app, Method::GET, &location, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_of(&body),
        json!({
            "id": "00000000-0000-4000-8000-000000000001",
            "username": "ana",
            "age": 30,
            "hobbies": ["chess"]
        })
    );
}

#[tokio::test]
async fn create_with_non_json_body_is_bad_request() {
    let app = empty_app();
    for body in ["", "\"\"", "{not json", r#"{"username":"ana","age":30}"#] {
        let (status, ct, bytes, _) = send(&app, Method::POST, "/api/users", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(ct.as_deref(), Some("application/json"));
        let v = json_of(&bytes);
        assert_eq!(v["statusCode"], 400);
        assert_eq!(v["error"]["reason"], "Object is not valid");
        assert_eq!(
            v["error"]["details"],
            "The only required fields are: username (string), age (number), hobbies (string[])"
        );
        assert_eq!(v["error"]["url"], "/api/users");
        assert_eq!(v["error"]["method"], "POST");
    }
}

#[tokio::test]
async fn create_rejects_client_supplied_id() {
    let app = empty_app();
    let payload = json!({"id": ANA_ID, "username": "ana", "age": 30, "hobbies": []}).to_string();
    let (status, _, _, _) = send(&app, Method::POST, "/api/users", &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_ids_are_bad_request_on_every_item_route() {
    let app = seeded_app();
    for id in ["invalidId", "12345", "6d03624f-16ec-4590-9ab3-3531a5eb9f2"] {
        let uri = format!("/api/users/{id}");
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let (status, _, body, _) = send(&app, method.clone(), &uri, r#"{"age":1}"#).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
            assert_eq!(json_of(&body)["error"]["reason"], "Invalid userID format");
        }
    }
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = seeded_app();
    let uri = "/api/users/00000000-0000-4000-8000-00000000abcd";
    let (status, _, body, _) = send(&app, Method::GET, uri, "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body)["error"]["reason"], "User is not found");
}

#[tokio::test]
async fn unmatched_routes_are_not_found() {
    let app = seeded_app();
    for (method, uri) in [
        (Method::GET, "/"),
        (Method::GET, "/api/products"),
        (Method::PATCH, "/api/users/6d03624f-16ec-4590-9ab3-3531a5eb9f25"),
        (Method::DELETE, "/api/users"),
    ] {
        let (status, ct, body, _) = send(&app, method.clone(), uri, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(ct.as_deref(), Some("application/json"));
        let v = json_of(&body);
        assert_eq!(v["error"]["reason"], "Route not found");
        assert_eq!(v["error"]["method"], method.as_str());
        assert_eq!(v["error"]["url"], uri);
    }
}

#[tokio::test]
async fn update_merges_supplied_fields() {
    let app = seeded_app();
    let uri = format!("/api/users/{ANA_ID}");
    let (status, ct, body, _) = send(&app, Method::PUT, &uri, r#"{"age":31}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ct.as_deref(), Some("application/json"));
    assert!(body.is_empty());

    let (_, _, body, _) = send(&app, Method::GET, &uri, "").await;
    assert_eq!(
        json_of(&body),
        json!({"id": ANA_ID, "username": "ana", "age": 31, "hobbies": ["chess"]})
    );
}

#[tokio::test]
async fn update_without_recognised_field_is_not_found_even_for_existing_user() {
    let app = seeded_app();
    let uri = format!("/api/users/{ANA_ID}");
    let (status, _, body, _) = send(&app, Method::PUT, &uri, "{}").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body)["error"]["reason"], "User is not found");
}

#[tokio::test]
async fn update_unknown_user_still_reports_ok() {
    let app = seeded_app();
    let uri = "/api/users/00000000-0000-4000-8000-00000000abcd";
    let (status, _, _, _) = send(&app, Method::PUT, uri, r#"{"username":"bo"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _, _) = send(&app, Method::GET, uri, "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_undecodable_or_null_body_is_bad_request() {
    let app = seeded_app();
    let uri = format!("/api/users/{ANA_ID}");
    for body in ["", "{not json", "null"] {
        let (status, _, bytes, _) = send(&app, Method::PUT, &uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(json_of(&bytes)["error"]["reason"], "Object is not valid");
    }
}

#[tokio::test]
async fn update_with_non_object_json_is_not_found() {
    let app = seeded_app();
    let uri = format!("/api/users/{ANA_ID}");
    for body in ["[]", "5", "\"x\"", "true"] {
        let (status, _, bytes, _) = send(&app, Method::PUT, &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{body:?}");
        assert_eq!(json_of(&bytes)["error"]["reason"], "User is not found");
    }
    let (_, _, bytes, _) = send(&app, Method::GET, &uri, "").await;
    assert_eq!(json_of(&bytes)["age"], 30);
}

#[tokio::test]
async fn delete_twice_is_no_content_then_not_found() {
    let app = seeded_app();
    let uri = format!("/api/users/{ANA_ID}");
    let (status, ct, body, _) = send(&app, Method::DELETE, &uri, "").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(ct.is_none());
    assert!(body.is_empty());

    let (status, _, body, _) = send(&app, Method::DELETE, &uri, "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body)["error"]["reason"], "User is not found");

    let (status, _, _, _) = send(&app, Method::GET, &uri, "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_ids_are_distinct() {
    let app = app_with(UserStore::new());
    let payload = r#"{"username":"ana","age":30,"hobbies":[]}"#;
    for _ in 0..5 {
        let (status, _, _, _) = send(&app, Method::POST, "/api/users", payload).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, _, body, _) = send(&app, Method::GET, "/api/users", "").await;
    let users = json_of(&body);
    let mut ids: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 5);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let limits = RequestLimits {
        body_timeout: Duration::from_secs(5),
        max_body_bytes: 16,
    };
    let app = user_routes(AppState::new(UserStore::new(), limits));
    let payload = r#"{"username":"a long enough name","age":30,"hobbies":[]}"#;
    let (status, ct, body, _) = send(&app, Method::POST, "/api/users", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ct.as_deref(), Some("application/json"));
    assert_eq!(json_of(&body)["error"]["reason"], "Request body could not be read");
}

#[tokio::test]
async fn stalled_body_times_out() {
    let limits = RequestLimits {
        body_timeout: Duration::from_millis(50),
        max_body_bytes: 1024,
    };
    let app = user_routes(AppState::new(UserStore::new(), limits));
    let stalled = Body::from_stream(futures::stream::pending::<Result<Bytes, std::io::Error>>());
    let (status, ct, body, _) = send_body(&app, Method::POST, "/api/users", stalled).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(ct.as_deref(), Some("application/json"));
    let v = json_of(&body);
    assert_eq!(v["statusCode"], 408);
    assert_eq!(v["error"]["reason"], "Request body timed out");
    assert_eq!(v["error"]["method"], "POST");
}

#[tokio::test]
async fn poisoned_store_is_internal_error() {
    let state = AppState::new(UserStore::new(), RequestLimits::default());
    let store = state.store.clone();
    let _ = std::thread::spawn(move || {
        let _guard = store.write().unwrap();
        panic!("poison the store lock");
    })
    .join();
    let app = user_routes(state);

    let (status, ct, body, _) = send(&app, Method::GET, "/api/users", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ct.as_deref(), Some("application/json"));
    let v = json_of(&body);
    assert_eq!(v["error"]["reason"], "Internal server error");
    assert_eq!(v["error"]["url"], "/api/users");
}
