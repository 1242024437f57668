//! End-to-end exercises of the signup and sign-in flows over the full router,
//! backed by the in-memory stores.

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        HeaderMap, Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use registri::api::{
    app,
    handlers::auth::{
        store::{
            memory::{MemorySessionStore, MemoryUserStore},
            SessionStore, UserStore,
        },
        AuthConfig,
    },
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> (Router, Arc<MemoryUserStore>) {
    let users = Arc::new(MemoryUserStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let config = Arc::new(AuthConfig::new("http://localhost:3000".to_string()));

    let router = app(
        users.clone() as Arc<dyn UserStore>,
        sessions as Arc<dyn SessionStore>,
        config,
    )
    .expect("router");

    (router, users)
}

fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec();
    (status, headers, body)
}

fn error_entries(body: &[u8]) -> Vec<(String, String)> {
    let value: Value = serde_json::from_slice(body).expect("json body");
    value["errorMessages"]
        .as_array()
        .expect("errorMessages array")
        .iter()
        .map(|entry| {
            (
                entry["name"].as_str().expect("name").to_string(),
                entry["message"].as_str().expect("message").to_string(),
            )
        })
        .collect()
}

fn error_names(body: &[u8]) -> Vec<String> {
    error_entries(body).into_iter().map(|(name, _)| name).collect()
}

fn valid_signup() -> Value {
    json!({
        "email": "a@b.com",
        "name": "A",
        "password": "12345678",
        "confirmPassword": "12345678",
    })
}

/// Extract the raw token pair ("registri_session=...") from a Set-Cookie header.
fn session_cookie_pair(headers: &HeaderMap) -> String {
    let cookie = headers
        .get(SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .expect("ascii cookie");
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

#[tokio::test]
async fn signup_with_valid_payload_creates_one_user() {
    let (router, users) = test_app();

    let (status, _, body) = send(&router, post_json("/user/signup", &valid_signup())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.is_empty(), "201 carries no body");
    assert_eq!(users.count().await, 1);

    let user = users
        .find_by_email("a@b.com")
        .await
        .expect("lookup")
        .expect("stored user");
    assert!(user.password_hash.starts_with("$argon2"));
    assert!(!user.password_hash.contains("12345678"));
}

#[tokio::test]
async fn stored_password_verifies_only_with_the_original() {
    let (router, users) = test_app();
    send(&router, post_json("/user/signup", &valid_signup())).await;

    let user = users
        .find_by_email("a@b.com")
        .await
        .expect("lookup")
        .expect("stored user");

    use registri::api::handlers::auth::password::verify_password;
    assert!(verify_password("12345678", &user.password_hash).expect("verify"));
    assert!(!verify_password("12345679", &user.password_hash).expect("verify"));
}

#[tokio::test]
async fn empty_signup_reports_every_missing_field() {
    let (router, users) = test_app();

    let (status, _, body) = send(&router, post_json("/user/signup", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_names(&body), ["email", "name", "password"]);
    assert_eq!(users.count().await, 0);
}

#[tokio::test]
async fn short_password_reports_the_length_rule() {
    let (router, users) = test_app();

    let (status, _, body) = send(
        &router,
        post_json(
            "/user/signup",
            &json!({
                "email": "a@b.com",
                "name": "A",
                "password": "short",
                "confirmPassword": "short",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_entries(&body),
        [(
            "password".to_string(),
            "Password must be at least 8 characters long".to_string()
        )]
    );
    assert_eq!(users.count().await, 0);
}

#[tokio::test]
async fn confirmation_mismatch_is_reported_even_with_a_valid_password() {
    let (router, _) = test_app();

    let (status, _, body) = send(
        &router,
        post_json(
            "/user/signup",
            &json!({
                "email": "a@b.com",
                "name": "A",
                "password": "12345678",
                "confirmPassword": "87654321",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_entries(&body),
        [("confirmPassword".to_string(), "Passwords must match".to_string())]
    );
}

#[tokio::test]
async fn duplicate_signup_reports_email_taken() {
    let (router, users) = test_app();

    let (first, _, _) = send(&router, post_json("/user/signup", &valid_signup())).await;
    let (second, _, body) = send(&router, post_json("/user/signup", &valid_signup())).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_entries(&body),
        [("email".to_string(), "Email is already taken".to_string())]
    );
    assert_eq!(users.count().await, 1);
}

#[tokio::test]
async fn concurrent_duplicate_signups_leave_exactly_one_record() {
    let (router, users) = test_app();

    let (first, second) = tokio::join!(
        send(&router, post_json("/user/signup", &valid_signup())),
        send(&router, post_json("/user/signup", &valid_signup())),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(users.count().await, 1);
}

#[tokio::test]
async fn garbage_payload_is_rejected() {
    let (router, _) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/user/signup")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .expect("request");

    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signin_issues_a_session_cookie() {
    let (router, _) = test_app();
    send(&router, post_json("/user/signup", &valid_signup())).await;

    let (status, headers, body) = send(
        &router,
        post_json(
            "/user/signin",
            &json!({ "email": "a@b.com", "password": "12345678" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let claims: Value = serde_json::from_slice(&body).expect("claims");
    assert_eq!(claims["email"], "a@b.com");
    assert_eq!(claims["name"], "A");

    let cookie = headers
        .get(SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .expect("ascii cookie");
    assert!(cookie.starts_with("registri_session="));
    assert!(cookie.contains("HttpOnly"));

    // The cookie resolves back to the same claims.
    let pair = session_cookie_pair(&headers);
    let (status, _, body) = send(&router, get("/user/session", Some(&pair))).await;
    assert_eq!(status, StatusCode::OK);
    let resolved: Value = serde_json::from_slice(&body).expect("claims");
    assert_eq!(resolved, claims);
}

#[tokio::test]
async fn signin_failures_are_indistinguishable() {
    let (router, _) = test_app();
    send(&router, post_json("/user/signup", &valid_signup())).await;

    let (wrong_status, _, wrong_body) = send(
        &router,
        post_json(
            "/user/signin",
            &json!({ "email": "a@b.com", "password": "87654321" }),
        ),
    )
    .await;
    let (unknown_status, _, unknown_body) = send(
        &router,
        post_json(
            "/user/signin",
            &json!({ "email": "nobody@b.com", "password": "12345678" }),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // Same body for both causes, or the API leaks which emails exist.
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn signin_validates_presence() {
    let (router, _) = test_app();

    let (status, _, body) = send(&router, post_json("/user/signin", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_names(&body), ["email", "password"]);
}

#[tokio::test]
async fn emails_differing_only_by_case_are_distinct_users() {
    let (router, users) = test_app();

    let mut upper = valid_signup();
    upper["email"] = json!("A@b.com");

    let (first, _, _) = send(&router, post_json("/user/signup", &valid_signup())).await;
    let (second, _, _) = send(&router, post_json("/user/signup", &upper)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CREATED);
    assert_eq!(users.count().await, 2);
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (router, _) = test_app();
    send(&router, post_json("/user/signup", &valid_signup())).await;

    let (_, headers, _) = send(
        &router,
        post_json(
            "/user/signin",
            &json!({ "email": "a@b.com", "password": "12345678" }),
        ),
    )
    .await;
    let pair = session_cookie_pair(&headers);

    let logout = Request::builder()
        .method("POST")
        .uri("/user/logout")
        .header(COOKIE, pair.clone())
        .body(Body::empty())
        .expect("request");
    let (status, headers, _) = send(&router, logout).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    let cleared = headers
        .get(SET_COOKIE)
        .expect("clearing cookie")
        .to_str()
        .expect("ascii cookie");
    assert!(cleared.contains("Max-Age=0"));

    // The old cookie no longer resolves.
    let (status, _, _) = send(&router, get("/user/session", Some(&pair))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn session_without_a_cookie_is_no_content() {
    let (router, _) = test_app();

    let (status, _, _) = send(&router, get("/user/session", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn health_reports_service_identity() {
    let (router, _) = test_app();

    let (status, headers, body) = send(&router, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("X-App"));
    let value: Value = serde_json::from_slice(&body).expect("health body");
    assert_eq!(value["name"], "registri");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}
