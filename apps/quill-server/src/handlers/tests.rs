//! Route tests against in-memory adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;

use quill_core::domain::{Post, SessionToken, SessionUser};
use quill_core::ports::{RateLimitError, RateLimitResult, RateLimiter, SessionError, SessionStore};
use quill_infra::{InMemoryPostRepository, InMemoryUserRepository};

use super::configure_routes;
use crate::config::AppConfig;
use crate::session::SESSION_COOKIE;
use crate::state::AppState;

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "PASSWORD_MEMORY_KIB" => Some("1024".into()),
        "PASSWORD_ITERATIONS" => Some("1".into()),
        _ => None,
    })
    .unwrap()
}

fn test_state() -> AppState {
    AppState::in_memory(&test_config()).unwrap()
}

fn test_app(
    state: AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure_routes)
}

trait TestService:
    Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
}

impl<S> TestService for S where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
}

async fn post_form(
    app: &impl TestService,
    uri: &str,
    fields: &[(&str, &str)],
    cookie: Option<&Cookie<'static>>,
) -> ServiceResponse {
    let mut req = test::TestRequest::post().uri(uri).set_form(fields);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    test::call_service(app, req.to_request()).await
}

async fn get(app: &impl TestService, uri: &str, cookie: Option<&Cookie<'static>>) -> ServiceResponse {
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    test::call_service(app, req.to_request()).await
}

async fn sign_up_and_in(app: &impl TestService, name: &str, password: &str) -> Cookie<'static> {
    let res = post_form(app, "/signup", &[("name", name), ("password", password)], None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let res = post_form(app, "/signin", &[("name", name), ("password", password)], None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    session_cookie(&res).expect("session cookie")
}

fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

fn location(res: &ServiceResponse) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(res: ServiceResponse) -> String {
    String::from_utf8(test::read_body(res).await.to_vec()).unwrap()
}

async fn only_post(state: &AppState) -> Post {
    let mut posts = state.posts.list().await.unwrap();
    assert_eq!(posts.len(), 1);
    posts.remove(0)
}

#[actix_web::test]
async fn test_home_is_public() {
    let app = test::init_service(test_app(test_state())).await;

    let res = get(&app, "/", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("No posts yet."));
}

#[actix_web::test]
async fn test_signup_redirects_to_signin() {
    let app = test::init_service(test_app(test_state())).await;

    let res = post_form(&app, "/signup", &[("name", "alice"), ("password", "pw1")], None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");
}

#[actix_web::test]
async fn test_signup_rejects_taken_name() {
    let app = test::init_service(test_app(test_state())).await;
    post_form(&app, "/signup", &[("name", "alice"), ("password", "pw1")], None).await;

    let res = post_form(&app, "/signup", &[("name", "alice"), ("password", "other")], None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(res).await, "Username is already taken");
}

#[actix_web::test]
async fn test_signup_rejects_blank_fields() {
    let app = test::init_service(test_app(test_state())).await;

    let res = post_form(&app, "/signup", &[("name", "  "), ("password", "pw")], None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_form(&app, "/signup", &[("name", "alice")], None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_signin_with_wrong_password_sets_no_cookie() {
    let app = test::init_service(test_app(test_state())).await;
    post_form(&app, "/signup", &[("name", "alice"), ("password", "pw1")], None).await;

    let res = post_form(&app, "/signin", &[("name", "alice"), ("password", "nope")], None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::LOCATION).is_none());
    assert!(session_cookie(&res).is_none());
    assert_eq!(body_text(res).await, "Invalid credentials");
}

#[actix_web::test]
async fn test_signin_sets_cookie_and_redirects_home() {
    let app = test::init_service(test_app(test_state())).await;
    post_form(&app, "/signup", &[("name", "alice"), ("password", "pw1")], None).await;

    let res = post_form(&app, "/signin", &[("name", "alice"), ("password", "pw1")], None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let cookie = session_cookie(&res).unwrap();
    assert_eq!(cookie.http_only(), Some(true));

    let res = get(&app, "/", Some(&cookie)).await;
    assert!(body_text(res).await.contains("Signed in as alice"));
}

#[actix_web::test]
async fn test_guard_redirects_anonymous_requests() {
    let state = test_state();
    let app = test::init_service(test_app(state.clone())).await;

    let res = get(&app, "/create", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");

    let res = post_form(&app, "/create", &[("title", "T"), ("body", "B")], None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");
    assert!(state.posts.list().await.unwrap().is_empty());

    let res = post_form(&app, "/delete/1", &[], None).await;
    assert_eq!(location(&res), "/signin");
}

#[actix_web::test]
async fn test_forged_cookie_is_treated_as_anonymous() {
    let app = test::init_service(test_app(test_state())).await;
    let forged = Cookie::new(SESSION_COOKIE, "0123456789abcdef0123456789abcdef");

    let res = get(&app, "/create", Some(&forged)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");
}

#[actix_web::test]
async fn test_create_lists_post_with_author() {
    let state = test_state();
    let app = test::init_service(test_app(state.clone())).await;
    let alice = sign_up_and_in(&app, "alice", "pw1").await;

    let res = post_form(&app, "/create", &[("title", "Hello"), ("body", "World")], Some(&alice)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let post = only_post(&state).await;
    assert_eq!(post.creator_name, "alice");

    let html = body_text(get(&app, "/", None).await).await;
    assert!(html.contains("Hello"));
    assert!(html.contains("by alice"));

    let res = get(&app, &format!("/post/{}", post.blog_id), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("World"));
}

#[actix_web::test]
async fn test_create_rejects_blank_title() {
    let state = test_state();
    let app = test::init_service(test_app(state.clone())).await;
    let alice = sign_up_and_in(&app, "alice", "pw1").await;

    let res = post_form(&app, "/create", &[("title", " "), ("body", "B")], Some(&alice)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(state.posts.list().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_post_content_is_escaped() {
    let app = test::init_service(test_app(test_state())).await;
    let alice = sign_up_and_in(&app, "alice", "pw1").await;

    post_form(
        &app,
        "/create",
        &[("title", "<script>x</script>"), ("body", "B")],
        Some(&alice),
    )
    .await;

    let html = body_text(get(&app, "/", None).await).await;
    assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    assert!(!html.contains("<script>x</script>"));
}

#[actix_web::test]
async fn test_edit_form_is_owner_only() {
    let state = test_state();
    let app = test::init_service(test_app(state.clone())).await;
    let alice = sign_up_and_in(&app, "alice", "pw1").await;
    let bob = sign_up_and_in(&app, "bob", "pw2").await;

    post_form(&app, "/create", &[("title", "Mine"), ("body", "B")], Some(&alice)).await;
    let id = only_post(&state).await.blog_id;

    let res = get(&app, &format!("/edit/{id}"), Some(&alice)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("value=\"Mine\""));

    let res = get(&app, &format!("/edit/{id}"), Some(&bob)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(res).await, "You can only edit your own posts.");

    let res = get(&app, "/edit/9999", Some(&alice)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(res).await, "Post not found");
}

#[actix_web::test]
async fn test_non_owner_update_and_delete_are_silent_no_ops() {
    let state = test_state();
    let app = test::init_service(test_app(state.clone())).await;
    let alice = sign_up_and_in(&app, "alice", "pw1").await;
    let bob = sign_up_and_in(&app, "bob", "pw2").await;

    post_form(&app, "/create", &[("title", "Hello"), ("body", "World")], Some(&alice)).await;
    let id = only_post(&state).await.blog_id;

    let res = post_form(
        &app,
        &format!("/edit/{id}"),
        &[("title", "Hacked"), ("body", "X")],
        Some(&bob),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = post_form(&app, &format!("/delete/{id}"), &[], Some(&bob)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let post = only_post(&state).await;
    assert_eq!(post.title, "Hello");
    assert_eq!(post.body, "World");
}

#[actix_web::test]
async fn test_owner_update_then_delete() {
    let state = test_state();
    let app = test::init_service(test_app(state.clone())).await;
    let alice = sign_up_and_in(&app, "alice", "pw1").await;

    post_form(&app, "/create", &[("title", "Hello"), ("body", "World")], Some(&alice)).await;
    let id = only_post(&state).await.blog_id;

    post_form(
        &app,
        &format!("/edit/{id}"),
        &[("title", "Hello v2"), ("body", "World v2")],
        Some(&alice),
    )
    .await;

    let res = get(&app, &format!("/edit/{id}"), Some(&alice)).await;
    let html = body_text(res).await;
    assert!(html.contains("value=\"Hello v2\""));
    assert!(html.contains(">World v2</textarea>"));

    let res = post_form(&app, &format!("/delete/{id}"), &[], Some(&alice)).await;
    assert_eq!(location(&res), "/");
    assert!(state.posts.list().await.unwrap().is_empty());

    let res = get(&app, &format!("/post/{id}"), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_signout_ends_session() {
    let app = test::init_service(test_app(test_state())).await;
    let alice = sign_up_and_in(&app, "alice", "pw1").await;

    let res = post_form(&app, "/signout", &[], Some(&alice)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");
    let removal = session_cookie(&res).unwrap();
    assert!(removal.value().is_empty());

    // The old cookie no longer resolves to a session.
    let res = get(&app, "/create", Some(&alice)).await;
    assert_eq!(location(&res), "/signin");

    // Signing out again is harmless.
    let res = post_form(&app, "/signout", &[], Some(&alice)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let app = test::init_service(test_app(test_state())).await;

    let res = get(&app, "/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

/// Allows a fixed number of attempts, then refuses.
struct CountingLimiter {
    remaining: Mutex<u32>,
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
        let mut remaining = self.remaining.lock().unwrap();
        let allowed = *remaining > 0;
        *remaining = remaining.saturating_sub(1);
        Ok(RateLimitResult {
            allowed,
            reset_after: Duration::from_secs(30),
        })
    }
}

/// Always errors.
struct BrokenLimiter;

#[async_trait]
impl RateLimiter for BrokenLimiter {
    async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
        Err(RateLimitError::Backend("unreachable".into()))
    }
}

#[actix_web::test]
async fn test_signin_attempts_are_throttled() {
    let limiter = Arc::new(CountingLimiter {
        remaining: Mutex::new(2),
    });
    let app = test::init_service(test_app(test_state().with_limiter(limiter))).await;

    for _ in 0..2 {
        let res = post_form(&app, "/signin", &[("name", "x"), ("password", "y")], None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    let res = post_form(&app, "/signin", &[("name", "x"), ("password", "y")], None).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers().get(header::RETRY_AFTER).unwrap(), "30");

    // Rendering the form is never throttled.
    let res = get(&app, "/signin", None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_limiter_failure_fails_open() {
    let app = test::init_service(test_app(test_state().with_limiter(Arc::new(BrokenLimiter)))).await;

    let res = post_form(&app, "/signup", &[("name", "alice"), ("password", "pw1")], None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

/// One attempt per key, tracking every key it was asked about.
#[derive(Default)]
struct PerKeyLimiter {
    seen: Mutex<HashMap<String, u32>>,
}

impl PerKeyLimiter {
    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.seen.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl RateLimiter for PerKeyLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let mut seen = self.seen.lock().unwrap();
        let attempts = seen.entry(key.to_string()).or_insert(0);
        *attempts += 1;
        Ok(RateLimitResult {
            allowed: *attempts <= 1,
            reset_after: Duration::from_secs(60),
        })
    }
}

async fn signin_forwarded_for(app: &impl TestService, forwarded_for: &str) -> StatusCode {
    let req = test::TestRequest::post()
        .uri("/signin")
        .peer_addr("203.0.113.7:40000".parse().unwrap())
        .insert_header(("X-Forwarded-For", forwarded_for))
        .set_form([("name", "mallory"), ("password", "guess")])
        .to_request();
    test::call_service(app, req).await.status()
}

#[actix_web::test]
async fn test_rotating_forwarded_for_does_not_reset_throttle() {
    let limiter = Arc::new(PerKeyLimiter::default());
    let app = test::init_service(test_app(test_state().with_limiter(limiter.clone()))).await;

    let mut statuses = Vec::new();
    for i in 0..5 {
        statuses.push(signin_forwarded_for(&app, &format!("10.9.9.{i}")).await);
    }

    assert_eq!(statuses[0], StatusCode::UNAUTHORIZED);
    assert!(statuses[1..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(limiter.keys(), ["203.0.113.7"]);
}

#[actix_web::test]
async fn test_forwarded_for_is_honoured_when_trusted() {
    let limiter = Arc::new(PerKeyLimiter::default());
    let mut state = test_state().with_limiter(limiter.clone());
    state.trust_proxy_headers = true;
    let app = test::init_service(test_app(state)).await;

    assert_eq!(signin_forwarded_for(&app, "10.9.9.1").await, StatusCode::UNAUTHORIZED);
    assert_eq!(signin_forwarded_for(&app, "10.9.9.2").await, StatusCode::UNAUTHORIZED);
    assert_eq!(
        signin_forwarded_for(&app, "10.9.9.1").await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(limiter.keys(), ["10.9.9.1", "10.9.9.2"]);
}

/// Session store whose backend is down.
struct UnavailableSessions;

#[async_trait]
impl SessionStore for UnavailableSessions {
    async fn create(&self, _user: SessionUser) -> Result<SessionToken, SessionError> {
        Err(SessionError::Connection("connection refused".into()))
    }

    async fn get(&self, _token: &SessionToken) -> Result<Option<SessionUser>, SessionError> {
        Err(SessionError::Connection("connection refused".into()))
    }

    async fn destroy(&self, _token: &SessionToken) -> Result<(), SessionError> {
        Err(SessionError::Connection("connection refused".into()))
    }
}

#[actix_web::test]
async fn test_session_store_failure_counts_as_signed_out() {
    let state = AppState::assemble(
        &test_config(),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(UnavailableSessions),
        "memory",
    )
    .unwrap();
    let cookie = state.cookies.issue(&SessionToken::generate());
    let app = test::init_service(test_app(state)).await;

    let res = get(&app, "/create", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");

    // Public pages still render, anonymously.
    let res = get(&app, "/", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!body_text(res).await.contains("Signed in as"));
}
