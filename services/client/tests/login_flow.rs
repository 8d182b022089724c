//! End-to-end flows through the view controllers and the real HTTP adapter.

use arsipku_core::listing::ListQuery;
use arsipku_core::ports::TokenStore;
use arsipku_core::routes::Route;
use arsipku_lib::adapters::{HttpApi, MemoryTokenStore};
use arsipku_lib::app::{auth, documents, AppContext};
use reqwest::Url;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer, tokens: Arc<MemoryTokenStore>) -> AppContext {
    let api = HttpApi::new(Url::parse(&server.uri()).unwrap(), tokens.clone()).unwrap();
    AppContext::new(Arc::new(api), tokens, 10)
}

#[tokio::test]
async fn login_then_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "alice", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "token": "abc", "username": "alice" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::default());
    let ctx = context(&server, tokens.clone());

    let outcome = auth::login(&ctx, "alice", "secret").await;
    assert_eq!(outcome, auth::FormOutcome::Done("alice".to_string()));
    assert_eq!(tokens.load().unwrap().as_deref(), Some("abc"));

    let state = ctx.state().await;
    assert!(state.session.is_authenticated);
    assert_eq!(state.session.username.as_deref(), Some("alice"));
    assert_eq!(state.location, Route::Dashboard);
}

#[tokio::test]
async fn expired_session_on_dashboard_redirects_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/document/asc/createdAt/0"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
    let ctx = context(&server, tokens.clone());
    assert_eq!(ctx.navigate(Route::Dashboard).await, Route::Dashboard);

    let mut query = ListQuery::new("createdAt", 10);
    assert!(documents::my_documents(&ctx, &mut query).await.is_empty());

    assert!(!tokens.has_token());
    let state = ctx.state().await;
    assert_eq!(state.location, Route::Login);
    assert!(!state.session.is_authenticated);
    assert!(!state.modal.is_open);
}

#[tokio::test]
async fn start_up_restores_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "username": "alice", "name": "Alice", "statusNotification": true }]
        })))
        .mount(&server)
        .await;

    let ctx = context(&server, Arc::new(MemoryTokenStore::with_token("abc")));
    auth::initialize(&ctx).await;
    let state = ctx.state().await;
    assert_eq!(state.session.username.as_deref(), Some("alice"));
    assert!(state.profile.map(|p| p.status_notification).unwrap_or(false));
}
