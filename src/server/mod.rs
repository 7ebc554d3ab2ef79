//! HTTP server for the gatekeeper.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Verifies, parses and handles a GitHub delivery inline
//! - `GET /health` - Returns 200 if the server is running

use std::fmt;
use std::sync::Arc;

use octocrab::Octocrab;

use crate::compliance::PythonAnalyzer;
use crate::config::GatekeeperConfig;
use crate::effects::GitHubInterpreter;
use crate::github::OctocrabClient;
use crate::types::RepoId;
use crate::webhooks::WebhookSecret;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

/// Builds a repository-scoped interpreter for each delivery.
pub trait InterpreterFactory: Send + Sync + 'static {
    type Interpreter: GitHubInterpreter<Error: fmt::Display> + Send + Sync;

    fn for_repo(&self, repo: &RepoId) -> Self::Interpreter;
}

impl InterpreterFactory for Octocrab {
    type Interpreter = OctocrabClient;

    fn for_repo(&self, repo: &RepoId) -> OctocrabClient {
        OctocrabClient::new(self.clone(), repo.clone())
    }
}

/// Shared application state.
///
/// Everything in here is immutable after startup.
pub struct AppState<F> {
    inner: Arc<AppStateInner<F>>,
}

struct AppStateInner<F> {
    factory: F,
    config: GatekeeperConfig,
    analyzer: PythonAnalyzer,
    /// `None` disables signature verification.
    webhook_secret: Option<WebhookSecret>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: InterpreterFactory> AppState<F> {
    pub fn new(
        factory: F,
        config: GatekeeperConfig,
        webhook_secret: Option<WebhookSecret>,
    ) -> Self {
        let analyzer = PythonAnalyzer::from_config(&config);
        AppState {
            inner: Arc::new(AppStateInner {
                factory,
                config,
                analyzer,
                webhook_secret,
            }),
        }
    }

    pub fn factory(&self) -> &F {
        &self.inner.factory
    }

    pub fn config(&self) -> &GatekeeperConfig {
        &self.inner.config
    }

    pub fn analyzer(&self) -> &PythonAnalyzer {
        &self.inner.analyzer
    }

    pub fn webhook_secret(&self) -> Option<&WebhookSecret> {
        self.inner.webhook_secret.as_ref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<F: InterpreterFactory>(app_state: AppState<F>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<F>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::effects::GitHubEffect;
    use crate::test_utils::MockGitHub;
    use crate::types::{Label, PrNumber};

    const SECRET: &str = "test-secret";

    fn app(mock: &MockGitHub, secret: Option<&str>) -> axum::Router {
        let state = AppState::new(
            mock.clone(),
            GatekeeperConfig::default(),
            secret.map(WebhookSecret::new),
        );
        build_router(state)
    }

    fn pr_payload(action: &str, body: &str) -> serde_json::Value {
        serde_json::json!({
            "action": action,
            "number": 42,
            "pull_request": {
                "number": 42,
                "url": "https://api.github.com/repos/octo/algos/pulls/42",
                "html_url": "https://github.com/octo/algos/pull/42",
                "body": body,
                "user": { "login": "contributor" },
                "author_association": "NONE",
                "labels": [],
                "draft": false,
                "requested_reviewers": [{ "login": "test1" }],
                "head": { "sha": "a".repeat(40) }
            },
            "repository": { "full_name": "octo/algos" },
            "installation": { "id": 7 }
        })
    }

    fn webhook_request(event_type: &str, body: &serde_json::Value, secret: &str) -> Request<Body> {
        let body_bytes = serde_json::to_vec(body).unwrap();
        let signature = WebhookSecret::new(secret).header_value(&body_bytes);

        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("x-github-event", event_type)
            .header("x-github-delivery", "550e8400-e29b-41d4-a716-446655440000")
            .header("x-hub-signature-256", signature)
            .body(Body::from(body_bytes))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ─── Health endpoint tests ───

    #[tokio::test]
    async fn health_returns_200() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app(&MockGitHub::new(), None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    // ─── Webhook endpoint tests ───

    #[tokio::test]
    async fn opened_pr_with_empty_body_is_closed() {
        let mock = MockGitHub::new();
        let request = webhook_request("pull_request", &pr_payload("opened", ""), SECRET);

        let response = app(&mock, Some(SECRET)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Processed");
        let writes = mock.writes();
        assert_eq!(writes.len(), 4);
        assert_eq!(
            writes[1],
            GitHubEffect::AddLabels {
                pr: PrNumber(42),
                labels: vec![Label::Invalid]
            }
        );
        assert_eq!(writes[2], GitHubEffect::ClosePr { pr: PrNumber(42) });
    }

    #[tokio::test]
    async fn invalid_signature_returns_401_without_calls() {
        let mock = MockGitHub::new();
        let request = webhook_request("pull_request", &pr_payload("opened", ""), "wrong-secret");

        let response = app(&mock, Some(SECRET)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(mock.effects().is_empty());
    }

    #[tokio::test]
    async fn missing_signature_returns_401_when_secret_is_set() {
        let body_bytes = serde_json::to_vec(&pr_payload("opened", "")).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("x-github-event", "pull_request")
            .header("x-github-delivery", "d1")
            .body(Body::from(body_bytes))
            .unwrap();

        let response = app(&MockGitHub::new(), Some(SECRET))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signature_is_not_required_without_secret() {
        let mock = MockGitHub::new();
        let body_bytes = serde_json::to_vec(&pr_payload("closed", "")).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("x-github-event", "pull_request")
            .header("x-github-delivery", "d2")
            .body(Body::from(body_bytes))
            .unwrap();

        let response = app(&mock, None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Ignored");
    }

    #[tokio::test]
    async fn missing_event_header_returns_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("x-github-delivery", "d3")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(&MockGitHub::new(), None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_payload_returns_400() {
        let body = serde_json::json!({
            "action": "opened",
            "repository": { "full_name": "octo/algos" }
        });
        let request = webhook_request("pull_request", &body, SECRET);

        let response = app(&MockGitHub::new(), Some(SECRET))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_event_type_is_ignored() {
        let body = serde_json::json!({ "action": "created" });
        let request = webhook_request("issue_comment", &body, SECRET);

        let response = app(&MockGitHub::new(), Some(SECRET))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Ignored");
    }

    #[tokio::test]
    async fn handler_failure_returns_500() {
        let mock = MockGitHub::new().failing_on("post_comment");
        let request = webhook_request("pull_request", &pr_payload("opened", ""), SECRET);

        let response = app(&mock, Some(SECRET)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The failed comment aborts the rest of the rejection.
        assert!(
            !mock
                .effects()
                .iter()
                .any(|e| matches!(e, GitHubEffect::ClosePr { .. }))
        );
    }
}
