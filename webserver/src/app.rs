use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::appstate::AppState;
use crate::config::AppConfig;
use crate::handler::circulation as circulation_handlers;
use crate::state::common::CommonState;

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        let router = Self::router(&config)?;

        let port = config.port;
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        Self::log_startup(&config);

        axum::serve(listener, router)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await?;

        Ok(())
    }

    /// Every method and path answers with a freshly computed circulation.
    pub fn router(config: &AppConfig) -> anyhow::Result<Router> {
        let app_state = AppState::new(config)?;
        let common_state = CommonState::new(app_state, config);
        let http_timeout = config.http_timeout;

        let router = Router::new()
            .fallback(circulation_handlers::get_circulation)
            .with_state(common_state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(HandleErrorLayer::new(move |err: BoxError| {
                        Self::handle_timeout_error(err, http_timeout)
                    }))
                    .timeout(Duration::from_secs(http_timeout)),
            );

        Ok(router)
    }

    fn log_startup(config: &AppConfig) {
        let treasuries = config.treasury_ids();

        tracing::info!(
            "Token Circulation API listening on port {}",
            config.port
        );
        tracing::info!("Mirror Node: {}", config.mirror_node);
        tracing::info!("Token ID: {}", config.token_id);
        match treasuries.as_slice() {
            [] => tracing::info!("All coins in circulation (no treasuries)"),
            [treasury] => tracing::info!("Treasury ID: {}", treasury),
            _ => tracing::info!("Treasury IDs: {}", treasuries.join(", ")),
        }
    }

    /// Adds a custom handler for tower's `TimeoutLayer`, see
    /// https://docs.rs/axum/latest/axum/middleware/index.html#commonly-used-middleware.
    async fn handle_timeout_error(
        err: BoxError,
        http_timeout: u64,
    ) -> impl IntoResponse {
        let (status, message) = if err.is::<tower::timeout::error::Elapsed>() {
            (
                StatusCode::REQUEST_TIMEOUT,
                format!(
                    "request took longer than the configured {} second timeout",
                    http_timeout
                ),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("unhandled internal error: {}", err),
            )
        };

        (status, [(CONTENT_TYPE, "text/plain")], message)
    }

    /// Tokio signal handler that will wait for a user to press CTRL+C.
    /// We use this in `axum::serve`'s `with_graceful_shutdown`.
    async fn shutdown_signal() {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::warn!("signal shutdown"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use clap::Parser;
    use serde_json::json;
    use shared::circulation::Circulation;
    use test_helpers::mirror::MockMirror;
    use tower::ServiceExt;

    use super::*;

    const TOKEN: &str = "0.0.859814";

    fn config(mirror: &str, token: &str, treasuries: &str) -> AppConfig {
        AppConfig::try_parse_from([
            "webserver",
            "--mirror-node",
            mirror,
            "--token-id",
            token,
            "--treasuries",
            treasuries,
        ])
        .unwrap()
    }

    async fn call(
        router: Router,
        method: Method,
        uri: &str,
    ) -> (StatusCode, String, Vec<u8>) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| value.to_str().unwrap().to_owned())
            .unwrap_or_default();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        (status, content_type, body)
    }

    #[tokio::test]
    async fn any_request_returns_circulation_json() {
        let mut mirror = MockMirror::start().await;
        mirror.token_supply(TOKEN, "1000000000", Some("6")).await;
        mirror.treasury("0.0.1", TOKEN, json!(100)).await;
        mirror.treasury("0.0.2", TOKEN, json!(200)).await;

        let config = config(&mirror.url(), TOKEN, "0.0.1,0.0.2");
        let router = ApplicationServer::router(&config).unwrap();
        let (status, content_type, body) =
            call(router, Method::GET, "/some/path?x=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");

        let circulation: Circulation = serde_json::from_slice(&body).unwrap();
        assert_eq!(circulation.total_supply, "1000000000");
        assert_eq!(circulation.circulating, "999999700");
        assert_eq!(circulation.decimals, 6);
        assert_eq!(circulation.treasury_balances.len(), 2);
    }

    #[tokio::test]
    async fn method_does_not_matter() {
        let mut mirror = MockMirror::start().await;
        mirror.token_supply(TOKEN, "10", None).await;

        let config = config(&mirror.url(), TOKEN, "");
        let router = ApplicationServer::router(&config).unwrap();
        let (status, _, body) = call(router, Method::POST, "/").await;

        assert_eq!(status, StatusCode::OK);
        let circulation: Circulation = serde_json::from_slice(&body).unwrap();
        assert_eq!(circulation.circulating, "10");
    }

    #[tokio::test]
    async fn mirror_failure_is_plain_text_500() {
        let mut mirror = MockMirror::start().await;
        mirror.token_status(TOKEN, 404).await;

        let config = config(&mirror.url(), TOKEN, "");
        let router = ApplicationServer::router(&config).unwrap();
        let (status, content_type, body) = call(router, Method::GET, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type, "text/plain");
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "HTS Token 0.0.859814 was not found, code: 404"
        );
    }

    #[tokio::test]
    async fn invalid_token_is_reported_per_request() {
        let mirror = MockMirror::start().await;

        let config = config(&mirror.url(), "abc", "");
        let router = ApplicationServer::router(&config).unwrap();
        let (status, content_type, body) = call(router, Method::GET, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type, "text/plain");
        assert_eq!(String::from_utf8(body).unwrap(), "Invalid token ID abc");
    }

    #[tokio::test]
    async fn middleware_errors_are_plain_text() {
        let response =
            ApplicationServer::handle_timeout_error(BoxError::from("boom"), 5)
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"unhandled internal error: boom");
    }
}
