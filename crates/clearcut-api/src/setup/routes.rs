//! Route configuration and setup

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use clearcut_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::middleware::security_headers_middleware;
use crate::state::AppState;

/// Slack added to the body limit for multipart framing overhead.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Concurrency ceiling to protect against resource exhaustion under load.
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Batch uploads may carry several files, hence the factor.
    let body_limit = (config.max_upload_bytes * 5 + MULTIPART_OVERHEAD_BYTES) as usize;

    let mut app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/remove",
            post(handlers::remove::remove_background).get(handlers::remove::remove_info),
        )
        .route("/api/upload", post(handlers::upload::upload_images))
        .route("/api/cleanup/run", post(handlers::cleanup::run_cleanup))
        .route("/api/cleanup/info", get(handlers::cleanup::cleanup_info))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    if config.is_hardened() {
        app = app.layer(axum::middleware::from_fn(security_headers_middleware));
    }

    Ok(app.with_state(state))
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins?)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use clearcut_core::{CleanupSettings, MattingSettings, VaultSettings};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "test-boundary";

    fn test_config(scratch_dir: PathBuf) -> Config {
        Config {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            scratch_dir,
            max_upload_bytes: 10 * 1024 * 1024,
            matting: MattingSettings {
                // No credential: /api/remove fails after spooling, which
                // lets the tests observe scratch cleanup.
                api_key: None,
                endpoint: "http://127.0.0.1:1/removebg".to_string(),
                max_file_bytes: 10 * 1024 * 1024,
                timeout_secs: 5,
            },
            vault: VaultSettings {
                base_url: String::new(),
                api_key: None,
                folder: None,
            },
            cleanup: CleanupSettings {
                schedule: "0 2 1 * *".to_string(),
                timezone: "UTC".to_string(),
            },
        }
    }

    async fn app_with_config(config: Config) -> Router {
        let (state, sweep_task) = crate::setup::services::build_state(config.clone())
            .await
            .unwrap();
        assert!(sweep_task.is_none(), "no sweeper without a vault");
        setup_routes(&config, state).unwrap()
    }

    async fn test_app(scratch_dir: PathBuf) -> Router {
        app_with_config(test_config(scratch_dir)).await
    }

    fn remove_request(content_type: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"image\"; filename=\"photo\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/remove")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path().to_path_buf()).await;

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["environment"], "test");
    }

    #[tokio::test]
    async fn cleanup_info_without_vault_reports_missing_credential() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path().to_path_buf()).await;

        let response = app
            .oneshot(Request::get("/api/cleanup/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["code"], "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn remove_rejects_unsupported_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path().to_path_buf()).await;

        let response = app
            .oneshot(remove_request("image/gif", b"GIF89a"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn remove_rejects_body_without_image_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path().to_path_buf()).await;

        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             hello\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/remove")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn remove_returns_png_attachment_on_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/removebg")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(b"png with transparency".to_vec())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path().to_path_buf());
        config.matting.api_key = Some("test-key".to_string());
        config.matting.endpoint = format!("{}/removebg", server.url());
        let app = app_with_config(config).await;

        let response = app
            .oneshot(remove_request("image/png", b"\x89PNG\r\n\x1a\nfakedata"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"removed-bg.png\""
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );
        assert!(response.headers().contains_key("X-Processing-Time"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"png with transparency");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(leftovers.is_empty(), "scratch file leaked: {leftovers:?}");
    }

    #[tokio::test]
    async fn remove_without_credential_fails_and_leaves_no_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path().to_path_buf()).await;

        let response = app
            .oneshot(remove_request("image/png", b"\x89PNG\r\n\x1a\nfakedata"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["code"], "MISSING_CREDENTIAL");

        // The upload was spooled before the credential check; the failure
        // path must still have released it.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(leftovers.is_empty(), "scratch file leaked: {leftovers:?}");
    }
}
