use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::config::ServerConfig;
use crate::server::handlers::{ask, calculator, health};
use crate::state::AppState;

/// Creates the full application router.
///
/// This function sets up:
/// - CORS and request tracing middleware
/// - Calculator endpoints (`/`, `/calculate`) and `/health`
/// - Document question answering (`/api/ask`) with the upload size limit
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.config.server);
    let max_upload_bytes = state.config.server.max_upload_bytes;

    calculator_routes()
        .route("/api/ask", post(ask::ask))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

/// Calculator-only router; needs no credentials or collaborators.
pub fn math_router(server: &ServerConfig) -> Router {
    calculator_routes()
        .layer(build_cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

fn calculator_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(calculator::welcome))
        .route("/calculate", get(calculator::calculate))
        .route("/health", get(health::health))
}

fn build_cors_layer(server: &ServerConfig) -> CorsLayer {
    let configured = server
        .cors_allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    let origins = if configured.is_empty() {
        default_local_origins()
    } else {
        configured
    };

    let allowed = origins
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8501".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8501".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::fallback::MarkerPolicy;
    use crate::pipeline::test_support::{CannedLlm, CountingSearch};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "docqa-test-boundary";

    fn math_app() -> Router {
        math_router(&ServerConfig::default())
    }

    fn full_app(reply: &str, search: Arc<CountingSearch>) -> Router {
        router(AppState::new(
            Arc::new(AppConfig::default()),
            Arc::new(CannedLlm {
                reply: reply.to_string(),
            }),
            search,
            Arc::new(MarkerPolicy::default()),
        ))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// (field name, optional file name, content)
    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: text/plain\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    async fn post_multipart(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ask")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", BOUNDARY),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn welcome_page_is_html() {
        let response = math_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html")));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "<h2>Welcome to Math API</h2><p>Use /calculate?operation=add&num1=10&num2=5</p>"
        );
    }

    #[tokio::test]
    async fn calculate_success_echoes_inputs() {
        let (status, body) =
            get_json(math_app(), "/calculate?operation=add&num1=10&num2=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "operation": "add", "num1": 10.0, "num2": 5.0, "result": 15.0 })
        );

        let (_, body) = get_json(math_app(), "/calculate?operation=divide&num1=10&num2=5").await;
        assert_eq!(body["result"], json!(2.0));
    }

    #[tokio::test]
    async fn calculate_errors_are_400_with_message() {
        let cases = [
            (
                "/calculate?operation=divide&num1=5&num2=0",
                "Cannot divide by zero",
            ),
            (
                "/calculate?operation=bogus&num1=1&num2=2",
                "Invalid operation. Use add, subtract, multiply, divide",
            ),
            (
                "/calculate?operation=add&num1=1",
                "Please provide operation, num1 and num2 parameters",
            ),
            (
                "/calculate?operation=add&num1=abc&num2=2",
                "Please provide operation, num1 and num2 parameters",
            ),
        ];

        for (uri, message) in cases {
            let (status, body) = get_json(math_app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({ "error": message }), "{uri}");
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = get_json(math_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })
        );
    }

    #[tokio::test]
    async fn math_router_has_no_ask_route() {
        let response = math_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ask")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ask_with_document_returns_grounded_answer() {
        let search = Arc::new(CountingSearch::with_titles(&["Unused"]));
        let reply = "Refunds are accepted within thirty days of the original purchase.";
        let body = multipart_body(&[
            ("query", None, "What is the refund window?"),
            (
                "files",
                Some("policy.txt"),
                "Refunds are accepted within thirty days of purchase.",
            ),
        ]);

        let (status, json) = post_multipart(full_app(reply, search.clone()), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["answer"], reply);
        assert_eq!(json["source"], "documents");
        assert_eq!(json["fallback_used"], false);
        assert_eq!(json["sources"][0]["document"], "policy.txt");
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn ask_falls_back_to_web_on_weak_answer() {
        let search = Arc::new(CountingSearch::with_titles(&["One", "Two", "Three", "Four"]));
        let body = multipart_body(&[
            ("query", None, "Who wrote it?"),
            ("files", Some("notes.md"), "# Notes\nNothing about authors here."),
        ]);

        let (status, json) = post_multipart(full_app("Not mentioned.", search.clone()), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "web_search");
        assert_eq!(json["fallback_used"], true);
        let answer = json["answer"].as_str().unwrap();
        assert!(answer.contains("**Three**"));
        assert!(!answer.contains("**Four**"));
        assert_eq!(search.calls(), 1);
    }

    #[tokio::test]
    async fn ask_rejects_unsupported_upload() {
        let search = Arc::new(CountingSearch::with_titles(&[]));
        let body = multipart_body(&[
            ("query", None, "anything"),
            ("files", Some("image.png"), "not really a png"),
        ]);

        let (status, json) = post_multipart(full_app("unused", search), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("image.png"));
    }

    #[tokio::test]
    async fn ask_rejects_invalid_mode() {
        let search = Arc::new(CountingSearch::with_titles(&[]));
        let body = multipart_body(&[("query", None, "anything"), ("mode", None, "creative")]);

        let (status, _) = post_multipart(full_app("unused", search), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
