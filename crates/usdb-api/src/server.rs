use crate::handler::handle;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use usdb_acquire::UsdbConfig;
use usdb_model::{InvocationEvent, InvocationResponse};

pub const SEARCH_PATH: &str = "/api/usdb-search";

/// Router exposing the search contract at [`SEARCH_PATH`]. Every method is
/// routed to the handler so that it can answer 405 itself.
pub fn router(config: UsdbConfig) -> Router {
    Router::new()
        .route(SEARCH_PATH, any(search))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(config))
}

pub async fn serve(config: UsdbConfig, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(addr = %addr, path = SEARCH_PATH, "Listening");

    axum::serve(listener, router(config))
        .await
        .context("HTTP server failed")?;
    Ok(())
}

async fn search(State(config): State<Arc<UsdbConfig>>, method: Method, body: String) -> Response {
    let event = InvocationEvent {
        http_method: Some(method.as_str().to_string()),
        body: Some(body),
    };
    into_http_response(handle(&event, &config).await)
}

fn into_http_response(response: InvocationResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut http = (status, response.body).into_response();

    for (name, value) in &response.headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }

    http
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;
    use usdb_acquire::Credentials;

    fn offline_router() -> Router {
        let base = reqwest::Url::parse("http://127.0.0.1:9").unwrap();
        router(UsdbConfig::new(base, Credentials::default()))
    }

    #[tokio::test]
    async fn test_get_is_405() {
        let response = offline_router()
            .oneshot(Request::builder().method("GET").uri(SEARCH_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_blank_query_is_400_json() {
        let request = Request::builder()
            .method("POST")
            .uri(SEARCH_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"query":"  "}"#))
            .unwrap();

        let response = offline_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "missing query");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_401() {
        let request = Request::builder()
            .method("POST")
            .uri(SEARCH_PATH)
            .body(Body::from(r#"{"query":"abba"}"#))
            .unwrap();

        let response = offline_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_invalid_headers_dropped() {
        let mut response = InvocationResponse::json(200, "[]");
        response.headers.insert("Bad Header".to_string(), "x".to_string());

        let http = into_http_response(response);

        assert_eq!(http.status(), StatusCode::OK);
        assert_eq!(http.headers()[header::CONTENT_TYPE], "application/json");
    }
}
