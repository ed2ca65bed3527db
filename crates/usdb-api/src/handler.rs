use anyhow::anyhow;
use serde::Serialize;
use std::any::Any;
use usdb_acquire::{fetch_songs, UsdbConfig, UsdbError};
use usdb_model::{ErrorPayload, InvocationEvent, InvocationResponse, SearchQuery, SearchRequest};

pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const LOGIN_FAILED: &str = "USDB login failed";
pub const UPSTREAM_UNAVAILABLE: &str = "USDB is not responding";

const EVENT_LOG_LIMIT: usize = 500;

/// Handle one search invocation.
///
/// Always produces a well-formed response: 405 for anything but POST, 400
/// for a bad or blank query, 401/502 for login and search failures, 500 for
/// anything else, and 200 with a JSON array of songs otherwise.
pub async fn handle(event: &InvocationEvent, config: &UsdbConfig) -> InvocationResponse {
    tracing::info!("Invocation received");
    if let Ok(raw) = serde_json::to_string(event) {
        let preview: String = raw.chars().take(EVENT_LOG_LIMIT).collect();
        tracing::debug!(event = %preview, "Invocation event");
    }

    if event.http_method.as_deref() != Some("POST") {
        tracing::warn!(method = ?event.http_method, "Method not allowed");
        return InvocationResponse::text(405, METHOD_NOT_ALLOWED);
    }

    let query = match parse_query(event.body.as_deref()) {
        Ok(query) => query,
        Err(response) => return response,
    };
    tracing::info!(query = %query, "Searching");

    // Run on its own task so a panic in the pipeline still yields a response.
    let config = config.clone();
    let task = tokio::spawn(async move { fetch_songs(&config, &query).await });

    match task.await {
        Ok(Ok(songs)) => {
            tracing::info!(songs = songs.len(), "Returning results");
            json_response(200, &songs)
        }
        Ok(Err(err)) => pipeline_error(err),
        Err(join_err) if join_err.is_panic() => {
            let message = panic_message(join_err.into_panic());
            unexpected(anyhow!("search task panicked: {message}"))
        }
        Err(join_err) => unexpected(anyhow!(join_err).context("search task did not complete")),
    }
}

fn parse_query(body: Option<&str>) -> Result<SearchQuery, InvocationResponse> {
    let body = body.filter(|b| !b.trim().is_empty()).unwrap_or("{}");

    let request: SearchRequest = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Request body is not a valid search request");
        json_response(400, &ErrorPayload::new(format!("invalid request body: {e}")))
    })?;

    request.search_query().map_err(|e| {
        tracing::warn!("Empty query");
        json_response(400, &ErrorPayload::new(e.to_string()))
    })
}

fn pipeline_error(err: UsdbError) -> InvocationResponse {
    match err {
        UsdbError::AuthFailed => json_response(401, &ErrorPayload::new(LOGIN_FAILED)),
        UsdbError::UpstreamUnavailable(status) => {
            tracing::error!(status = %status, "Search endpoint unavailable");
            json_response(502, &ErrorPayload::new(UPSTREAM_UNAVAILABLE))
        }
        other => unexpected(anyhow::Error::new(other)),
    }
}

/// The catch-all: message plus the full cause chain as the trace.
fn unexpected(err: anyhow::Error) -> InvocationResponse {
    tracing::error!(error = ?err, "Unhandled failure");
    json_response(500, &ErrorPayload::with_trace(err.to_string(), format!("{err:?}")))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn json_response<T: Serialize>(status: u16, value: &T) -> InvocationResponse {
    match serde_json::to_string(value) {
        Ok(body) => InvocationResponse::json(status, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            InvocationResponse::json(500, r#"{"error":"failed to serialize response"}"#)
        }
    }
}
