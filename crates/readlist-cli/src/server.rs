//! Webhook server
//!
//! A single catch-all handler: `POST` a JSON body `{"url": "..."}` and get
//! back `{"url": "<issue url>"}`. Failures are returned as plain text.
//! Every other method answers 404 with an empty body.

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use bytes::Bytes;
use readlist::LinkSaver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
struct SaveRequest {
    url: String,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    url: String,
}

/// Build the router serving every path with [`save_link`]
pub fn router(saver: Arc<LinkSaver>) -> Router {
    Router::new().fallback(save_link).with_state(saver)
}

/// Listen on `port` until Ctrl-C
pub async fn run(port: u16, saver: LinkSaver) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(addr = %listener.local_addr()?, repo = %saver.repo(), "Listening");

    axum::serve(listener, router(Arc::new(saver)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn save_link(
    State(saver): State<Arc<LinkSaver>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return StatusCode::NOT_FOUND.into_response();
    }

    let request: SaveRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected malformed request body");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match saver.save(&request.url).await {
        Ok(saved) => Json(SaveResponse {
            url: saved.issue_url,
        })
        .into_response(),
        Err(e) => {
            error!(url = %request.url, error = %e, "Failed to save link");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
