use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::compiler;
use crate::compiler::error::Warning;

// ── Request / response types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CompileResponse {
    pub js: String,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ── Handlers ─────────────────────────────────────────────────────

async fn post_compile(Json(request): Json<CompileRequest>) -> impl IntoResponse {
    match compiler::compile(&request.code) {
        Ok(output) => (
            StatusCode::OK,
            Json(CompileResponse {
                js: output.js,
                warnings: output.warnings,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn get_health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

// ── Server startup ───────────────────────────────────────────────

/// CORS is permissive: the editor frontend calls this from a browser.
pub fn router() -> Router {
    Router::new()
        .route("/api/compile", post(post_compile))
        .route("/api/health", get(get_health))
        .layer(CorsLayer::permissive())
}

/// Bind 127.0.0.1:`port` (0 picks a free port) and serve until shutdown.
pub async fn serve(port: u16) -> Result<(), String> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;
    let local = listener
        .local_addr()
        .map_err(|e| format!("failed to read the bound address: {e}"))?;
    eprintln!("[blockscript] compile API listening on http://{local}");

    axum::serve(listener, router())
        .await
        .map_err(|e| format!("server error: {e}"))
}
