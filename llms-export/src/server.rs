//! HTTP surface for the text exports.
//!
//! Routes:
//! - `GET /llms-full.txt`: corpus of the primary section, rebuilt per request
//! - `GET /llms.mdx/docs/<slugs...>`: one page as LLM text
//! - `GET /docs/<slugs...>.mdx`: same as above, for links copied from the site

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use llms_export_core::config::GitConfig;
use llms_export_core::contract::{find_page, ContentSource};
use llms_export_core::corpus::aggregate;
use llms_export_core::export::{llm_text, ExportError};
use llms_export_core::section::Section;
use tracing::{error, info, warn};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub git: GitConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("no page at {0}")]
    NotFound(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServeError::NotFound(_) => StatusCode::NOT_FOUND,
            ServeError::Export(e) => {
                error!(error = %e, "[SERVE][ERROR] Export failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], self.to_string()).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/llms-full.txt", get(llms_full))
        .route("/llms.mdx/docs", get(llms_index))
        .route("/llms.mdx/docs/*slug", get(llms_page))
        .route("/docs/*path", get(docs_mdx))
        .with_state(state)
}

/// Binds `bind` and serves until Ctrl+C.
pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "[SERVE] Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated with error")?;

    info!("[SERVE] Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("[SERVE] Ctrl+C received, shutting down");
}

/// The corpus is rebuilt on every request, so it must not be cached.
async fn llms_full(State(state): State<Arc<AppState>>) -> Result<Response, ServeError> {
    let corpus = aggregate(state.source.as_ref(), &state.git, Section::Primary).await?;
    let headers = [
        (header::CONTENT_TYPE, TEXT_PLAIN),
        (header::CACHE_CONTROL, "no-store"),
    ];
    Ok((headers, corpus).into_response())
}

async fn llms_index(State(state): State<Arc<AppState>>) -> Result<Response, ServeError> {
    page_response(&state, "").await
}

async fn llms_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, ServeError> {
    page_response(&state, &slug).await
}

async fn docs_mdx(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ServeError> {
    match path.strip_suffix(".mdx") {
        Some(slug) => page_response(&state, slug).await,
        None => Err(ServeError::NotFound(path)),
    }
}

async fn page_response(state: &AppState, slug: &str) -> Result<Response, ServeError> {
    let slugs: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    let page = find_page(state.source.as_ref(), &slugs)
        .ok_or_else(|| ServeError::NotFound(format!("/{slug}")))?;
    let text = llm_text(state.source.as_ref(), &state.git, &page).await?;
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], text).into_response())
}
