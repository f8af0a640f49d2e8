// Presentation layer - Minimal host shell exposing the widget over HTTP
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/widget", get(widget_descriptor))
        .route("/widget/preview.svg", get(widget_preview))
        .route("/config", get(current_config))
        .route("/panel", get(panel_view))
        .route("/panel/init", post(init_panel))
        .route("/panel/refresh", post(refresh_panel))
        .route("/panel/workspace", put(select_workspace))
        .route("/panel/report", put(select_report))
        .route("/panel/panes", put(set_panes))
        .route("/panel/connection", put(set_connection))
        .route("/connection", post(save_connection).delete(delete_connection))
        .route("/cache", get(cached_info))
        .route("/cache/flush", post(flush_cache))
        .route("/embed", post(embed_report))
        .route("/embed/:container", get(embed_page))
        .route("/embed/:container/error", post(embed_error))
        .route("/alerts", get(drain_alerts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Re-render the embedded report whenever the shared configuration selects a report.
pub fn spawn_embed_sync(state: Arc<AppState>) -> JoinHandle<()> {
    let mut rx = state.config.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let config = rx.borrow_and_update().clone();
            if config.workspace.is_none() || config.report.is_none() {
                continue;
            }
            if state.embedding_panel.lock().await.apply(&config).await {
                tracing::debug!("Embedding panel reloaded after configuration change");
            }
        }
    })
}
