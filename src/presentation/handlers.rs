// HTTP request handlers
use crate::application::alerts::Alert;
use crate::application::config_panel::{PanelError, PanelView};
use crate::application::embed_panel::EmbedView;
use crate::application::error::PowerBiError;
use crate::domain::configuration::{ConnectionSettings, WidgetConfig};
use crate::domain::powerbi::CachedInfo;
use crate::domain::widget::{PREVIEW_SVG, WidgetDescriptor};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug)]
pub enum ApiError {
    Panel(PanelError),
    Backend(PowerBiError),
}

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        Self::Panel(err)
    }
}

impl From<PowerBiError> for ApiError {
    fn from(err: PowerBiError) -> Self {
        Self::Backend(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Panel(err @ (PanelError::NotInitialized | PanelError::NotBound)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            ApiError::Panel(err) => (StatusCode::NOT_FOUND, err.to_string()),
            ApiError::Backend(err) => {
                tracing::error!("Backend call failed: {}", err);
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct SelectionRequest {
    pub id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanesRequest {
    pub filter_pane_enabled: Option<bool>,
    pub nav_pane_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct EmbedErrorReport {
    #[serde(default)]
    pub detail: Value,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn widget_descriptor(State(state): State<Arc<AppState>>) -> Json<WidgetDescriptor> {
    Json(state.descriptor.clone())
}

pub async fn widget_preview() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], PREVIEW_SVG)
}

pub async fn current_config(State(state): State<Arc<AppState>>) -> Json<WidgetConfig> {
    Json(state.config.snapshot())
}

pub async fn panel_view(State(state): State<Arc<AppState>>) -> Json<PanelView> {
    Json(state.config_panel.lock().await.view())
}

pub async fn init_panel(State(state): State<Arc<AppState>>) -> Json<PanelView> {
    let mut panel = state.config_panel.lock().await;
    panel.initialize().await;
    Json(panel.view())
}

pub async fn refresh_panel(State(state): State<Arc<AppState>>) -> Json<PanelView> {
    let mut panel = state.config_panel.lock().await;
    panel.refresh().await;
    Json(panel.view())
}

/// Select a workspace. The panel lock is released while reports load so a
/// newer selection can supersede this one.
pub async fn select_workspace(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<PanelView>, ApiError> {
    let fetch = state
        .config_panel
        .lock()
        .await
        .begin_workspace_change(&request.id)?;

    let result = state.service.list_reports(fetch.workspace_id()).await;

    let mut panel = state.config_panel.lock().await;
    panel.finish_workspace_change(fetch, result);
    Ok(Json(panel.view()))
}

pub async fn select_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<PanelView>, ApiError> {
    let mut panel = state.config_panel.lock().await;
    panel.select_report(&request.id)?;
    Ok(Json(panel.view()))
}

pub async fn set_panes(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PanesRequest>,
) -> Result<Json<PanelView>, ApiError> {
    let mut panel = state.config_panel.lock().await;
    if let Some(enabled) = request.filter_pane_enabled {
        panel.set_filter_pane(enabled)?;
    }
    if let Some(enabled) = request.nav_pane_enabled {
        panel.set_nav_pane(enabled)?;
    }
    Ok(Json(panel.view()))
}

pub async fn set_connection(
    State(state): State<Arc<AppState>>,
    Json(connection): Json<ConnectionSettings>,
) -> Result<Json<PanelView>, ApiError> {
    let mut panel = state.config_panel.lock().await;
    panel.set_connection(connection)?;
    Ok(Json(panel.view()))
}

pub async fn save_connection(
    State(state): State<Arc<AppState>>,
    Json(connection): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.service.save(&connection).await?))
}

pub async fn delete_connection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.service.delete().await?))
}

pub async fn cached_info(State(state): State<Arc<AppState>>) -> Json<CachedInfo> {
    Json(state.service.cached_info())
}

pub async fn flush_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.service.flush_cache();
    StatusCode::NO_CONTENT
}

/// Render the current configuration into the embedding container.
pub async fn embed_report(State(state): State<Arc<AppState>>) -> Json<EmbedView> {
    let config = state.config.snapshot();
    let mut panel = state.embedding_panel.lock().await;
    panel.initialize(&config).await;
    Json(panel.view())
}

pub async fn embed_page(
    Path(container): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.embed_client.render(&container) {
        Some(page) => Html(page).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn embed_error(
    Path(container): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(report): Json<EmbedErrorReport>,
) -> StatusCode {
    if state
        .embed_client
        .report_error(&container, &report.detail.to_string())
    {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn drain_alerts(State(state): State<Arc<AppState>>) -> Json<Vec<Alert>> {
    Json(state.alerts.drain())
}

#[cfg(test)]
mod tests {
    use crate::application::alerts::EMBED_FAILED;
    use crate::domain::configuration::WidgetConfig;
    use crate::infrastructure::http_transport::ReqwestTransport;
    use crate::presentation::app_state::AppState;
    use crate::presentation::build_router;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    fn datahub() -> Router {
        Router::new()
            .route("/service/datahub/powerbi/config", get(|| async { Json(json!({})) }))
            .route(
                "/service/datahub/powerbi/groups",
                get(|| async {
                    Json(json!({"status": "SUCCEEDED", "data": [{"id": "w1", "name": "Sales"}, {"id": "w2", "name": "Ops"}]}))
                }),
            )
            .route(
                "/service/datahub/powerbi/reports",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let data = match params["groupId"].as_str() {
                        "w1" => json!([{"id": "r1", "name": "Revenue"}]),
                        _ => json!([{"id": "r9", "name": "Uptime"}, {"id": "r8", "name": "Latency"}]),
                    };
                    Json(json!({"status": "SUCCEEDED", "data": data}))
                }),
            )
            .route(
                "/service/datahub/powerbi/embedReport",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({"status": "SUCCEEDED", "data": {"token": format!("token-{}", params["reportId"])}}))
                }),
            )
    }

    #[tokio::test]
    async fn test_configure_and_embed_through_host() {
        let backend = serve(datahub()).await;
        let transport = Arc::new(ReqwestTransport::new(&backend, Duration::from_secs(5)).unwrap());
        let state = Arc::new(AppState::new(WidgetConfig::default(), transport, "report-container"));
        let host = serve(build_router(state)).await;
        let client = reqwest::Client::new();

        let view: Value = client
            .post(format!("{}/panel/init", host))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["stage"], "form-bound");
        assert_eq!(view["form"]["workspace"]["id"], "w1");

        let view: Value = client
            .put(format!("{}/panel/workspace", host))
            .json(&json!({"id": "w2"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["form"]["report"]["id"], "r9");
        assert_eq!(view["isLoading"], false);

        client
            .put(format!("{}/panel/panes", host))
            .json(&json!({"navPaneEnabled": true}))
            .send()
            .await
            .unwrap();

        let config: Value = client
            .get(format!("{}/config", host))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(config["workspace"], "w2");
        assert_eq!(config["report"]["id"], "r9");
        assert_eq!(config["isNavPaneEnabled"], true);

        let embed: Value = client
            .post(format!("{}/embed", host))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(embed["embedded"], true);

        let page = client
            .get(format!("{}/embed/report-container", host))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("\"accessToken\":\"token-r9\""));
        assert!(page.contains("\"navContentPaneEnabled\":true"));

        let status = client
            .post(format!("{}/embed/report-container/error", host))
            .json(&json!({"detail": {"message": "TokenExpired"}}))
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status, reqwest::StatusCode::NO_CONTENT);

        let alerts: Value = client
            .get(format!("{}/alerts", host))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(alerts.as_array().unwrap().len(), 1);
        assert_eq!(alerts[0]["message"], EMBED_FAILED);
    }

    #[tokio::test]
    async fn test_selection_before_init_conflicts() {
        let transport = Arc::new(ReqwestTransport::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap());
        let state = Arc::new(AppState::new(WidgetConfig::default(), transport, "report-container"));
        let host = serve(build_router(state)).await;
        let client = reqwest::Client::new();

        let response = client
            .put(format!("{}/panel/workspace", host))
            .json(&json!({"id": "w1"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

        let response = client
            .get(format!("{}/embed/report-container", host))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let descriptor: Value = client
            .get(format!("{}/widget", host))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(descriptor["label"], "Power BI Widget");

        let preview = client
            .get(format!("{}{}", host, descriptor["previewImage"].as_str().unwrap()))
            .send()
            .await
            .unwrap();
        assert_eq!(preview.status(), reqwest::StatusCode::OK);
        assert_eq!(preview.headers()[reqwest::header::CONTENT_TYPE], "image/svg+xml");
        assert!(preview.text().await.unwrap().starts_with("<svg"));
    }
}
