// HTTP request handlers
use crate::domain::chart::Window;
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::json_response;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct WindowQuery {
    pub window: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current-reading dashboard view
pub async fn dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let view = state.dashboard_service.render(&state.live.borrow());

    match json_response(&view, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Historical charts view for one selected window
pub async fn charts(
    Query(query): Query<WindowQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let window = query
        .window
        .as_deref()
        .and_then(Window::parse)
        .unwrap_or(Window::OneDay);

    let page = state.chart_service.select_window(window).await;

    match json_response(&page, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream dashboard updates (current state first, then every change)
pub async fn stream_live(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let service = state.dashboard_service.clone();

    stream_from_watch(state.live.clone(), move |feed| service.render(feed), compress).await
}

/// Check if the client accepts Brotli compression
fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}
