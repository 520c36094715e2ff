// HTTP request handlers
use crate::application::reactive_controller::{ControllerState, DisplayedChart};
use crate::domain::sales::RegionSelector;
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::page::render_page;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ChartQuery {
    pub region: Option<RegionSelector>,
}

#[derive(Deserialize)]
pub struct SelectorChange {
    pub region: RegionSelector,
}

/// Displayed chart plus whether a newer one is being built
#[derive(Serialize)]
pub struct SessionChart {
    pub state: ControllerState,
    #[serde(flatten)]
    pub displayed: DisplayedChart,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Dashboard page for a fresh session, pre-drawn with the `all` chart
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let (session, controller) = state.sessions.open().await;
    let displayed = controller.current();
    Html(render_page(
        &state.page,
        session,
        displayed.selector.as_str(),
        &displayed.chart,
    ))
}

/// Selector options for the radio control
pub async fn list_regions(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond_json(&state.page.options, accepts_brotli(&headers)).await
}

/// Stateless chart for the requested selector
pub async fn get_chart(
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let selector = query.region.unwrap_or_default();
    let chart = state.dashboard_service.render(&selector);
    respond_json(&chart, accepts_brotli(&headers)).await
}

/// Chart currently displayed for a session
pub async fn current_chart(
    Path(session): Path<Uuid>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(controller) = state.sessions.get(&session).await else {
        return unknown_session(&session);
    };
    let view = SessionChart {
        state: controller.state(),
        displayed: controller.current(),
    };
    respond_json(&view, accepts_brotli(&headers)).await
}

/// Selector-change event for a session
pub async fn change_selector(
    Path(session): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(change): Json<SelectorChange>,
) -> Response {
    let Some(controller) = state.sessions.get(&session).await else {
        return unknown_session(&session);
    };
    tracing::debug!("Session {} selector change: {}", session, change.region);
    match controller.select(change.region).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => {
            tracing::error!("Dropping selector change for session {}: {}", session, e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// Stream a session's displayed charts as newline-delimited JSON
pub async fn stream_chart(
    Path(session): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.sessions.follow(&session).await {
        Some((rx, follower)) => stream_from_watch(rx, follower).into_response(),
        None => unknown_session(&session),
    }
}

fn unknown_session(session: &Uuid) -> Response {
    tracing::debug!("Unknown or expired session {}", session);
    StatusCode::NOT_FOUND.into_response()
}

async fn respond_json<T: serde::Serialize>(data: &T, compress: bool) -> Response {
    match json_response(data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
