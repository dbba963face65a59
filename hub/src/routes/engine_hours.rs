use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

use super::success;
use crate::error::HubError;
use crate::filters::{Category, FilterQuery};
use crate::pagination::{offset, Page, PAGE_SIZE};
use crate::state::AppState;

const LIST_PATH: &str = "/api/engine-hours";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(LIST_PATH, get(api_engine_hours_list))
        .route("/api/engine-hours/chart-data", get(api_engine_hours_chart))
}

async fn api_engine_hours_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let filter = q.record_filter(Category::None)?;
    let page = q.page();

    let (rows, total) = state
        .engine_hours
        .engine_hours_page(&filter, PAGE_SIZE, offset(page))
        .map_err(|e| e.context("Failed to retrieve engine hours data"))?;

    Ok(success(Page::new(rows, total, page, LIST_PATH)))
}

/// GET /api/engine-hours/chart-data — raw `(date, hours)` rows, oldest first.
async fn api_engine_hours_chart(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let filter = q.record_filter(Category::None)?;

    let series = state
        .engine_hours
        .engine_hours_series(&filter)
        .map_err(|e| e.context("Failed to retrieve engine hours chart data"))?;

    Ok(success(series))
}
