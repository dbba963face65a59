use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

use super::success;
use crate::error::HubError;
use crate::filters::{route_date, Category, FilterQuery};
use crate::pagination::{offset, Page, PAGE_SIZE};
use crate::state::AppState;

const LIST_PATH: &str = "/api/activity-breakdown";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(LIST_PATH, get(api_activity_list))
        .route("/api/activity-breakdown/chart-data", get(api_activity_chart))
        .route("/api/activity-breakdown/by-date/{date}", get(api_activity_by_date))
}

async fn api_activity_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let filter = q.record_filter(Category::ActivityType)?;
    let page = q.page();

    let (rows, total) = state
        .activity
        .activity_page(&filter, PAGE_SIZE, offset(page))
        .map_err(|e| e.context("Failed to retrieve activity breakdown data"))?;

    Ok(success(Page::new(rows, total, page, LIST_PATH)))
}

/// GET /api/activity-breakdown/chart-data — per-type hour totals and average share.
async fn api_activity_chart(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let filter = q.record_filter(Category::None)?;

    let totals = state
        .activity
        .activity_totals(&filter)
        .map_err(|e| e.context("Failed to retrieve activity breakdown chart data"))?;

    Ok(success(totals))
}

async fn api_activity_by_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Value>, HubError> {
    let date = route_date(&date)?;

    let rows = state
        .activity
        .activity_on(date)
        .map_err(|e| e.context("Failed to retrieve activity breakdown for the specified date"))?;

    Ok(success(rows))
}
