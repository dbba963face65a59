use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use super::success;
use crate::bucketing::{self, Granularity};
use crate::error::HubError;
use crate::filters::{Category, FilterQuery};
use crate::pagination::{offset, Page, PAGE_SIZE};
use crate::state::AppState;

const LIST_PATH: &str = "/api/distance";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(LIST_PATH, get(api_distance_list))
        .route("/api/distance/chart-data", get(api_distance_chart))
}

/// GET /api/distance — paginated distance rows, newest first.
async fn api_distance_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let filter = q.record_filter(Category::None)?;
    let page = q.page();

    let (rows, total) = state
        .distance
        .distance_page(&filter, PAGE_SIZE, offset(page))
        .map_err(|e| e.context("Failed to retrieve distance data"))?;

    Ok(success(Page::new(rows, total, page, LIST_PATH)))
}

/// GET /api/distance/chart-data — distance summed into buckets sized by the
/// requested range.  Both dates are required.
async fn api_distance_chart(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let range = q.required_range()?;

    let samples = state
        .distance
        .distance_samples(&range)
        .map_err(|e| e.context("Failed to retrieve distance chart data"))?;

    let granularity = Granularity::for_range(&range);
    let points = bucketing::bucket(&range, samples);
    tracing::debug!(
        "distance chart {}..{}: {granularity:?}, {} point(s)",
        range.start(),
        range.end(),
        points.len()
    );

    Ok(Json(json!({
        "success": true,
        "granularity": granularity,
        "data": points,
    })))
}
