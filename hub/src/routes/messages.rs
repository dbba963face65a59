use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use super::success;
use crate::error::HubError;
use crate::filters::{Category, FilterQuery};
use crate::pagination::{offset, Page, PAGE_SIZE};
use crate::state::AppState;

const LIST_PATH: &str = "/api/messages-received";

/// Rows returned under `latest_messages` by the statistics endpoint.
const LATEST_MESSAGES: u32 = 5;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(LIST_PATH, get(api_messages_list))
        .route("/api/messages-received/chart-data", get(api_messages_chart))
        .route("/api/messages-received/statistics", get(api_messages_statistics))
}

async fn api_messages_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let filter = q.record_filter(Category::MessageType)?;
    let page = q.page();

    let (rows, total) = state
        .messages
        .messages_page(&filter, PAGE_SIZE, offset(page))
        .map_err(|e| e.context("Failed to retrieve messages data"))?;

    Ok(success(Page::new(rows, total, page, LIST_PATH)))
}

/// GET /api/messages-received/chart-data — totals per type (pie) and per day (line).
async fn api_messages_chart(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Value>, HubError> {
    let Query(q) = query?;
    let filter = q.record_filter(Category::None)?;
    let ctx = "Failed to retrieve messages chart data";

    let by_type = state
        .messages
        .message_totals_by_type(&filter)
        .map_err(|e| e.context(ctx))?;
    let daily = state
        .messages
        .daily_message_counts(&filter)
        .map_err(|e| e.context(ctx))?;

    Ok(success(json!({
        "by_type": by_type,
        "daily": daily,
    })))
}

async fn api_messages_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, HubError> {
    let stats = state
        .messages
        .message_statistics(LATEST_MESSAGES)
        .map_err(|e| e.context("Failed to retrieve message statistics"))?;

    Ok(success(stats))
}
