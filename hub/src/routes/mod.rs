pub mod activity;
pub mod distance;
pub mod engine_hours;
pub mod messages;

use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AuthToken};
use crate::state::AppState;

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(distance::routes())
        .merge(engine_hours::routes())
        .merge(activity::routes())
        .merge(messages::routes())
}

/// Full application: API, health probe, static frontend, auth and CORS.
pub fn build_app(state: Arc<AppState>) -> Router {
    let token = state.config.token.clone();
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .merge(api_router())
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(middleware::from_fn(auth::require_auth))
        .layer(axum::Extension(AuthToken(token)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Wrap a payload in the `{success: true, data}` envelope.
pub fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use rusqlite::{params, Connection};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::HubConfig;
    use crate::db::testutil::{missing_store, store_with};
    use crate::db::SqliteStore;
    use crate::state::AppState;

    fn app_for(store: SqliteStore, token: &str) -> axum::Router {
        let mut config = HubConfig::for_db("unused.db".into());
        config.token = token.to_string();
        super::build_app(AppState::with_store(config, Arc::new(store)))
    }

    async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    fn seed(conn: &Connection) {
        for (date, value) in [("2023-01-01", 100), ("2023-01-02", 150)] {
            conn.execute(
                "INSERT INTO distance (date, value) VALUES (?, ?)",
                params![date, value],
            )
            .unwrap();
        }
        for (activity, hours, pct, date) in [
            ("Driving", 8.5, 50.0, "2023-01-01"),
            ("Idle", 3.2, 20.0, "2023-01-01"),
            ("Working", 5.7, 30.0, "2023-01-01"),
        ] {
            conn.execute(
                "INSERT INTO activity_breakdown (activity_type, hours, percentage, date)
                 VALUES (?, ?, ?, ?)",
                params![activity, hours, pct, date],
            )
            .unwrap();
        }
        for (activity, pct) in [("Driving", 60.0), ("Idle", 40.0)] {
            conn.execute(
                "INSERT INTO activity_breakdown (activity_type, hours, percentage, date)
                 VALUES (?, 1.0, ?, '2023-04-15')",
                params![activity, pct],
            )
            .unwrap();
        }
        for (date, count, kind) in [
            ("2023-01-01", 10, "Alert"),
            ("2023-01-02", 4, "Info"),
            ("2023-01-02", 6, "Alert"),
        ] {
            conn.execute(
                "INSERT INTO messages_received (date, count, message_type) VALUES (?, ?, ?)",
                params![date, count, kind],
            )
            .unwrap();
        }
        conn.execute(
            "INSERT INTO engine_hours (date, hours) VALUES ('2023-01-02', 9.5), ('2023-01-01', 8.0)",
            [],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn distance_chart_buckets_by_day() {
        let app = app_for(store_with("api_chart", seed), "");
        let (status, body) = get(
            app,
            "/api/distance/chart-data?start_date=2023-01-01&end_date=2023-01-02",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["granularity"], "day");
        assert_eq!(
            body["data"],
            serde_json::json!([
                {"date": "2023-01-01", "value": 100.0},
                {"date": "2023-01-02", "value": 150.0},
            ])
        );
    }

    #[tokio::test]
    async fn distance_chart_requires_both_dates() {
        let app = app_for(store_with("api_chart_required", seed), "");
        let (status, body) = get(app, "/api/distance/chart-data?start_date=2023-01-01").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["errors"]["end_date"].is_array());
        assert!(body["errors"].get("start_date").is_none());
    }

    #[tokio::test]
    async fn reversed_range_is_rejected_on_end_date() {
        let app = app_for(store_with("api_reversed", seed), "");
        let (status, body) = get(
            app,
            "/api/distance?start_date=2023-02-01&end_date=2023-01-01",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"]["end_date"][0],
            "The end date must be a date after or equal to start date."
        );
    }

    #[tokio::test]
    async fn invalid_list_date_is_rejected() {
        let app = app_for(store_with("api_invalid", seed), "");
        let (status, body) = get(
            app,
            "/api/distance?start_date=invalid-date&end_date=2023-01-31",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["start_date"].is_array());
    }

    #[tokio::test]
    async fn duplicated_query_parameter_is_a_validation_error() {
        for uri in [
            "/api/distance?start_date=2023-01-01&start_date=2023-01-02",
            "/api/distance/chart-data?start_date=2023-01-01&start_date=2023-01-02&end_date=2023-01-31",
            "/api/messages-received?message_type=Alert&message_type=Info",
        ] {
            let app = app_for(store_with("api_duplicate", seed), "");
            let (status, body) = get(app, uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert_eq!(body["success"], false, "{uri}");
            assert_eq!(body["message"], "The given data was invalid.", "{uri}");
            assert!(body["errors"].as_object().is_some_and(|e| e.len() == 1), "{uri}");
        }

        let app = app_for(store_with("api_duplicate_field", seed), "");
        let (_, body) = get(
            app,
            "/api/distance?start_date=2023-01-01&start_date=2023-01-02",
        )
        .await;
        assert_eq!(
            body["errors"]["start_date"][0],
            "The start date field must be given only once."
        );
    }

    #[tokio::test]
    async fn large_listing_keeps_page_links_bounded() {
        let app = app_for(
            store_with("api_many_rows", |conn| {
                let start = chrono::NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
                for i in 0..3000 {
                    let date = start + chrono::Duration::days(i);
                    conn.execute(
                        "INSERT INTO distance (date, value) VALUES (?, ?)",
                        params![date.format("%Y-%m-%d").to_string(), i],
                    )
                    .unwrap();
                }
            }),
            "",
        );
        let (status, body) = get(app, "/api/distance?page=1").await;
        assert_eq!(status, StatusCode::OK);
        let page = &body["data"];
        assert_eq!(page["last_page"], 300);
        assert_eq!(page["data"].as_array().unwrap().len(), 10);
        let links = page["links"].as_array().unwrap();
        assert_eq!(links.len(), 15);
        assert!(links.iter().any(|l| l["label"] == "..." && l["url"].is_null()));
    }

    #[tokio::test]
    async fn distance_list_is_paginated() {
        let app = app_for(store_with("api_list", seed), "");
        let (status, body) = get(app, "/api/distance").await;
        assert_eq!(status, StatusCode::OK);
        let page = &body["data"];
        assert_eq!(page["total"], 2);
        assert_eq!(page["per_page"], 10);
        assert_eq!(page["current_page"], 1);
        assert_eq!(page["data"][0]["date"], "2023-01-02");
        assert_eq!(page["data"][0]["value"], 150);
    }

    #[tokio::test]
    async fn activity_type_filter_returns_single_row() {
        let app = app_for(store_with("api_activity", seed), "");
        let (status, body) = get(
            app,
            "/api/activity-breakdown?activity_type=Driving&start_date=2023-01-01&end_date=2023-01-01",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"]["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["activity_type"], "Driving");
    }

    #[tokio::test]
    async fn activity_by_date() {
        let store = Arc::new(store_with("api_by_date", seed));
        let app = |s: &Arc<SqliteStore>| {
            super::build_app(AppState::with_store(HubConfig::for_db("unused.db".into()), s.clone()))
        };

        let (status, body) = get(app(&store), "/api/activity-breakdown/by-date/2023-04-15").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["date"] == "2023-04-15"));
        assert_eq!(rows[0]["percentage"], 60.0);

        let (status, body) = get(app(&store), "/api/activity-breakdown/by-date/invalid-date").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["date"].is_array());
    }

    #[tokio::test]
    async fn activity_chart_groups_by_type() {
        let app = app_for(store_with("api_activity_chart", seed), "");
        let (status, body) = get(
            app,
            "/api/activity-breakdown/chart-data?start_date=2023-01-01&end_date=2023-01-31",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.get("total_hours").is_some()
            && r.get("avg_percentage").is_some()));
    }

    #[tokio::test]
    async fn engine_hours_chart_is_raw_ascending() {
        let app = app_for(store_with("api_engine", seed), "");
        let (status, body) = get(app, "/api/engine-hours/chart-data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            serde_json::json!([
                {"date": "2023-01-01", "hours": 8.0},
                {"date": "2023-01-02", "hours": 9.5},
            ])
        );
    }

    #[tokio::test]
    async fn messages_chart_and_statistics() {
        let store = Arc::new(store_with("api_messages", seed));
        let app = || {
            super::build_app(AppState::with_store(
                HubConfig::for_db("unused.db".into()),
                store.clone(),
            ))
        };

        let (status, body) = get(app(), "/api/messages-received/chart-data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["by_type"][0]["message_type"], "Alert");
        assert_eq!(body["data"]["by_type"][0]["total_count"], 16);
        assert_eq!(body["data"]["daily"][1]["daily_count"], 10);

        let (status, body) = get(app(), "/api/messages-received/statistics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_messages"], 20);
        assert_eq!(body["data"]["message_types"][0]["type_count"], 16);
        assert_eq!(body["data"]["latest_messages"].as_array().unwrap().len(), 3);

        let (_, body) = get(app(), "/api/messages-received?message_type=Info").await;
        assert_eq!(body["data"]["total"], 1);
    }

    #[tokio::test]
    async fn empty_result_is_success() {
        let app = app_for(store_with("api_empty", |_| {}), "");
        let (status, body) = get(
            app,
            "/api/distance/chart-data?start_date=2023-01-01&end_date=2023-12-31",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let app = app_for(missing_store(), "");
        let (status, body) = get(app, "/api/messages-received/statistics").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to retrieve message statistics");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn bearer_token_guards_api_only() {
        let store = Arc::new(store_with("api_auth", seed));
        let app = || {
            let mut config = HubConfig::for_db("unused.db".into());
            config.token = "s3cret".to_string();
            super::build_app(AppState::with_store(config, store.clone()))
        };

        let (status, body) = get(app(), "/api/distance").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthenticated.");

        let req = Request::builder()
            .uri("/api/distance")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
