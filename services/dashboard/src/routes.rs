use crate::infra::{AppState, DashboardQuery};
use crate::views;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use maud::Markup;
use price_explorer::error::AppError;
use price_explorer::explorer::Explorer;
use serde_json::json;
use tracing::warn;

pub(crate) fn dashboard_routes() -> Router {
    Router::new()
        .route("/", get(dashboard_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// One full interaction: load (cached), validate, filter, render.
pub(crate) async fn dashboard_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<(StatusCode, Markup), AppError> {
    let snapshot = state.cache.snapshot(&state.sources)?;

    let explorer = match Explorer::validate(snapshot) {
        Ok(explorer) => explorer,
        Err(err) => {
            warn!(error = %err, "listings failed schema validation");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                views::schema_error_page(&state.title, &err),
            ));
        }
    };

    let outcome = explorer.run(&query.selection());
    let page = views::dashboard_page(&state.title, &explorer, &outcome, query.sort())?;
    Ok((StatusCode::OK, page))
}
