use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use survey_quota::workflows::builder::{question_router, QuestionStore, QuestionSyncService};
use survey_quota::workflows::quota::{
    quota_router, QuotaRepository, QuotaService, ScreeningCatalog, VendorDirectory,
};

pub(crate) fn with_survey_routes<C, V, R, S>(
    quota_service: Arc<QuotaService<C, V, R>>,
    question_service: Arc<QuestionSyncService<S>>,
) -> axum::Router
where
    C: ScreeningCatalog + 'static,
    V: VendorDirectory + 'static,
    R: QuotaRepository + 'static,
    S: QuestionStore + 'static,
{
    quota_router(quota_service)
        .merge(question_router(question_service))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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
