use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use super::diff::QuestionDiff;
use super::service::{QuestionSyncRequest, QuestionSyncService};
use super::store::QuestionStore;
use super::sync::SyncReport;
use crate::error::AppError;
use crate::workflows::SurveyId;

/// Router exposing question diff previews and sync runs.
pub fn question_router<S>(service: Arc<QuestionSyncService<S>>) -> Router
where
    S: QuestionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/surveys/:survey_id/questions/diff",
            post(diff_handler::<S>),
        )
        .route(
            "/api/v1/surveys/:survey_id/questions/sync",
            post(sync_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn diff_handler<S>(
    State(service): State<Arc<QuestionSyncService<S>>>,
    Path(_survey_id): Path<String>,
    Json(request): Json<QuestionSyncRequest>,
) -> Json<QuestionDiff>
where
    S: QuestionStore + 'static,
{
    Json(service.plan(&request))
}

pub(crate) async fn sync_handler<S>(
    State(service): State<Arc<QuestionSyncService<S>>>,
    Path(survey_id): Path<String>,
    Json(request): Json<QuestionSyncRequest>,
) -> Result<Json<SyncReport>, AppError>
where
    S: QuestionStore + 'static,
{
    let report = service.sync(&SurveyId(survey_id), &request).await?;
    Ok(Json(report))
}
