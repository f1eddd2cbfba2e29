use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{QuotaAudience, QuotaFilters, QuotaOptionTarget, ScreeningQuestion};
use super::payload::QuotaPayload;
use super::rebalance::rebalance;
use super::repository::{QuotaRepository, ScreeningCatalog, Vendor, VendorDirectory};
use super::service::{QuotaSaveRequest, QuotaService};
use super::validation::validate;
use crate::error::AppError;
use crate::workflows::SurveyId;

#[derive(Debug, Deserialize)]
pub struct RebalanceRequest {
    pub option_targets: Vec<QuotaOptionTarget>,
    pub total_target: u32,
    #[serde(default)]
    pub changed_option_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RebalanceResponse {
    pub option_targets: Vec<QuotaOptionTarget>,
    pub adjusted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub quota: QuotaAudience,
    #[serde(default)]
    pub catalog: Vec<ScreeningQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub error: Option<String>,
}

/// Router exposing rebalancing, validation, catalog lookups, and quota persistence.
pub fn quota_router<C, V, R>(service: Arc<QuotaService<C, V, R>>) -> Router
where
    C: ScreeningCatalog + 'static,
    V: VendorDirectory + 'static,
    R: QuotaRepository + 'static,
{
    Router::new()
        .route("/api/v1/quota/rebalance", post(rebalance_handler))
        .route("/api/v1/quota/validate", post(validate_handler))
        .route(
            "/api/v1/screening-questions",
            get(catalog_handler::<C, V, R>),
        )
        .route("/api/v1/vendors", get(vendors_handler::<C, V, R>))
        .route(
            "/api/v1/surveys/:survey_id/quota",
            post(save_handler::<C, V, R>).get(fetch_handler::<C, V, R>),
        )
        .with_state(service)
}

pub(crate) async fn rebalance_handler(
    Json(request): Json<RebalanceRequest>,
) -> Json<RebalanceResponse> {
    let RebalanceRequest {
        option_targets,
        total_target,
        changed_option_id,
    } = request;

    let rebalanced = match rebalance(&option_targets, total_target, changed_option_id.as_deref())
    {
        Cow::Borrowed(_) => None,
        Cow::Owned(adjusted) => Some(adjusted),
    };
    let adjusted = rebalanced.is_some();

    Json(RebalanceResponse {
        option_targets: rebalanced.unwrap_or(option_targets),
        adjusted,
    })
}

pub(crate) async fn validate_handler(
    Json(request): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    let error = validate(&request.quota, &request.catalog).map(|error| error.to_string());
    Json(ValidateResponse {
        valid: error.is_none(),
        error,
    })
}

pub(crate) async fn catalog_handler<C, V, R>(
    State(service): State<Arc<QuotaService<C, V, R>>>,
    Query(filters): Query<QuotaFilters>,
) -> Result<Json<Vec<ScreeningQuestion>>, AppError>
where
    C: ScreeningCatalog + 'static,
    V: VendorDirectory + 'static,
    R: QuotaRepository + 'static,
{
    Ok(Json(service.screening_catalog(&filters).await?))
}

pub(crate) async fn vendors_handler<C, V, R>(
    State(service): State<Arc<QuotaService<C, V, R>>>,
) -> Result<Json<Vec<Vendor>>, AppError>
where
    C: ScreeningCatalog + 'static,
    V: VendorDirectory + 'static,
    R: QuotaRepository + 'static,
{
    Ok(Json(service.vendors().await?))
}

pub(crate) async fn save_handler<C, V, R>(
    State(service): State<Arc<QuotaService<C, V, R>>>,
    Path(survey_id): Path<String>,
    Json(request): Json<QuotaSaveRequest>,
) -> Result<Json<QuotaPayload>, AppError>
where
    C: ScreeningCatalog + 'static,
    V: VendorDirectory + 'static,
    R: QuotaRepository + 'static,
{
    Ok(Json(service.save(&SurveyId(survey_id), request).await?))
}

pub(crate) async fn fetch_handler<C, V, R>(
    State(service): State<Arc<QuotaService<C, V, R>>>,
    Path(survey_id): Path<String>,
) -> Result<Json<QuotaPayload>, AppError>
where
    C: ScreeningCatalog + 'static,
    V: VendorDirectory + 'static,
    R: QuotaRepository + 'static,
{
    Ok(Json(service.get(&SurveyId(survey_id)).await?))
}
