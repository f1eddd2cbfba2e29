use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{QuotaAudience, QuotaFilters, ScreeningQuestion};
use super::payload::{build_quota_payload, DemographicQuotas, QuotaPayload, QuotaSettings};
use super::repository::{
    CatalogError, QuotaRepository, RepositoryError, ScreeningCatalog, Vendor, VendorDirectory,
};
use super::validation::{validate, QuotaValidationError};
use crate::workflows::SurveyId;

/// Everything the quota form submits on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaSaveRequest {
    pub quota: QuotaAudience,
    #[serde(default)]
    pub settings: QuotaSettings,
    #[serde(default)]
    pub demographics: DemographicQuotas,
}

/// Service composing the screening catalog, vendor directory, and quota repository.
pub struct QuotaService<C, V, R> {
    catalog: Arc<C>,
    vendors: Arc<V>,
    repository: Arc<R>,
}

impl<C, V, R> QuotaService<C, V, R>
where
    C: ScreeningCatalog + 'static,
    V: VendorDirectory + 'static,
    R: QuotaRepository + 'static,
{
    pub fn new(catalog: Arc<C>, vendors: Arc<V>, repository: Arc<R>) -> Self {
        Self {
            catalog,
            vendors,
            repository,
        }
    }

    /// Fetch the catalog slice the filters point at.
    pub async fn screening_catalog(
        &self,
        filters: &QuotaFilters,
    ) -> Result<Vec<ScreeningQuestion>, QuotaServiceError> {
        let query = filters.catalog_query()?;
        let questions = self.catalog.fetch(&query).await?;
        debug!(
            source = query.source.label(),
            country = %query.country_code,
            language = %query.language,
            count = questions.len(),
            "screening catalog loaded"
        );
        Ok(questions)
    }

    pub async fn vendors(&self) -> Result<Vec<Vendor>, QuotaServiceError> {
        Ok(self.vendors.list().await?)
    }

    /// Validate against the current catalog slice without persisting anything.
    pub async fn check(&self, quota: &QuotaAudience) -> Result<(), QuotaServiceError> {
        if !quota.enabled {
            return Ok(());
        }

        let catalog = self.screening_catalog(&quota.filters).await?;
        match validate(quota, &catalog) {
            Some(error) => Err(QuotaServiceError::Validation(error)),
            None => Ok(()),
        }
    }

    /// Validate, build the upsert payload, and persist it.
    pub async fn save(
        &self,
        survey_id: &SurveyId,
        request: QuotaSaveRequest,
    ) -> Result<QuotaPayload, QuotaServiceError> {
        let QuotaSaveRequest {
            quota,
            settings,
            demographics,
        } = request;

        self.check(&quota).await?;

        let payload = build_quota_payload(&quota, &settings, &demographics);
        self.repository.upsert(survey_id, &payload).await?;

        info!(
            %survey_id,
            active = payload.is_active,
            screening = payload.screening_questions.len(),
            "quota saved"
        );
        Ok(payload)
    }

    pub async fn get(&self, survey_id: &SurveyId) -> Result<QuotaPayload, QuotaServiceError> {
        self.repository
            .fetch(survey_id)
            .await?
            .ok_or_else(|| RepositoryError::SurveyNotFound(survey_id.clone()).into())
    }
}

/// Error raised by the quota service.
#[derive(Debug, thiserror::Error)]
pub enum QuotaServiceError {
    #[error(transparent)]
    Validation(#[from] QuotaValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
