use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::ScreeningQuestion;
use super::filters::CatalogQuery;
use super::payload::QuotaPayload;
use crate::workflows::SurveyId;

/// Panel vendor available for vendor-sourced screening questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
}

/// Screening-question catalog, sliced by source, vendor, country, and language.
#[async_trait]
pub trait ScreeningCatalog: Send + Sync {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ScreeningQuestion>, CatalogError>;
}

/// Vendor listing used to populate the vendor filter.
#[async_trait]
pub trait VendorDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<Vendor>, CatalogError>;
}

/// Persistence for the quota upsert payload.
#[async_trait]
pub trait QuotaRepository: Send + Sync {
    async fn upsert(&self, survey_id: &SurveyId, payload: &QuotaPayload)
        -> Result<(), RepositoryError>;
    async fn fetch(&self, survey_id: &SurveyId) -> Result<Option<QuotaPayload>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("vendor-sourced screening questions require a vendor id")]
    MissingVendor,
    #[error("screening catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("survey {0} not found")]
    SurveyNotFound(SurveyId),
    #[error("quota rejected by server: {0}")]
    Rejected(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
