//! Screening-question quotas: rebalancing, validation, editing, and persistence.

pub mod domain;
mod editor;
mod filters;
mod payload;
mod rebalance;
pub mod repository;
pub mod router;
pub mod service;
mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    QuestionOption, QuestionSource, QuotaAudience, QuotaFilters, QuotaOptionTarget,
    QuotaScreeningQuestion, ScreeningQuestion,
};
pub use editor::QuotaEditError;
pub use filters::{on_filter_change, CatalogQuery};
pub use payload::{
    build_quota_payload, AgeQuota, AgeQuotaDraft, CategoryQuota, CategoryQuotaDraft,
    DemographicQuotas, GenderQuota, GenderQuotaDraft, LocationQuota, LocationQuotaDraft,
    QuotaKind, QuotaPayload, QuotaSettings, QuotaTarget, QuotaTargetDraft,
};
pub use rebalance::{rebalance, rebalance_in_place};
pub use repository::{
    CatalogError, QuotaRepository, RepositoryError, ScreeningCatalog, Vendor, VendorDirectory,
};
pub use router::quota_router;
pub use service::{QuotaSaveRequest, QuotaService, QuotaServiceError};
pub use validation::{validate, QuotaValidationError};
