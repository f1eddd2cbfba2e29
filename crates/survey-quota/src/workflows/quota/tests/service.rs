use std::sync::Arc;

use super::common::*;
use crate::workflows::quota::{
    CatalogError, QuestionSource, QuotaAudience, QuotaFilters, QuotaSaveRequest, QuotaService,
    QuotaServiceError, QuotaValidationError, RepositoryError,
};
use crate::workflows::SurveyId;

fn balanced_quota() -> QuotaAudience {
    let mut quota = QuotaAudience::default();
    quota.set_enabled(true);
    quota.toggle_screening_question(&gender_question());
    quota.set_total_target(Some(90));
    quota
}

#[tokio::test]
async fn save_persists_payload_for_valid_quota() {
    let (service, catalog, quotas) = build_service();
    let request = QuotaSaveRequest {
        quota: balanced_quota(),
        ..QuotaSaveRequest::default()
    };

    let payload = service
        .save(&SurveyId::from("survey-9"), request)
        .await
        .expect("save succeeds");

    assert!(payload.is_active);
    assert_eq!(payload.total_target, Some(90));
    assert_eq!(quotas.stored("survey-9"), Some(payload));
    assert_eq!(catalog.queries().len(), 1);
}

#[tokio::test]
async fn save_rejects_unbalanced_quota_without_persisting() {
    let (service, _, quotas) = build_service();
    let mut quota = balanced_quota();
    quota
        .set_option_target("q-gender", "non_binary", 200)
        .expect("edit applies");

    let error = service
        .save(
            &SurveyId::from("survey-9"),
            QuotaSaveRequest {
                quota,
                ..QuotaSaveRequest::default()
            },
        )
        .await
        .expect_err("validation fails");

    assert!(matches!(
        error,
        QuotaServiceError::Validation(QuotaValidationError::OptionSumMismatch { .. })
    ));
    assert!(quotas.stored("survey-9").is_none());
}

#[tokio::test]
async fn disabled_quota_saves_without_catalog_lookup() {
    let (service, catalog, quotas) = build_service();
    let quota = QuotaAudience {
        filters: QuotaFilters {
            source: QuestionSource::Vendor,
            vendor_id: None,
            ..QuotaFilters::default()
        },
        ..QuotaAudience::default()
    };

    let payload = service
        .save(
            &SurveyId::from("survey-3"),
            QuotaSaveRequest {
                quota,
                ..QuotaSaveRequest::default()
            },
        )
        .await
        .expect("disabled quota saves");

    assert!(!payload.is_active);
    assert!(catalog.queries().is_empty());
    assert!(quotas.stored("survey-3").is_some());
}

#[tokio::test]
async fn vendor_catalog_requires_vendor_id() {
    let (service, catalog, _) = build_service();
    let filters = QuotaFilters {
        source: QuestionSource::Vendor,
        vendor_id: None,
        ..QuotaFilters::default()
    };

    assert!(matches!(
        service.screening_catalog(&filters).await,
        Err(QuotaServiceError::Catalog(CatalogError::MissingVendor))
    ));
    assert!(catalog.queries().is_empty());

    let filters = QuotaFilters {
        vendor_id: Some("vendor-1".to_string()),
        ..filters
    };
    let questions = service
        .screening_catalog(&filters)
        .await
        .expect("vendor slice loads");
    assert_eq!(questions[0].vendor_question_id.as_deref(), Some("EMP_01"));
}

#[tokio::test]
async fn catalog_outage_propagates() {
    let service = QuotaService::new(
        Arc::new(UnavailableCatalog),
        Arc::new(StaticVendors),
        Arc::new(MemoryQuotas::default()),
    );

    let error = service
        .check(&balanced_quota())
        .await
        .expect_err("catalog down");
    assert!(matches!(
        error,
        QuotaServiceError::Catalog(CatalogError::Unavailable(_))
    ));
}

#[tokio::test]
async fn get_reports_missing_survey() {
    let (service, _, _) = build_service();
    match service.get(&SurveyId::from("nope")).await {
        Err(QuotaServiceError::Repository(RepositoryError::SurveyNotFound(id))) => {
            assert_eq!(id, SurveyId::from("nope"))
        }
        other => panic!("expected not found, got {other:?}"),
    }
}
