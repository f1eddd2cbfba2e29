use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::quota::{
    quota_router, CatalogError, CatalogQuery, QuestionOption, QuestionSource, QuotaPayload,
    QuotaRepository, QuotaService, RepositoryError, ScreeningCatalog, ScreeningQuestion, Vendor,
    VendorDirectory,
};
use crate::workflows::SurveyId;

pub(super) fn gender_question() -> ScreeningQuestion {
    ScreeningQuestion {
        id: "q-gender".to_string(),
        text: "Gender".to_string(),
        question_type: "single_choice".to_string(),
        is_active: true,
        vendor_question_id: None,
        options: Some(
            ["female", "male", "non_binary"]
                .iter()
                .map(|id| QuestionOption {
                    id: id.to_string(),
                    label: id.replace('_', " "),
                    vendor_option_id: None,
                })
                .collect(),
        ),
    }
}

pub(super) fn vendor_question() -> ScreeningQuestion {
    ScreeningQuestion {
        id: "vq-employment".to_string(),
        text: "Employment status".to_string(),
        question_type: "single_choice".to_string(),
        is_active: true,
        vendor_question_id: Some("EMP_01".to_string()),
        options: Some(vec![
            QuestionOption {
                id: "employed".to_string(),
                label: "Employed".to_string(),
                vendor_option_id: Some("1".to_string()),
            },
            QuestionOption {
                id: "unemployed".to_string(),
                label: "Unemployed".to_string(),
                vendor_option_id: Some("2".to_string()),
            },
        ]),
    }
}

/// Catalog serving the system slice and one vendor slice.
#[derive(Default, Clone)]
pub(super) struct MemoryCatalog {
    queries: Arc<Mutex<Vec<CatalogQuery>>>,
}

impl MemoryCatalog {
    pub(super) fn queries(&self) -> Vec<CatalogQuery> {
        self.queries.lock().expect("catalog mutex poisoned").clone()
    }
}

#[async_trait]
impl ScreeningCatalog for MemoryCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ScreeningQuestion>, CatalogError> {
        self.queries
            .lock()
            .expect("catalog mutex poisoned")
            .push(query.clone());
        Ok(match (query.source, query.vendor_id.as_deref()) {
            (QuestionSource::System, _) => vec![gender_question()],
            (QuestionSource::Vendor, Some("vendor-1")) => vec![vendor_question()],
            (QuestionSource::Vendor, _) => Vec::new(),
        })
    }
}

pub(super) struct UnavailableCatalog;

#[async_trait]
impl ScreeningCatalog for UnavailableCatalog {
    async fn fetch(&self, _query: &CatalogQuery) -> Result<Vec<ScreeningQuestion>, CatalogError> {
        Err(CatalogError::Unavailable("catalog timed out".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct StaticVendors;

#[async_trait]
impl VendorDirectory for StaticVendors {
    async fn list(&self) -> Result<Vec<Vendor>, CatalogError> {
        Ok(vec![Vendor {
            id: "vendor-1".to_string(),
            name: "Panel Partners".to_string(),
        }])
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryQuotas {
    payloads: Arc<Mutex<HashMap<SurveyId, QuotaPayload>>>,
}

impl MemoryQuotas {
    pub(super) fn stored(&self, survey_id: &str) -> Option<QuotaPayload> {
        self.payloads
            .lock()
            .expect("quota mutex poisoned")
            .get(&SurveyId::from(survey_id))
            .cloned()
    }
}

#[async_trait]
impl QuotaRepository for MemoryQuotas {
    async fn upsert(
        &self,
        survey_id: &SurveyId,
        payload: &QuotaPayload,
    ) -> Result<(), RepositoryError> {
        self.payloads
            .lock()
            .expect("quota mutex poisoned")
            .insert(survey_id.clone(), payload.clone());
        Ok(())
    }

    async fn fetch(&self, survey_id: &SurveyId) -> Result<Option<QuotaPayload>, RepositoryError> {
        Ok(self
            .payloads
            .lock()
            .expect("quota mutex poisoned")
            .get(survey_id)
            .cloned())
    }
}

pub(super) type MemoryQuotaService = QuotaService<MemoryCatalog, StaticVendors, MemoryQuotas>;

pub(super) fn build_service() -> (MemoryQuotaService, MemoryCatalog, MemoryQuotas) {
    let catalog = MemoryCatalog::default();
    let quotas = MemoryQuotas::default();
    let service = QuotaService::new(
        Arc::new(catalog.clone()),
        Arc::new(StaticVendors),
        Arc::new(quotas.clone()),
    );
    (service, catalog, quotas)
}

pub(super) fn router_with_service(service: MemoryQuotaService) -> axum::Router {
    quota_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
