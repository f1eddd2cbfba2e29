use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use survey_quota::workflows::builder::{
    CreatedQuestion, Question, QuestionId, QuestionPatch, QuestionStore, StoreError,
};
use survey_quota::workflows::quota::{
    CatalogError, CatalogQuery, QuestionOption, QuestionSource, QuotaPayload, QuotaRepository,
    RepositoryError, ScreeningCatalog, ScreeningQuestion, Vendor, VendorDirectory,
};
use survey_quota::workflows::SurveyId;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const DEMO_VENDOR_ID: &str = "vendor-panelgrid";

/// Catalog keyed by slice; country and language only matter for the system slice.
#[derive(Clone)]
pub(crate) struct InMemoryCatalog {
    system: Arc<Vec<ScreeningQuestion>>,
    vendors: Arc<HashMap<String, Vec<ScreeningQuestion>>>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        let mut vendors = HashMap::new();
        vendors.insert(DEMO_VENDOR_ID.to_string(), vendor_questions());
        Self {
            system: Arc::new(system_questions()),
            vendors: Arc::new(vendors),
        }
    }
}

#[async_trait]
impl ScreeningCatalog for InMemoryCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ScreeningQuestion>, CatalogError> {
        let questions = match (query.source, query.vendor_id.as_deref()) {
            (QuestionSource::System, _) => {
                if query.language.eq_ignore_ascii_case("en") {
                    self.system.as_ref().clone()
                } else {
                    Vec::new()
                }
            }
            (QuestionSource::Vendor, Some(vendor_id)) => {
                self.vendors.get(vendor_id).cloned().unwrap_or_default()
            }
            (QuestionSource::Vendor, None) => return Err(CatalogError::MissingVendor),
        };
        Ok(questions
            .into_iter()
            .filter(|question| question.is_active)
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryVendorDirectory;

#[async_trait]
impl VendorDirectory for InMemoryVendorDirectory {
    async fn list(&self) -> Result<Vec<Vendor>, CatalogError> {
        Ok(vec![Vendor {
            id: DEMO_VENDOR_ID.to_string(),
            name: "PanelGrid".to_string(),
        }])
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryQuotaRepository {
    payloads: Arc<Mutex<HashMap<SurveyId, QuotaPayload>>>,
}

#[async_trait]
impl QuotaRepository for InMemoryQuotaRepository {
    async fn upsert(
        &self,
        survey_id: &SurveyId,
        payload: &QuotaPayload,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.payloads.lock().expect("quota mutex poisoned");
        guard.insert(survey_id.clone(), payload.clone());
        Ok(())
    }

    async fn fetch(&self, survey_id: &SurveyId) -> Result<Option<QuotaPayload>, RepositoryError> {
        let guard = self.payloads.lock().expect("quota mutex poisoned");
        Ok(guard.get(survey_id).cloned())
    }
}

#[derive(Default)]
struct QuestionTable {
    questions: HashMap<String, Question>,
    created_by_key: HashMap<String, String>,
    next_id: u64,
}

/// Question store that answers a replayed create with the id issued the first time.
#[derive(Default, Clone)]
pub(crate) struct InMemoryQuestionStore {
    surveys: Arc<Mutex<HashMap<SurveyId, QuestionTable>>>,
}

impl InMemoryQuestionStore {
    pub(crate) fn questions(&self, survey_id: &SurveyId) -> Vec<Question> {
        let guard = self.surveys.lock().expect("question mutex poisoned");
        let mut questions: Vec<Question> = guard
            .get(survey_id)
            .map(|table| table.questions.values().cloned().collect())
            .unwrap_or_default();
        questions.sort_by_key(|question| question.order_index);
        questions
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionStore {
    async fn create(
        &self,
        survey_id: &SurveyId,
        question: &Question,
        idempotency_key: &str,
    ) -> Result<CreatedQuestion, StoreError> {
        let mut guard = self.surveys.lock().expect("question mutex poisoned");
        let table = guard.entry(survey_id.clone()).or_default();
        if let Some(id) = table.created_by_key.get(idempotency_key) {
            return Ok(CreatedQuestion { id: id.clone() });
        }

        table.next_id += 1;
        let id = format!("q-{:04}", table.next_id);
        table.questions.insert(
            id.clone(),
            question.clone().with_id(QuestionId::server(id.clone())),
        );
        table
            .created_by_key
            .insert(idempotency_key.to_string(), id.clone());
        Ok(CreatedQuestion { id })
    }

    async fn update(
        &self,
        survey_id: &SurveyId,
        question_id: &str,
        patch: &QuestionPatch,
    ) -> Result<(), StoreError> {
        let mut guard = self.surveys.lock().expect("question mutex poisoned");
        let question = guard
            .get_mut(survey_id)
            .and_then(|table| table.questions.get_mut(question_id))
            .ok_or_else(|| StoreError::NotFound(question_id.to_string()))?;
        patch.apply_to(question);
        Ok(())
    }

    async fn delete(&self, survey_id: &SurveyId, question_id: &str) -> Result<(), StoreError> {
        let mut guard = self.surveys.lock().expect("question mutex poisoned");
        guard
            .get_mut(survey_id)
            .and_then(|table| table.questions.remove(question_id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(question_id.to_string()))
    }
}

fn choice(id: &str, text: &str, options: &[(&str, &str)]) -> ScreeningQuestion {
    ScreeningQuestion {
        id: id.to_string(),
        text: text.to_string(),
        question_type: "single_choice".to_string(),
        is_active: true,
        vendor_question_id: None,
        options: Some(
            options
                .iter()
                .map(|(id, label)| QuestionOption {
                    id: id.to_string(),
                    label: label.to_string(),
                    vendor_option_id: None,
                })
                .collect(),
        ),
    }
}

fn system_questions() -> Vec<ScreeningQuestion> {
    vec![
        choice(
            "sys-income",
            "Household income",
            &[
                ("income-low", "Under $50k"),
                ("income-mid", "$50k to $100k"),
                ("income-high", "Over $100k"),
            ],
        ),
        choice(
            "sys-owner",
            "Do you own a pet?",
            &[("owner-yes", "Yes"), ("owner-no", "No")],
        ),
        ScreeningQuestion {
            id: "sys-zip".to_string(),
            text: "Postal code".to_string(),
            question_type: "text".to_string(),
            is_active: true,
            vendor_question_id: None,
            options: None,
        },
    ]
}

fn vendor_questions() -> Vec<ScreeningQuestion> {
    let mut employment = choice(
        "pg-employment",
        "Employment status",
        &[("pg-employed", "Employed"), ("pg-student", "Student")],
    );
    employment.vendor_question_id = Some("EMP_STATUS".to_string());
    if let Some(options) = employment.options.as_mut() {
        for (index, option) in options.iter_mut().enumerate() {
            option.vendor_option_id = Some((index + 1).to_string());
        }
    }
    vec![employment]
}
