use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Barrier;

use crate::workflows::builder::{
    question_router, CreatedQuestion, Question, QuestionId, QuestionPatch, QuestionStore,
    QuestionSyncService, QuestionType, StoreError, SyncPolicy,
};
use crate::workflows::SurveyId;

pub(super) fn survey() -> SurveyId {
    SurveyId::from("survey-1")
}

pub(super) fn persisted(id: &str, order_index: u32) -> Question {
    Question {
        order_index,
        ..Question::new(QuestionType::SingleChoice, format!("Question {id}"))
            .with_id(QuestionId::server(id))
    }
}

pub(super) fn draft(text: &str, order_index: u32) -> Question {
    Question {
        order_index,
        ..Question::new(QuestionType::Text, text).with_id(QuestionId::temp())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum StoreCall {
    Create { key: String },
    Update { id: String, patch: QuestionPatch },
    Delete { id: String },
}

/// Store keeping questions in memory and recording every call.
#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    questions: Arc<Mutex<BTreeMap<String, Question>>>,
    keys: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    sequence: Arc<Mutex<u32>>,
}

impl MemoryStore {
    pub(super) fn seeded(questions: &[Question]) -> Self {
        let store = Self::default();
        {
            let mut guard = store.questions.lock().expect("store mutex poisoned");
            for question in questions {
                if let Some(id) = question.server_id() {
                    guard.insert(id.to_string(), question.clone());
                }
            }
        }
        store
    }

    pub(super) fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn stored(&self, id: &str) -> Option<Question> {
        self.questions
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn len(&self) -> usize {
        self.questions.lock().expect("store mutex poisoned").len()
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn create(
        &self,
        _survey_id: &SurveyId,
        question: &Question,
        idempotency_key: &str,
    ) -> Result<CreatedQuestion, StoreError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(StoreCall::Create {
                key: idempotency_key.to_string(),
            });

        let mut keys = self.keys.lock().expect("keys mutex poisoned");
        if let Some(existing) = keys.get(idempotency_key) {
            return Ok(CreatedQuestion {
                id: existing.clone(),
            });
        }

        let id = {
            let mut sequence = self.sequence.lock().expect("sequence mutex poisoned");
            *sequence += 1;
            format!("q-{:04}", *sequence)
        };
        let mut stored = question.clone();
        stored.id = Some(QuestionId::server(id.clone()));
        self.questions
            .lock()
            .expect("store mutex poisoned")
            .insert(id.clone(), stored);
        keys.insert(idempotency_key.to_string(), id.clone());
        Ok(CreatedQuestion { id })
    }

    async fn update(
        &self,
        _survey_id: &SurveyId,
        question_id: &str,
        patch: &QuestionPatch,
    ) -> Result<(), StoreError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(StoreCall::Update {
                id: question_id.to_string(),
                patch: patch.clone(),
            });
        let mut guard = self.questions.lock().expect("store mutex poisoned");
        let stored = guard
            .get_mut(question_id)
            .ok_or_else(|| StoreError::NotFound(question_id.to_string()))?;
        patch.apply_to(stored);
        Ok(())
    }

    async fn delete(&self, _survey_id: &SurveyId, question_id: &str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(StoreCall::Delete {
                id: question_id.to_string(),
            });
        self.questions
            .lock()
            .expect("store mutex poisoned")
            .remove(question_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(question_id.to_string()))
    }
}

/// Store whose creates fail with a transient error a fixed number of times.
#[derive(Clone)]
pub(super) struct FlakyStore {
    pub(super) inner: MemoryStore,
    remaining_failures: Arc<Mutex<u32>>,
}

impl FlakyStore {
    pub(super) fn failing_creates(failures: u32) -> Self {
        Self {
            inner: MemoryStore::default(),
            remaining_failures: Arc::new(Mutex::new(failures)),
        }
    }
}

#[async_trait]
impl QuestionStore for FlakyStore {
    async fn create(
        &self,
        survey_id: &SurveyId,
        question: &Question,
        idempotency_key: &str,
    ) -> Result<CreatedQuestion, StoreError> {
        {
            let mut remaining = self.remaining_failures.lock().expect("flaky mutex poisoned");
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
        }
        self.inner.create(survey_id, question, idempotency_key).await
    }

    async fn update(
        &self,
        survey_id: &SurveyId,
        question_id: &str,
        patch: &QuestionPatch,
    ) -> Result<(), StoreError> {
        self.inner.update(survey_id, question_id, patch).await
    }

    async fn delete(&self, survey_id: &SurveyId, question_id: &str) -> Result<(), StoreError> {
        self.inner.delete(survey_id, question_id).await
    }
}

/// Store rejecting every update, leaving deletes and creates working.
pub(super) struct RejectingUpdates(pub(super) MemoryStore);

#[async_trait]
impl QuestionStore for RejectingUpdates {
    async fn create(
        &self,
        survey_id: &SurveyId,
        question: &Question,
        idempotency_key: &str,
    ) -> Result<CreatedQuestion, StoreError> {
        self.0.create(survey_id, question, idempotency_key).await
    }

    async fn update(
        &self,
        _survey_id: &SurveyId,
        _question_id: &str,
        _patch: &QuestionPatch,
    ) -> Result<(), StoreError> {
        Err(StoreError::Rejected("text too long".to_string()))
    }

    async fn delete(&self, survey_id: &SurveyId, question_id: &str) -> Result<(), StoreError> {
        self.0.delete(survey_id, question_id).await
    }
}

/// Store whose creates wait until `parties` of them are in flight at once.
pub(super) struct BarrierStore {
    pub(super) inner: MemoryStore,
    barrier: Barrier,
}

impl BarrierStore {
    pub(super) fn with_parties(parties: usize) -> Self {
        Self {
            inner: MemoryStore::default(),
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl QuestionStore for BarrierStore {
    async fn create(
        &self,
        survey_id: &SurveyId,
        question: &Question,
        idempotency_key: &str,
    ) -> Result<CreatedQuestion, StoreError> {
        self.barrier.wait().await;
        self.inner.create(survey_id, question, idempotency_key).await
    }

    async fn update(
        &self,
        survey_id: &SurveyId,
        question_id: &str,
        patch: &QuestionPatch,
    ) -> Result<(), StoreError> {
        self.inner.update(survey_id, question_id, patch).await
    }

    async fn delete(&self, survey_id: &SurveyId, question_id: &str) -> Result<(), StoreError> {
        self.inner.delete(survey_id, question_id).await
    }
}

/// Store whose create never completes for `Stall*` drafts and is rejected for `Reject*` drafts.
pub(super) struct StallingStore(pub(super) MemoryStore);

#[async_trait]
impl QuestionStore for StallingStore {
    async fn create(
        &self,
        survey_id: &SurveyId,
        question: &Question,
        idempotency_key: &str,
    ) -> Result<CreatedQuestion, StoreError> {
        if question.text.starts_with("Stall") {
            return std::future::pending().await;
        }
        if question.text.starts_with("Reject") {
            return Err(StoreError::Rejected("duplicate wording".to_string()));
        }
        self.0.create(survey_id, question, idempotency_key).await
    }

    async fn update(
        &self,
        survey_id: &SurveyId,
        question_id: &str,
        patch: &QuestionPatch,
    ) -> Result<(), StoreError> {
        self.0.update(survey_id, question_id, patch).await
    }

    async fn delete(&self, survey_id: &SurveyId, question_id: &str) -> Result<(), StoreError> {
        self.0.delete(survey_id, question_id).await
    }
}

pub(super) fn router_with_store<S: QuestionStore + 'static>(store: S) -> axum::Router {
    question_router(Arc::new(QuestionSyncService::new(
        Arc::new(store),
        SyncPolicy::default(),
    )))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
