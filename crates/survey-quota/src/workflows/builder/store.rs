use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::diff::QuestionPatch;
use super::domain::Question;
use crate::workflows::SurveyId;

/// Server response to a question create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedQuestion {
    pub id: String,
}

/// Remote question persistence used by the syncer.
///
/// `create` receives an idempotency key derived from the draft's client id so a store can
/// recognise a replayed create after a partially failed save.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn create(
        &self,
        survey_id: &SurveyId,
        question: &Question,
        idempotency_key: &str,
    ) -> Result<CreatedQuestion, StoreError>;

    async fn update(
        &self,
        survey_id: &SurveyId,
        question_id: &str,
        patch: &QuestionPatch,
    ) -> Result<(), StoreError>;

    async fn delete(&self, survey_id: &SurveyId, question_id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("question {0} not found")]
    NotFound(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("question store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Transport failures may succeed on a retry; rejections will not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
