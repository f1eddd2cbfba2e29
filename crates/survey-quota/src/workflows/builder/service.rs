use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::diff::{diff, QuestionDiff};
use super::domain::Question;
use super::store::QuestionStore;
use super::sync::{sync_with_policy, SyncError, SyncPolicy, SyncReport};
use crate::workflows::SurveyId;

/// Persisted and edited question lists submitted by the builder on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSyncRequest {
    #[serde(default)]
    pub original: Vec<Question>,
    #[serde(default)]
    pub current: Vec<Question>,
}

/// Service wrapping the differ and syncer around a question store.
pub struct QuestionSyncService<S> {
    store: Arc<S>,
    policy: SyncPolicy,
}

impl<S> QuestionSyncService<S>
where
    S: QuestionStore + 'static,
{
    pub fn new(store: Arc<S>, policy: SyncPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn plan(&self, request: &QuestionSyncRequest) -> QuestionDiff {
        diff(&request.original, &request.current)
    }

    pub async fn sync(
        &self,
        survey_id: &SurveyId,
        request: &QuestionSyncRequest,
    ) -> Result<SyncReport, SyncError> {
        sync_with_policy(
            survey_id,
            &request.original,
            &request.current,
            self.store.as_ref(),
            self.policy,
        )
        .await
    }
}
