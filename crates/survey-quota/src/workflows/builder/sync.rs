//! Applies a [`QuestionDiff`] through a [`QuestionStore`].
//!
//! Deletes, creates, and updates run as three batches; the calls inside a batch run
//! concurrently and the first failure aborts the batch. Nothing is rolled back: after an error
//! the caller re-fetches the persisted list and diffs again. Creates carry the draft's client id
//! as an idempotency key so such a replay does not duplicate questions on stores honouring it.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::diff::{diff, QuestionDiff, QuestionPatch};
use super::domain::{Question, QuestionId};
use super::store::{QuestionStore, StoreError};
use crate::workflows::SurveyId;

/// Client id → server id, built from create results.
pub type IdMap = HashMap<QuestionId, String>;

/// Retry settings for sync runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Attempts per create call; only transient store errors are retried.
    pub max_create_attempts: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            max_create_attempts: 1,
        }
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub survey_id: SurveyId,
    pub questions: Vec<Question>,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("question id {id} appears more than once in the edited list")]
    DuplicateId { id: String },
    #[error("failed to delete question {id}: {source}")]
    Delete { id: String, source: StoreError },
    #[error("failed to create question {key}: {source}")]
    Create { key: String, source: StoreError },
    #[error("failed to update question {id}: {source}")]
    Update { id: String, source: StoreError },
}

impl SyncError {
    /// The store failure behind this error; `None` when the request was refused before any call.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::DuplicateId { .. } => None,
            Self::Delete { source, .. }
            | Self::Create { source, .. }
            | Self::Update { source, .. } => Some(source),
        }
    }
}

/// Sync with the default policy, returning the edited list with server ids filled in.
pub async fn sync<S>(
    survey_id: &SurveyId,
    original: &[Question],
    current: &[Question],
    store: &S,
) -> Result<Vec<Question>, SyncError>
where
    S: QuestionStore + ?Sized,
{
    sync_with_policy(survey_id, original, current, store, SyncPolicy::default())
        .await
        .map(|report| report.questions)
}

pub async fn sync_with_policy<S>(
    survey_id: &SurveyId,
    original: &[Question],
    current: &[Question],
    store: &S,
    policy: SyncPolicy,
) -> Result<SyncReport, SyncError>
where
    S: QuestionStore + ?Sized,
{
    let current = with_client_ids(current);
    reject_duplicate_ids(&current)?;
    let plan = diff(original, &current);
    debug!(
        %survey_id,
        create = plan.to_create.len(),
        update = plan.to_update.len(),
        delete = plan.to_delete.len(),
        "question sync planned"
    );

    let deleted = apply_deletes(survey_id, &plan, store).await?;
    let id_map = apply_creates(survey_id, &plan, store, policy).await?;
    let updated = apply_updates(survey_id, original, &plan, store).await?;

    let created = id_map.len();
    let questions = reconcile_ids(current, &id_map);

    info!(%survey_id, created, updated, deleted, "question sync applied");
    Ok(SyncReport {
        survey_id: survey_id.clone(),
        questions,
        created,
        updated,
        deleted,
    })
}

/// Replace client ids with the server ids recorded in `id_map`, in one pass.
pub fn reconcile_ids(current: Vec<Question>, id_map: &IdMap) -> Vec<Question> {
    current
        .into_iter()
        .map(|mut question| {
            if let Some(server_id) = question.id.as_ref().and_then(|id| id_map.get(id)) {
                question.id = Some(QuestionId::server(server_id.clone()));
            }
            question
        })
        .collect()
}

fn reject_duplicate_ids(current: &[Question]) -> Result<(), SyncError> {
    let mut seen = HashSet::new();
    match current
        .iter()
        .filter_map(|question| question.id.as_ref())
        .find(|id| !seen.insert(*id))
    {
        Some(id) => Err(SyncError::DuplicateId { id: id.to_string() }),
        None => Ok(()),
    }
}

fn with_client_ids(current: &[Question]) -> Vec<Question> {
    current
        .iter()
        .cloned()
        .map(|mut question| {
            if question.id.is_none() {
                question.id = Some(QuestionId::temp());
            }
            question
        })
        .collect()
}

async fn apply_deletes<S>(
    survey_id: &SurveyId,
    plan: &QuestionDiff,
    store: &S,
) -> Result<usize, SyncError>
where
    S: QuestionStore + ?Sized,
{
    let deletes = plan
        .to_delete
        .iter()
        .filter_map(|question| question.id.as_ref())
        .map(|id| async move {
            store
                .delete(survey_id, id.as_str())
                .await
                .map_err(|source| SyncError::Delete {
                    id: id.to_string(),
                    source,
                })
        });

    Ok(try_join_all(deletes).await?.len())
}

async fn apply_creates<S>(
    survey_id: &SurveyId,
    plan: &QuestionDiff,
    store: &S,
    policy: SyncPolicy,
) -> Result<IdMap, SyncError>
where
    S: QuestionStore + ?Sized,
{
    let creates = plan
        .to_create
        .iter()
        .filter_map(|question| question.id.clone().map(|key| (key, question)))
        .map(|(key, question)| create_with_retry(survey_id, key, question, store, policy));

    Ok(try_join_all(creates).await?.into_iter().collect())
}

async fn create_with_retry<S>(
    survey_id: &SurveyId,
    key: QuestionId,
    question: &Question,
    store: &S,
    policy: SyncPolicy,
) -> Result<(QuestionId, String), SyncError>
where
    S: QuestionStore + ?Sized,
{
    let mut draft = question.clone();
    draft.id = None;

    let attempts = policy.max_create_attempts.max(1);
    let mut attempt = 1;
    loop {
        match store.create(survey_id, &draft, key.as_str()).await {
            Ok(created) => return Ok((key, created.id)),
            Err(error) if error.is_transient() && attempt < attempts => {
                warn!(%survey_id, %key, attempt, %error, "retrying question create");
                attempt += 1;
            }
            Err(source) => {
                return Err(SyncError::Create {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }
}

async fn apply_updates<S>(
    survey_id: &SurveyId,
    original: &[Question],
    plan: &QuestionDiff,
    store: &S,
) -> Result<usize, SyncError>
where
    S: QuestionStore + ?Sized,
{
    let original_by_id: HashMap<&QuestionId, &Question> = original
        .iter()
        .filter_map(|question| question.id.as_ref().map(|id| (id, question)))
        .collect();

    let updates = plan
        .to_update
        .iter()
        .filter_map(|question| {
            let id = question.id.as_ref()?;
            let before = original_by_id.get(id)?;
            Some((id, QuestionPatch::between(before, question)))
        })
        .map(|(id, patch)| async move {
            store
                .update(survey_id, id.as_str(), &patch)
                .await
                .map_err(|source| SyncError::Update {
                    id: id.to_string(),
                    source,
                })
        });

    Ok(try_join_all(updates).await?.len())
}
