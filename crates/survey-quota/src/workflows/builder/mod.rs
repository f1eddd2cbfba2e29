//! Survey builder question drafts and their synchronization with the question store.

mod diff;
pub mod domain;
mod import;
pub mod router;
pub mod service;
pub mod store;
mod sync;

#[cfg(test)]
mod tests;

pub use diff::{diff, QuestionDiff, QuestionPatch};
pub use domain::{Question, QuestionId, QuestionType, TEMP_ID_PREFIX};
pub use import::{QuestionCsvImporter, QuestionImportError};
pub use router::question_router;
pub use service::{QuestionSyncRequest, QuestionSyncService};
pub use store::{CreatedQuestion, QuestionStore, StoreError};
pub use sync::{reconcile_ids, sync, sync_with_policy, IdMap, SyncError, SyncPolicy, SyncReport};
