//! Survey quota reconciliation and question synchronization.
//!
//! The `workflows::quota` module keeps screening-question quotas balanced and validated while an
//! operator edits them, and builds the upsert payload once the configuration is saved. The
//! `workflows::builder` module diffs survey question drafts against the persisted list and
//! applies the minimal set of create/update/delete operations through a [`QuestionStore`].
//!
//! [`QuestionStore`]: workflows::builder::QuestionStore

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
