use std::collections::HashMap;

use super::domain::{QuotaAudience, ScreeningQuestion};

/// User-correctable problems with an enabled quota configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaValidationError {
    #[error("Total target must be greater than 0")]
    TotalTargetNotPositive,
    #[error("Select at least 1 screening question")]
    NoScreeningQuestions,
    #[error("Option targets for \"{question}\" must add up to {expected} (currently {actual})")]
    OptionSumMismatch {
        question: String,
        expected: u32,
        actual: u64,
    },
}

/// Check an enabled quota for completeness against the currently loaded catalog.
///
/// Selections that reference questions missing from `catalog` are skipped; they are stale after
/// a filter change and get cleared by the filter transition.
pub fn validate(
    quota: &QuotaAudience,
    catalog: &[ScreeningQuestion],
) -> Option<QuotaValidationError> {
    if !quota.enabled {
        return None;
    }

    let total = match quota.total_target {
        Some(total) if total > 0 => total,
        _ => return Some(QuotaValidationError::TotalTargetNotPositive),
    };

    if quota.screening_questions.is_empty() {
        return Some(QuotaValidationError::NoScreeningQuestions);
    }

    let by_id: HashMap<&str, &ScreeningQuestion> = catalog
        .iter()
        .map(|question| (question.id.as_str(), question))
        .collect();

    quota.screening_questions.iter().find_map(|entry| {
        let question = by_id.get(entry.question_id.as_str())?;
        if !question.has_options() {
            return None;
        }

        let actual = entry.option_sum();
        (actual != u64::from(total)).then(|| QuotaValidationError::OptionSumMismatch {
            question: question.text.clone(),
            expected: total,
            actual,
        })
    })
}
