use super::domain::{QuotaAudience, QuotaScreeningQuestion, ScreeningQuestion};
use super::rebalance::rebalance_in_place;

/// Raised when an edit references a selection or option that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaEditError {
    #[error("screening question {0} is not selected")]
    QuestionNotSelected(String),
    #[error("screening question {0} has no answer options")]
    QuestionWithoutOptions(String),
    #[error("option {option_id} does not belong to screening question {question_id}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },
}

impl QuotaAudience {
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Select the question if it is not selected yet, otherwise drop it from the selection.
    ///
    /// Newly selected questions start with every option target at zero. Returns whether the
    /// question is selected after the toggle.
    pub fn toggle_screening_question(&mut self, question: &ScreeningQuestion) -> bool {
        if let Some(position) = self
            .screening_questions
            .iter()
            .position(|entry| entry.question_id == question.id)
        {
            self.screening_questions.remove(position);
            return false;
        }

        self.screening_questions
            .push(QuotaScreeningQuestion::from_catalog(question));
        true
    }

    /// Store a new total and rebalance every selected question against it.
    pub fn set_total_target(&mut self, total_target: Option<u32>) {
        self.total_target = total_target;
        let Some(total) = total_target else {
            return;
        };

        for entry in &mut self.screening_questions {
            if let Some(options) = entry.options.as_mut() {
                rebalance_in_place(options, total, None);
            }
        }
    }

    /// Record an operator edit of one option target, then rebalance a different option.
    pub fn set_option_target(
        &mut self,
        question_id: &str,
        option_id: &str,
        target: u32,
    ) -> Result<(), QuotaEditError> {
        let total = self.total_target;
        let entry = self
            .screening_questions
            .iter_mut()
            .find(|entry| entry.question_id == question_id)
            .ok_or_else(|| QuotaEditError::QuestionNotSelected(question_id.to_string()))?;

        let options = entry
            .options
            .as_mut()
            .ok_or_else(|| QuotaEditError::QuestionWithoutOptions(question_id.to_string()))?;

        let option = options
            .iter_mut()
            .find(|option| option.option_id == option_id)
            .ok_or_else(|| QuotaEditError::UnknownOption {
                question_id: question_id.to_string(),
                option_id: option_id.to_string(),
            })?;
        option.target = target;

        if let Some(total) = total {
            rebalance_in_place(options, total, Some(option_id));
        }

        Ok(())
    }
}
