use serde::{Deserialize, Serialize};

/// Where a screening-question catalog slice is sourced from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionSource {
    #[default]
    System,
    Vendor,
}

impl QuestionSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Vendor => "Vendor",
        }
    }
}

/// Answer option offered by a catalog screening question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_option_id: Option<String>,
}

/// Catalog entry; never mutated by the quota engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
}

fn active_by_default() -> bool {
    true
}

impl ScreeningQuestion {
    pub fn has_options(&self) -> bool {
        self.options
            .as_ref()
            .map(|options| !options.is_empty())
            .unwrap_or(false)
    }
}

/// Target respondent count for a single answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaOptionTarget {
    pub option_id: String,
    pub target: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_option_id: Option<String>,
}

impl QuotaOptionTarget {
    pub fn new(option_id: impl Into<String>, target: u32) -> Self {
        Self {
            option_id: option_id.into(),
            target,
            vendor_option_id: None,
        }
    }
}

/// Screening question selected for the quota, with per-option targets when it has options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaScreeningQuestion {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuotaOptionTarget>>,
}

impl QuotaScreeningQuestion {
    /// Seed a selection from the catalog entry with every option target at zero.
    pub fn from_catalog(question: &ScreeningQuestion) -> Self {
        let options = question.options.as_ref().map(|options| {
            options
                .iter()
                .map(|option| QuotaOptionTarget {
                    option_id: option.id.clone(),
                    target: 0,
                    vendor_option_id: option.vendor_option_id.clone(),
                })
                .collect()
        });

        Self {
            question_id: question.id.clone(),
            vendor_question_id: question.vendor_question_id.clone(),
            options,
        }
    }

    pub fn option_sum(&self) -> u64 {
        self.options
            .as_deref()
            .map(|options| options.iter().map(|option| u64::from(option.target)).sum())
            .unwrap_or(0)
    }
}

/// Filter context scoping which catalog slice the selection refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaFilters {
    #[serde(default)]
    pub source: QuestionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub country_code: String,
    pub language: String,
}

impl Default for QuotaFilters {
    fn default() -> Self {
        Self {
            source: QuestionSource::System,
            vendor_id: None,
            country_code: "US".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Session-scoped quota form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaAudience {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub total_target: Option<u32>,
    #[serde(default)]
    pub screening_questions: Vec<QuotaScreeningQuestion>,
    #[serde(default)]
    pub filters: QuotaFilters,
}

impl QuotaAudience {
    pub fn selection(&self, question_id: &str) -> Option<&QuotaScreeningQuestion> {
        self.screening_questions
            .iter()
            .find(|entry| entry.question_id == question_id)
    }

    pub fn is_selected(&self, question_id: &str) -> bool {
        self.selection(question_id).is_some()
    }
}
