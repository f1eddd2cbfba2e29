use serde::{Deserialize, Serialize};

use super::domain::{QuotaAudience, QuotaScreeningQuestion};

/// Quota mode as chosen in the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotaKind {
    #[default]
    Count,
    Percentage,
}

/// Persisted quota target. The tag decides which field is present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "quota_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotaTarget {
    Count { target_count: u32 },
    Percentage { target_percentage: f64 },
}

/// Target as typed into a demographic quota row, before it is known to be active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaTargetDraft {
    #[serde(default)]
    pub quota_type: QuotaKind,
    #[serde(default)]
    pub target_count: Option<u32>,
    #[serde(default)]
    pub target_percentage: Option<f64>,
}

impl QuotaTargetDraft {
    pub fn count(target_count: u32) -> Self {
        Self {
            quota_type: QuotaKind::Count,
            target_count: Some(target_count),
            target_percentage: None,
        }
    }

    pub fn percentage(target_percentage: f64) -> Self {
        Self {
            quota_type: QuotaKind::Percentage,
            target_count: None,
            target_percentage: Some(target_percentage),
        }
    }

    /// The persisted target, or `None` when the row is inactive.
    pub fn activate(&self) -> Option<QuotaTarget> {
        match self.quota_type {
            QuotaKind::Count => self
                .target_count
                .filter(|count| *count > 0)
                .map(|target_count| QuotaTarget::Count { target_count }),
            QuotaKind::Percentage => self
                .target_percentage
                .filter(|pct| pct.is_finite() && *pct > 0.0)
                .map(|target_percentage| QuotaTarget::Percentage { target_percentage }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeQuotaDraft {
    #[serde(default)]
    pub row_id: Option<String>,
    pub min_age: u8,
    pub max_age: u8,
    #[serde(flatten)]
    pub target: QuotaTargetDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderQuotaDraft {
    #[serde(default)]
    pub row_id: Option<String>,
    pub gender: String,
    #[serde(flatten)]
    pub target: QuotaTargetDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationQuotaDraft {
    #[serde(default)]
    pub row_id: Option<String>,
    pub location: String,
    #[serde(flatten)]
    pub target: QuotaTargetDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryQuotaDraft {
    #[serde(default)]
    pub row_id: Option<String>,
    pub category_id: String,
    #[serde(flatten)]
    pub target: QuotaTargetDraft,
}

/// Demographic quota rows edited alongside the screening selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicQuotas {
    #[serde(default)]
    pub age: Vec<AgeQuotaDraft>,
    #[serde(default)]
    pub gender: Vec<GenderQuotaDraft>,
    #[serde(default)]
    pub location: Vec<LocationQuotaDraft>,
    #[serde(default)]
    pub category: Vec<CategoryQuotaDraft>,
}

/// Respondent redirect URLs attached to the quota.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSettings {
    #[serde(default)]
    pub completed_url: Option<String>,
    #[serde(default)]
    pub terminated_url: Option<String>,
    #[serde(default)]
    pub quota_full_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeQuota {
    pub min_age: u8,
    pub max_age: u8,
    #[serde(flatten)]
    pub target: QuotaTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderQuota {
    pub gender: String,
    #[serde(flatten)]
    pub target: QuotaTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationQuota {
    pub location: String,
    #[serde(flatten)]
    pub target: QuotaTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryQuota {
    pub category_id: String,
    #[serde(flatten)]
    pub target: QuotaTarget,
}

/// Body of the quota upsert call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaPayload {
    pub total_target: Option<u32>,
    pub completed_url: Option<String>,
    pub terminated_url: Option<String>,
    pub quota_full_url: Option<String>,
    pub is_active: bool,
    pub age_quotas: Vec<AgeQuota>,
    pub gender_quotas: Vec<GenderQuota>,
    pub location_quotas: Vec<LocationQuota>,
    pub category_quotas: Vec<CategoryQuota>,
    pub screening_questions: Vec<QuotaScreeningQuestion>,
}

pub fn build_quota_payload(
    quota: &QuotaAudience,
    settings: &QuotaSettings,
    demographics: &DemographicQuotas,
) -> QuotaPayload {
    QuotaPayload {
        total_target: quota.total_target,
        completed_url: non_blank(&settings.completed_url),
        terminated_url: non_blank(&settings.terminated_url),
        quota_full_url: non_blank(&settings.quota_full_url),
        is_active: quota.enabled,
        age_quotas: demographics
            .age
            .iter()
            .filter_map(|row| {
                row.target.activate().map(|target| AgeQuota {
                    min_age: row.min_age,
                    max_age: row.max_age,
                    target,
                })
            })
            .collect(),
        gender_quotas: demographics
            .gender
            .iter()
            .filter_map(|row| {
                row.target.activate().map(|target| GenderQuota {
                    gender: row.gender.clone(),
                    target,
                })
            })
            .collect(),
        location_quotas: demographics
            .location
            .iter()
            .filter_map(|row| {
                row.target.activate().map(|target| LocationQuota {
                    location: row.location.clone(),
                    target,
                })
            })
            .collect(),
        category_quotas: demographics
            .category
            .iter()
            .filter_map(|row| {
                row.target.activate().map(|target| CategoryQuota {
                    category_id: row.category_id.clone(),
                    target,
                })
            })
            .collect(),
        screening_questions: quota.screening_questions.clone(),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
