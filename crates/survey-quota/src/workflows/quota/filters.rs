use serde::{Deserialize, Serialize};

use super::domain::{QuestionSource, QuotaAudience, QuotaFilters};
use super::repository::CatalogError;

/// Parameters for a screening-question catalog fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub source: QuestionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub country_code: String,
    pub language: String,
}

impl QuotaFilters {
    /// Build the catalog query for this filter slice. Vendor sourcing requires a vendor id.
    pub fn catalog_query(&self) -> Result<CatalogQuery, CatalogError> {
        let vendor_id = match self.source {
            QuestionSource::System => None,
            QuestionSource::Vendor => Some(
                self.vendor_id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
                    .ok_or(CatalogError::MissingVendor)?,
            ),
        };

        Ok(CatalogQuery {
            source: self.source,
            vendor_id,
            country_code: self.country_code.clone(),
            language: self.language.clone(),
        })
    }

    fn normalized(mut self) -> Self {
        if self.source == QuestionSource::System {
            self.vendor_id = None;
        }
        self
    }

    fn slice_differs(&self, other: &Self) -> bool {
        self.source != other.source
            || self.vendor_id != other.vendor_id
            || self.country_code != other.country_code
            || self.language != other.language
    }
}

/// Apply a filter change to the quota.
///
/// Selections reference question ids from one catalog slice, so any change to source, vendor,
/// country, or language clears the screening selection. Targets and the enabled flag survive.
pub fn on_filter_change(
    prev: &QuotaFilters,
    next: QuotaFilters,
    mut quota: QuotaAudience,
) -> QuotaAudience {
    let next = next.normalized();
    if prev.clone().normalized().slice_differs(&next) {
        quota.screening_questions.clear();
    }
    quota.filters = next;
    quota
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::quota::domain::QuotaScreeningQuestion;

    fn selected_quota(filters: QuotaFilters) -> QuotaAudience {
        QuotaAudience {
            enabled: true,
            total_target: Some(100),
            screening_questions: vec![QuotaScreeningQuestion {
                question_id: "q-age".to_string(),
                vendor_question_id: None,
                options: None,
            }],
            filters,
        }
    }

    #[test]
    fn unchanged_filters_keep_selection() {
        let filters = QuotaFilters::default();
        let quota = selected_quota(filters.clone());
        let next = on_filter_change(&filters, filters.clone(), quota);
        assert_eq!(next.screening_questions.len(), 1);
    }

    #[test]
    fn country_case_change_clears_selection() {
        let filters = QuotaFilters::default();
        let quota = selected_quota(filters.clone());
        let mut lower = filters.clone();
        lower.country_code = "us".to_string();
        let next = on_filter_change(&filters, lower, quota);
        assert!(next.screening_questions.is_empty());
        assert_eq!(next.filters.country_code, "us");
        assert_eq!(
            next.filters.catalog_query().expect("system query").country_code,
            "us"
        );
    }

    #[test]
    fn any_slice_change_clears_selection_but_keeps_targets() {
        let filters = QuotaFilters::default();
        let changes = [
            QuotaFilters {
                language: "fr".to_string(),
                ..filters.clone()
            },
            QuotaFilters {
                country_code: "CA".to_string(),
                ..filters.clone()
            },
            QuotaFilters {
                source: QuestionSource::Vendor,
                vendor_id: Some("vendor-7".to_string()),
                ..filters.clone()
            },
        ];

        for change in changes {
            let quota = selected_quota(filters.clone());
            let next = on_filter_change(&filters, change.clone(), quota);
            assert!(next.screening_questions.is_empty(), "change {change:?}");
            assert_eq!(next.total_target, Some(100));
            assert!(next.enabled);
            assert_eq!(next.filters, change);
        }
    }

    #[test]
    fn switching_to_system_drops_vendor() {
        let vendor = QuotaFilters {
            source: QuestionSource::Vendor,
            vendor_id: Some("vendor-7".to_string()),
            ..QuotaFilters::default()
        };
        let quota = selected_quota(vendor.clone());
        let next = on_filter_change(
            &vendor,
            QuotaFilters {
                source: QuestionSource::System,
                ..vendor.clone()
            },
            quota,
        );
        assert_eq!(next.filters.vendor_id, None);
        assert!(next.screening_questions.is_empty());
    }

    #[test]
    fn vendor_query_requires_vendor_id() {
        let filters = QuotaFilters {
            source: QuestionSource::Vendor,
            vendor_id: Some("  ".to_string()),
            ..QuotaFilters::default()
        };
        assert!(matches!(
            filters.catalog_query(),
            Err(CatalogError::MissingVendor)
        ));

        let query = QuotaFilters::default()
            .catalog_query()
            .expect("system query");
        assert_eq!(query.source, QuestionSource::System);
        assert_eq!(query.vendor_id, None);
    }
}
