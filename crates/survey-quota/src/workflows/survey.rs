use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the survey that owns a quota configuration and question list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(pub String);

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurveyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
