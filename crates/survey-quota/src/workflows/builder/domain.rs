use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub const TEMP_ID_PREFIX: &str = "temp-";

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Question identity: generated by the editor until the server assigns one.
///
/// Serialized as a plain string. Strings starting with `temp-` deserialize as temporary ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuestionId {
    Temp(String),
    Server(String),
}

impl QuestionId {
    /// Fresh client-side id, unique within the process.
    pub fn temp() -> Self {
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self::Temp(format!(
            "{TEMP_ID_PREFIX}{}-{sequence}",
            Utc::now().timestamp_millis()
        ))
    }

    pub fn server(id: impl Into<String>) -> Self {
        Self::Server(id.into())
    }

    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with(TEMP_ID_PREFIX) {
            Self::Temp(raw)
        } else {
            Self::Server(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Temp(id) | Self::Server(id) => id,
        }
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, Self::Temp(_))
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(raw))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    SingleChoice,
    MultipleChoice,
    Text,
    Textarea,
    Rating,
    Scale,
    Dropdown,
    Date,
    Matrix,
    Ranking,
    YesNo,
    Number,
    Email,
}

impl QuestionType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "Single choice",
            Self::MultipleChoice => "Multiple choice",
            Self::Text => "Short text",
            Self::Textarea => "Long text",
            Self::Rating => "Rating",
            Self::Scale => "Scale",
            Self::Dropdown => "Dropdown",
            Self::Date => "Date",
            Self::Matrix => "Matrix",
            Self::Ranking => "Ranking",
            Self::YesNo => "Yes / No",
            Self::Number => "Number",
            Self::Email => "Email",
        }
    }

    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::Matrix)
    }

    pub const fn takes_options(self) -> bool {
        matches!(
            self,
            Self::SingleChoice | Self::MultipleChoice | Self::Dropdown | Self::Ranking
        )
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let parsed = match normalized.as_str() {
            "single_choice" | "radio" => Self::SingleChoice,
            "multiple_choice" | "checkbox" => Self::MultipleChoice,
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "rating" => Self::Rating,
            "scale" => Self::Scale,
            "dropdown" => Self::Dropdown,
            "date" => Self::Date,
            "matrix" => Self::Matrix,
            "ranking" => Self::Ranking,
            "yes_no" => Self::YesNo,
            "number" => Self::Number,
            "email" => Self::Email,
            _ => return None,
        };
        Some(parsed)
    }
}

/// Survey question draft owned by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuestionId>,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub media_id: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub columns: Vec<String>,
}

impl Question {
    pub fn new(question_type: QuestionType, text: impl Into<String>) -> Self {
        Self {
            question_type,
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether this draft has an id the server already knows about.
    pub fn server_id(&self) -> Option<&str> {
        match &self.id {
            Some(QuestionId::Server(id)) => Some(id),
            _ => None,
        }
    }
}
