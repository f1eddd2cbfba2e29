use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{Question, QuestionId, QuestionType};

const LIST_SEPARATOR: char = '|';

#[derive(Debug)]
pub enum QuestionImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownType { line: u64, value: String },
    MissingText { line: u64 },
    OrderOverflow { line: u64 },
}

impl std::fmt::Display for QuestionImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionImportError::Io(err) => write!(f, "failed to read question file: {}", err),
            QuestionImportError::Csv(err) => write!(f, "invalid question CSV: {}", err),
            QuestionImportError::UnknownType { line, value } => {
                write!(f, "line {}: unknown question type '{}'", line, value)
            }
            QuestionImportError::MissingText { line } => {
                write!(f, "line {}: question text is required", line)
            }
            QuestionImportError::OrderOverflow { line } => {
                write!(f, "line {}: order index exceeds {}", line, u32::MAX)
            }
        }
    }
}

impl std::error::Error for QuestionImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuestionImportError::Io(err) => Some(err),
            QuestionImportError::Csv(err) => Some(err),
            QuestionImportError::UnknownType { .. }
            | QuestionImportError::MissingText { .. }
            | QuestionImportError::OrderOverflow { .. } => None,
        }
    }
}

impl From<std::io::Error> for QuestionImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for QuestionImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct QuestionRow {
    #[serde(rename = "type")]
    question_type: String,
    text: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    required: bool,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category_id: Option<String>,
    #[serde(default)]
    options: String,
    #[serde(default)]
    rows: String,
    #[serde(default)]
    columns: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    ))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bulk question import from a CSV export.
pub struct QuestionCsvImporter;

impl QuestionCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        start_order: u32,
    ) -> Result<Vec<Question>, QuestionImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, start_order)
    }

    /// Parse rows into new drafts with fresh client ids and consecutive order indices.
    ///
    /// Expected header: `type,text,description,required,category_id,options,rows,columns`;
    /// only `type` and `text` are mandatory. List cells are `|` separated.
    pub fn from_reader<R: Read>(
        reader: R,
        start_order: u32,
    ) -> Result<Vec<Question>, QuestionImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut questions = Vec::new();

        for (offset, record) in csv_reader.deserialize::<QuestionRow>().enumerate() {
            let row = record?;
            let line = offset as u64 + 2;

            let question_type = QuestionType::from_key(&row.question_type).ok_or_else(|| {
                QuestionImportError::UnknownType {
                    line,
                    value: row.question_type.clone(),
                }
            })?;
            if row.text.trim().is_empty() {
                return Err(QuestionImportError::MissingText { line });
            }

            let order_index = u32::try_from(questions.len())
                .ok()
                .and_then(|offset| start_order.checked_add(offset))
                .ok_or(QuestionImportError::OrderOverflow { line })?;

            let (options, rows, columns) = if question_type.is_matrix() {
                (Vec::new(), split_list(&row.rows), split_list(&row.columns))
            } else if question_type.takes_options() {
                (split_list(&row.options), Vec::new(), Vec::new())
            } else {
                (Vec::new(), Vec::new(), Vec::new())
            };

            questions.push(Question {
                id: Some(QuestionId::temp()),
                question_type,
                text: row.text,
                description: row.description,
                required: row.required,
                category_id: row.category_id,
                order_index,
                media_id: None,
                options,
                rows,
                columns,
            });
        }

        Ok(questions)
    }
}
