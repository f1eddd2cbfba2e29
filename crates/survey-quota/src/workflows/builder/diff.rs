use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{Question, QuestionId, QuestionType};

/// Operations needed to turn the persisted question list into the edited one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDiff {
    pub to_create: Vec<Question>,
    pub to_update: Vec<Question>,
    pub to_delete: Vec<Question>,
}

impl QuestionDiff {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

/// Compare the persisted list against the edited list by identity, then field by field.
pub fn diff(original: &[Question], current: &[Question]) -> QuestionDiff {
    let original_by_id: HashMap<&QuestionId, &Question> = original
        .iter()
        .filter_map(|question| question.id.as_ref().map(|id| (id, question)))
        .collect();
    let current_ids: HashSet<&QuestionId> = current
        .iter()
        .filter_map(|question| question.id.as_ref())
        .collect();

    let to_delete = original
        .iter()
        .filter(|question| {
            question
                .id
                .as_ref()
                .is_some_and(|id| !current_ids.contains(id))
        })
        .cloned()
        .collect();

    let mut to_create = Vec::new();
    let mut to_update = Vec::new();
    for question in current {
        let persisted = question
            .id
            .as_ref()
            .and_then(|id| original_by_id.get(id).copied());

        match persisted {
            None => to_create.push(question.clone()),
            Some(before) if !QuestionPatch::between(before, question).is_empty() => {
                to_update.push(question.clone())
            }
            Some(_) => {}
        }
    }

    QuestionDiff {
        to_create,
        to_update,
        to_delete,
    }
}

/// Partial update sent for an existing question. Absent fields are left unchanged.
///
/// `media_id` distinguishes "unchanged" (`None`) from "clear" (`Some(None)`, sent as `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_field"
    )]
    pub category_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_field"
    )]
    pub media_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

fn present_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
    (before != after).then(|| after.clone())
}

impl QuestionPatch {
    pub fn between(before: &Question, after: &Question) -> Self {
        Self {
            question_type: changed(&before.question_type, &after.question_type),
            text: changed(&before.text, &after.text),
            description: changed(&before.description, &after.description),
            required: changed(&before.required, &after.required),
            category_id: changed(&before.category_id, &after.category_id),
            order_index: changed(&before.order_index, &after.order_index),
            media_id: changed(&before.media_id, &after.media_id),
            options: changed(&before.options, &after.options),
            rows: changed(&before.rows, &after.rows),
            columns: changed(&before.columns, &after.columns),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this patch to a stored question.
    pub fn apply_to(&self, question: &mut Question) {
        if let Some(question_type) = self.question_type {
            question.question_type = question_type;
        }
        if let Some(text) = &self.text {
            question.text = text.clone();
        }
        if let Some(description) = &self.description {
            question.description = description.clone();
        }
        if let Some(required) = self.required {
            question.required = required;
        }
        if let Some(category_id) = &self.category_id {
            question.category_id = category_id.clone();
        }
        if let Some(order_index) = self.order_index {
            question.order_index = order_index;
        }
        if let Some(media_id) = &self.media_id {
            question.media_id = media_id.clone();
        }
        if let Some(options) = &self.options {
            question.options = options.clone();
        }
        if let Some(rows) = &self.rows {
            question.rows = rows.clone();
        }
        if let Some(columns) = &self.columns {
            question.columns = columns.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn persisted(id: &str) -> Question {
        Question::new(QuestionType::SingleChoice, format!("Question {id}"))
            .with_id(QuestionId::server(id))
    }

    fn ids(questions: &[Question]) -> Vec<&str> {
        questions
            .iter()
            .map(|question| question.id.as_ref().map(QuestionId::as_str).unwrap_or(""))
            .collect()
    }

    #[test]
    fn classifies_creates_updates_and_deletes() {
        let original = vec![persisted("a"), persisted("b")];
        let mut edited_a = persisted("a");
        edited_a.text = "x".to_string();
        let current = vec![edited_a, persisted("c")];

        let plan = diff(&original, &current);

        assert_eq!(ids(&plan.to_delete), vec!["b"]);
        assert_eq!(ids(&plan.to_create), vec!["c"]);
        assert_eq!(ids(&plan.to_update), vec!["a"]);
        assert_eq!(plan.to_update[0].text, "x");
        assert_eq!(plan.operation_count(), 3);
    }

    #[test]
    fn unchanged_lists_yield_empty_plans_every_time() {
        let original = vec![persisted("a"), persisted("b")];
        let current = original.clone();
        assert!(diff(&original, &current).is_empty());
        assert!(diff(&original, &current).is_empty());
    }

    #[test]
    fn drafts_without_ids_or_with_temp_ids_are_created() {
        let original = vec![persisted("a")];
        let current = vec![
            persisted("a"),
            Question::new(QuestionType::Text, "No id yet"),
            Question::new(QuestionType::Email, "Temp").with_id(QuestionId::temp()),
        ];

        let plan = diff(&original, &current);
        assert_eq!(plan.to_create.len(), 2);
        assert!(plan.to_update.is_empty());
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn reorder_media_and_matrix_edits_are_updates() {
        let mut base = persisted("m");
        base.question_type = QuestionType::Matrix;
        base.rows = vec!["Speed".to_string()];
        base.media_id = Some("img-1".to_string());
        let original = vec![base.clone()];

        let mut reordered = base.clone();
        reordered.order_index = 3;
        assert_eq!(diff(&original, &[reordered]).to_update.len(), 1);

        let mut cleared = base.clone();
        cleared.media_id = None;
        assert_eq!(diff(&original, &[cleared]).to_update.len(), 1);

        let mut more_columns = base.clone();
        more_columns.columns.push("Good".to_string());
        assert_eq!(diff(&original, &[more_columns]).to_update.len(), 1);
    }

    #[test]
    fn patch_sends_null_when_media_is_cleared() {
        let mut before = persisted("a");
        before.media_id = Some("img-1".to_string());
        let mut after = before.clone();
        after.media_id = None;
        after.required = true;

        let patch = QuestionPatch::between(&before, &after);
        assert_eq!(
            serde_json::to_value(&patch).expect("patch serializes"),
            json!({ "required": true, "media_id": null })
        );

        let parsed: QuestionPatch =
            serde_json::from_value(json!({ "media_id": null })).expect("patch parses");
        assert_eq!(parsed.media_id, Some(None));
        let untouched: QuestionPatch = serde_json::from_value(json!({})).expect("patch parses");
        assert_eq!(untouched.media_id, None);
    }

    #[test]
    fn applying_a_patch_reproduces_the_edit() {
        let before = persisted("a");
        let mut after = before.clone();
        after.text = "Edited".to_string();
        after.options = vec!["Yes".to_string(), "No".to_string()];
        after.category_id = Some("cat-1".to_string());

        let patch = QuestionPatch::between(&before, &after);
        let mut stored = before.clone();
        patch.apply_to(&mut stored);
        assert_eq!(stored, after);
    }
}
