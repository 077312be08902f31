//! Story content shapes.
//!
//! Two directions:
//!
//! - **Read**: [`OneLiners`] (core stories merged with one-liners) and
//!   [`Stories`] (category → question → item), each item `{answer, visibility}`.
//! - **Write**: [`OneLinersInput`] / [`StoriesInput`], parsed leniently from a
//!   [`JsonPayload`]. Malformed entries are skipped and reported, never fatal.

use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One answer as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub answer: String,
    pub visibility: Visibility,
}

impl ContentItem {
    /// Builds an item from a stored row. Hidden rows surface as `private`.
    pub fn from_row(answer: String, hidden: bool) -> Self {
        Self {
            answer,
            visibility: if hidden {
                Visibility::Private
            } else {
                Visibility::Public
            },
        }
    }
}

/// `question_id → item`, core stories merged with one-liners.
pub type OneLiners = BTreeMap<String, ContentItem>;

/// `category_id → question_id → item`.
pub type Stories = BTreeMap<String, BTreeMap<String, ContentItem>>;

/// A JSON document that may arrive either already parsed or as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPayload(pub Value);

impl JsonPayload {
    /// Parse-if-string normalization.
    ///
    /// Returns `None` for an unparsable string.
    pub fn normalize(self) -> Option<Value> {
        match self.0 {
            Value::String(text) => serde_json::from_str(&text).ok(),
            other => Some(other),
        }
    }

    /// Normalizes and keeps only a JSON object.
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self.normalize()? {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Normalizes and keeps an object or array, the shapes stored in JSON columns.
    pub fn into_document(self) -> Option<Value> {
        match self.normalize()? {
            value @ (Value::Object(_) | Value::Array(_)) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for JsonPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One submitted answer.
///
/// A blank `answer` (empty, whitespace-only or `null`) is an explicit delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerInput {
    pub answer: String,
    pub visibility: Option<Visibility>,
}

impl AnswerInput {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// The trimmed answer, or `None` when it is blank.
    pub fn content(&self) -> Option<&str> {
        let trimmed = self.answer.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Requested `hidden` flag, if the submission carried a visibility.
    pub fn hidden(&self) -> Option<bool> {
        self.visibility.map(|v| v == Visibility::Private)
    }

    /// Parses `{answer, visibility}`.
    ///
    /// - `Ok(None)`: no `answer` key; the question is left untouched.
    /// - `Err(())`: not an object, or `answer` is neither string nor null.
    fn parse(value: &Value) -> Result<Option<Self>, ()> {
        let Value::Object(fields) = value else {
            return Err(());
        };
        let answer = match fields.get("answer") {
            None => return Ok(None),
            Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(_) => return Err(()),
        };
        let visibility = fields
            .get("visibility")
            .and_then(|v| serde_json::from_value::<Visibility>(v.clone()).ok());
        Ok(Some(Self { answer, visibility }))
    }
}

fn parse_answers(
    map: Map<String, Value>,
    path_prefix: &str,
    skipped: &mut Vec<String>,
) -> BTreeMap<String, AnswerInput> {
    let mut answers = BTreeMap::new();
    for (question_id, value) in map {
        match AnswerInput::parse(&value) {
            Ok(Some(answer)) => {
                answers.insert(question_id, answer);
            }
            Ok(None) => {}
            Err(()) => skipped.push(format!("{path_prefix}{question_id}")),
        }
    }
    answers
}

/// Flat `question_id → answer` submission for core stories and one-liners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneLinersInput {
    pub answers: BTreeMap<String, AnswerInput>,
    /// Question ids whose entries were malformed and ignored.
    pub skipped: Vec<String>,
}

impl OneLinersInput {
    pub fn from_object(map: Map<String, Value>) -> Self {
        let mut skipped = Vec::new();
        let answers = parse_answers(map, "", &mut skipped);
        Self { answers, skipped }
    }

    pub fn from_payload(payload: JsonPayload) -> Option<Self> {
        payload.into_object().map(Self::from_object)
    }

    pub fn with_answer(mut self, question_id: impl Into<String>, answer: AnswerInput) -> Self {
        self.answers.insert(question_id.into(), answer);
        self
    }
}

/// `category_id → question_id → answer` submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoriesInput {
    pub categories: BTreeMap<String, BTreeMap<String, AnswerInput>>,
    /// `category` or `category.question` paths that were malformed and ignored.
    pub skipped: Vec<String>,
}

impl StoriesInput {
    pub fn from_object(map: Map<String, Value>) -> Self {
        let mut skipped = Vec::new();
        let mut categories = BTreeMap::new();
        for (category_id, questions) in map {
            let Value::Object(questions) = questions else {
                skipped.push(category_id);
                continue;
            };
            let prefix = format!("{category_id}.");
            let answers = parse_answers(questions, &prefix, &mut skipped);
            categories.insert(category_id, answers);
        }
        Self {
            categories,
            skipped,
        }
    }

    pub fn from_payload(payload: JsonPayload) -> Option<Self> {
        payload.into_object().map(Self::from_object)
    }

    pub fn with_answer(
        mut self,
        category_id: impl Into<String>,
        question_id: impl Into<String>,
        answer: AnswerInput,
    ) -> Self {
        self.categories
            .entry(category_id.into())
            .or_default()
            .insert(question_id.into(), answer);
        self
    }
}

/// Content blobs attached to a biography write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentUpdate {
    pub one_liners: Option<OneLinersInput>,
    pub stories: Option<StoriesInput>,
}

impl ContentUpdate {
    pub fn is_empty(&self) -> bool {
        self.one_liners.is_none() && self.stories.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_accepts_string_and_object() {
        let from_string = JsonPayload(json!("{\"q\":{\"answer\":\"a\"}}")).into_object();
        let from_object = JsonPayload(json!({"q": {"answer": "a"}})).into_object();
        assert_eq!(from_string, from_object);
        assert!(from_string.is_some());
    }

    #[test]
    fn test_payload_rejects_garbage() {
        assert!(JsonPayload(json!("not json")).into_object().is_none());
        assert!(JsonPayload(json!([1, 2])).into_object().is_none());
        assert!(JsonPayload(json!(42)).into_document().is_none());
        assert!(JsonPayload(json!("[\"tag\"]")).into_document().is_some());
    }

    #[test]
    fn test_one_liners_lenient_parse() {
        let input = OneLinersInput::from_object(
            json!({
                "good": {"answer": " hi ", "visibility": "private"},
                "cleared": {"answer": null},
                "untouched": {"visibility": "public"},
                "bad_shape": "oops",
                "bad_answer": {"answer": 3}
            })
            .as_object()
            .cloned()
            .unwrap(),
        );

        assert_eq!(input.answers.len(), 2);
        assert_eq!(input.answers["good"].content(), Some("hi"));
        assert_eq!(input.answers["good"].hidden(), Some(true));
        assert_eq!(input.answers["cleared"].content(), None);
        assert_eq!(input.skipped, vec!["bad_answer".to_string(), "bad_shape".to_string()]);
    }

    #[test]
    fn test_stories_skip_non_object_category() {
        let input = StoriesInput::from_object(
            json!({
                "growth": {"first_outdoor": {"answer": "x"}},
                "dreams": "nope"
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        assert_eq!(input.categories.len(), 1);
        assert_eq!(input.skipped, vec!["dreams".to_string()]);
    }

    #[test]
    fn test_hidden_row_reads_as_private() {
        assert_eq!(ContentItem::from_row("a".into(), true).visibility, Visibility::Private);
        assert_eq!(ContentItem::from_row("a".into(), false).visibility, Visibility::Public);
    }
}
