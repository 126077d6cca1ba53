//! Two-phase response validation.
//!
//! Raw model text is parsed into an untyped [`serde_json::Value`], walked
//! against the declarative [`Shape`] of the requested result type, and only
//! then deserialized into that type. Nothing reaches a caller without having
//! passed the shape check; there is no coercion and no partial result.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::types::{
    GeneratedStoriesResult, GeneratedTasksResult, GuidanceResult, RefinedIdeasResult,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Malformed,
    ShapeMismatch,
}

impl ValidationErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationErrorKind::Malformed => "malformed",
            ValidationErrorKind::ShapeMismatch => "shape_mismatch",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model answered, but the answer is unusable.
///
/// Both variants keep the offending text in `raw` for logs and diagnosis.
/// `Display` never includes it.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("response is not valid JSON: {source}")]
    Malformed {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response has wrong shape at {path}: expected {expected}, found {actual}")]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
        raw: String,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::Malformed { .. } => ValidationErrorKind::Malformed,
            ValidationError::ShapeMismatch { .. } => ValidationErrorKind::ShapeMismatch,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            ValidationError::Malformed { raw, .. } | ValidationError::ShapeMismatch { raw, .. } => {
                raw
            }
        }
    }

    /// JSON path of the first mismatch; `None` for malformed input.
    pub fn path(&self) -> Option<&str> {
        match self {
            ValidationError::ShapeMismatch { path, .. } => Some(path),
            ValidationError::Malformed { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Structural contract a parsed response must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    String,
    NonEmptyString,
    Array(Box<Shape>),
    Object(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

impl Field {
    pub fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: true,
        }
    }

    /// May be absent or `null`.
    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub path: String,
    pub expected: &'static str,
    pub actual: &'static str,
}

impl Shape {
    pub fn array(element: Shape) -> Self {
        Shape::Array(Box::new(element))
    }

    pub fn expected(&self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::NonEmptyString => "non-empty string",
            Shape::Array(_) => "array",
            Shape::Object(_) => "object",
        }
    }

    /// Check `value` from the document root; paths start at `$`.
    pub fn check(&self, value: &Value) -> Result<(), Mismatch> {
        self.check_at(value, "$")
    }

    fn check_at(&self, value: &Value, path: &str) -> Result<(), Mismatch> {
        let mismatch = || Mismatch {
            path: path.to_string(),
            expected: self.expected(),
            actual: kind_of(value),
        };

        match (self, value) {
            (Shape::String, Value::String(_)) => Ok(()),
            (Shape::NonEmptyString, Value::String(s)) if !s.trim().is_empty() => Ok(()),
            (Shape::Array(element), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    element.check_at(item, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            (Shape::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match map.get(field.name) {
                        None if field.required => {
                            return Err(Mismatch {
                                path: field_path,
                                expected: field.shape.expected(),
                                actual: "missing",
                            });
                        }
                        None => {}
                        Some(Value::Null) if !field.required => {}
                        Some(v) => field.shape.check_at(v, &field_path)?,
                    }
                }
                Ok(())
            }
            _ => Err(mismatch()),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(s) if s.trim().is_empty() => "empty string",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// A result type with a fixed response shape.
pub trait Contract: DeserializeOwned {
    fn shape() -> &'static Shape;
}

fn idea_shape() -> Shape {
    Shape::Object(vec![
        Field::required("title", Shape::String),
        Field::required("description", Shape::String),
        Field::required("tags", Shape::array(Shape::String)),
    ])
}

impl Contract for RefinedIdeasResult {
    fn shape() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::Object(vec![Field::required("ideas", Shape::array(idea_shape()))])
        })
    }
}

impl Contract for GeneratedTasksResult {
    fn shape() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::Object(vec![Field::required(
                "tasks",
                Shape::array(Shape::Object(vec![
                    Field::required("description", Shape::NonEmptyString),
                    Field::optional("rationale", Shape::String),
                ])),
            )])
        })
    }
}

impl Contract for GuidanceResult {
    fn shape() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::Object(vec![
                Field::required(
                    "steps",
                    Shape::array(Shape::Object(vec![
                        Field::required("step", Shape::String),
                        Field::required("rationale", Shape::String),
                    ])),
                ),
                Field::optional(
                    "codeExamples",
                    Shape::array(Shape::Object(vec![
                        Field::required("title", Shape::String),
                        Field::required("language", Shape::String),
                        Field::required("code", Shape::String),
                        Field::optional("explanation", Shape::String),
                    ])),
                ),
                Field::optional("summary", Shape::String),
            ])
        })
    }
}

impl Contract for GeneratedStoriesResult {
    fn shape() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::Object(vec![Field::required(
                "stories",
                Shape::array(Shape::Object(vec![
                    Field::required("title", Shape::NonEmptyString),
                    Field::required("asA", Shape::NonEmptyString),
                    Field::required("iWantTo", Shape::NonEmptyString),
                    Field::required("soThat", Shape::NonEmptyString),
                    Field::optional("rationale", Shape::String),
                ])),
            )])
        })
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse `raw` and validate it against `T`'s shape. All or nothing.
pub fn validate_and_parse<T: Contract>(raw: &str) -> Result<T, ValidationError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| ValidationError::Malformed {
        raw: raw.to_string(),
        source,
    })?;

    T::shape()
        .check(&value)
        .map_err(|m| ValidationError::ShapeMismatch {
            path: m.path,
            expected: m.expected,
            actual: m.actual,
            raw: raw.to_string(),
        })?;

    serde_json::from_value(value).map_err(|_| ValidationError::ShapeMismatch {
        path: "$".to_string(),
        expected: T::shape().expected(),
        actual: "incompatible value",
        raw: raw.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CodeExample, GeneratedTask, RefinedIdea};

    fn mismatch<T: Contract + fmt::Debug>(raw: &str) -> (String, &'static str, &'static str) {
        match validate_and_parse::<T>(raw).unwrap_err() {
            ValidationError::ShapeMismatch {
                path,
                expected,
                actual,
                ..
            } => (path, expected, actual),
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn well_formed_ideas_parse() {
        let raw = r#"{"ideas":[{"title":"Todo","description":"A list","tags":["Web","Beginner"]}]}"#;
        let parsed: RefinedIdeasResult = validate_and_parse(raw).unwrap();
        assert_eq!(
            parsed.ideas,
            vec![RefinedIdea {
                title: "Todo".into(),
                description: "A list".into(),
                tags: vec!["Web".into(), "Beginner".into()],
            }]
        );
    }

    #[test]
    fn well_formed_tasks_parse_with_and_without_rationale() {
        let raw = r#"{"tasks":[{"description":"Create DB schema","rationale":"storage"},{"description":"Add form","rationale":null},{"description":"Wire API"}]}"#;
        let parsed: GeneratedTasksResult = validate_and_parse(raw).unwrap();
        assert_eq!(parsed.tasks.len(), 3);
        assert_eq!(
            parsed.tasks[0],
            GeneratedTask {
                description: "Create DB schema".into(),
                rationale: Some("storage".into()),
            }
        );
        assert_eq!(parsed.tasks[1].rationale, None);
        assert_eq!(parsed.tasks[2].rationale, None);
    }

    #[test]
    fn guidance_without_code_examples_is_valid() {
        let raw = r#"{"steps":[{"step":"Create the table","rationale":"Tasks need storage"}],"summary":"Done"}"#;
        let parsed: GuidanceResult = validate_and_parse(raw).unwrap();
        assert_eq!(parsed.steps.len(), 1);
        assert!(parsed.code_examples.is_none());
        assert_eq!(parsed.summary.as_deref(), Some("Done"));
    }

    #[test]
    fn stories_parse_with_camel_case_fields() {
        let raw = r#"{"stories":[{"title":"Sign up","asA":"visitor","iWantTo":"register","soThat":"I can log in"}]}"#;
        let parsed: GeneratedStoriesResult = validate_and_parse(raw).unwrap();
        assert_eq!(parsed.stories[0].as_a, "visitor");
        assert_eq!(parsed.stories[0].so_that, "I can log in");
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let raw = r#"{"ideas":[{"title":"T","description":"D","tags":[],"score":9}],"model":"x"}"#;
        let parsed: RefinedIdeasResult = validate_and_parse(raw).unwrap();
        assert_eq!(parsed.ideas[0].title, "T");
    }

    #[test]
    fn prose_is_malformed() {
        let err = validate_and_parse::<RefinedIdeasResult>("sorry, I cannot help").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::Malformed);
        assert_eq!(err.raw(), "sorry, I cannot help");
        assert!(err.path().is_none());
    }

    #[test]
    fn empty_text_is_malformed() {
        let err = validate_and_parse::<GeneratedTasksResult>("").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::Malformed);
    }

    #[test]
    fn missing_required_field_reports_path() {
        let (path, expected, actual) =
            mismatch::<GeneratedTasksResult>(r#"{"tasks":[{"rationale":"x"}]}"#);
        assert_eq!(path, "$.tasks[0].description");
        assert_eq!(expected, "non-empty string");
        assert_eq!(actual, "missing");
    }

    #[test]
    fn empty_task_description_is_rejected() {
        let (path, _, actual) = mismatch::<GeneratedTasksResult>(
            r#"{"tasks":[{"description":"ok"},{"description":""}]}"#,
        );
        assert_eq!(path, "$.tasks[1].description");
        assert_eq!(actual, "empty string");
    }

    #[test]
    fn blank_task_description_is_rejected() {
        let (path, expected, actual) =
            mismatch::<GeneratedTasksResult>(r#"{"tasks":[{"description":"   "}]}"#);
        assert_eq!(path, "$.tasks[0].description");
        assert_eq!(expected, "non-empty string");
        assert_eq!(actual, "empty string");
    }

    #[test]
    fn story_parts_must_not_be_blank() {
        let (path, _, actual) = mismatch::<GeneratedStoriesResult>(
            r#"{"stories":[{"title":"Add","asA":"","iWantTo":"add tasks","soThat":"I remember"}]}"#,
        );
        assert_eq!(path, "$.stories[0].asA");
        assert_eq!(actual, "empty string");

        let (path, _, _) = mismatch::<GeneratedStoriesResult>(
            r#"{"stories":[{"title":" ","asA":"user","iWantTo":"add tasks","soThat":"I remember"}]}"#,
        );
        assert_eq!(path, "$.stories[0].title");
    }

    #[test]
    fn guidance_with_code_examples_parses_fully() {
        let raw = r#"{"steps":[{"step":"Create the table","rationale":"storage"}],"codeExamples":[{"title":"Schema","language":"sql","code":"CREATE TABLE tasks (id uuid);","explanation":"One row per task"}],"summary":"Start with storage"}"#;
        let parsed: GuidanceResult = validate_and_parse(raw).unwrap();
        assert_eq!(
            parsed.code_examples(),
            &[CodeExample {
                title: "Schema".into(),
                language: "sql".into(),
                code: "CREATE TABLE tasks (id uuid);".into(),
                explanation: Some("One row per task".into()),
            }]
        );
        assert_eq!(parsed.steps[0].step, "Create the table");
        assert_eq!(parsed.summary.as_deref(), Some("Start with storage"));
    }

    #[test]
    fn code_example_elements_are_checked() {
        let (path, expected, actual) = mismatch::<GuidanceResult>(
            r#"{"steps":[{"step":"s","rationale":"r"}],"codeExamples":[{"title":"Schema","language":"sql"}]}"#,
        );
        assert_eq!(path, "$.codeExamples[0].code");
        assert_eq!(expected, "string");
        assert_eq!(actual, "missing");
    }

    #[test]
    fn optional_field_of_wrong_kind_is_a_mismatch() {
        let (path, expected, actual) = mismatch::<GeneratedTasksResult>(
            r#"{"tasks":[{"description":"Create DB schema","rationale":5}]}"#,
        );
        assert_eq!(path, "$.tasks[0].rationale");
        assert_eq!(expected, "string");
        assert_eq!(actual, "number");
    }

    #[test]
    fn nested_element_type_is_checked() {
        let (path, expected, actual) = mismatch::<RefinedIdeasResult>(
            r#"{"ideas":[{"title":"T","description":"D","tags":["a", 3]}]}"#,
        );
        assert_eq!(path, "$.ideas[0].tags[1]");
        assert_eq!(expected, "string");
        assert_eq!(actual, "number");
    }

    #[test]
    fn required_null_is_a_mismatch() {
        let (path, _, actual) = mismatch::<GuidanceResult>(
            r#"{"steps":[{"step":"s","rationale":null}]}"#,
        );
        assert_eq!(path, "$.steps[0].rationale");
        assert_eq!(actual, "null");
    }

    #[test]
    fn non_object_root_is_a_mismatch() {
        let (path, expected, actual) = mismatch::<GeneratedTasksResult>("[1,2,3]");
        assert_eq!(path, "$");
        assert_eq!(expected, "object");
        assert_eq!(actual, "array");
    }

    #[test]
    fn wrong_container_type_is_a_mismatch() {
        let (path, expected, actual) =
            mismatch::<GeneratedStoriesResult>(r#"{"stories":"none"}"#);
        assert_eq!(path, "$.stories");
        assert_eq!(expected, "array");
        assert_eq!(actual, "string");
    }

    #[test]
    fn display_never_contains_raw_text() {
        let raw = r#"{"tasks":[{"rationale":"SECRET-RAW-MARKER"}]}"#;
        let err = validate_and_parse::<GeneratedTasksResult>(raw).unwrap_err();
        assert!(!err.to_string().contains("SECRET-RAW-MARKER"));
        assert!(err.raw().contains("SECRET-RAW-MARKER"));
        assert_eq!(err.kind().as_str(), "shape_mismatch");
    }
}
