use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use super::template::{Node, SchemaTemplate};
use super::types::AnalysisResult;
use crate::config::ValidationMode;
use crate::{preview, TARGET_SCHEMA};

/// What is wrong at a given path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    MissingText,
    NotText,
    MissingList,
    NotList,
    NotObject,
    /// The normalized value still failed typed deserialization.
    Incompatible(String),
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MissingText => write!(f, "required text is missing"),
            IssueKind::NotText => write!(f, "expected text"),
            IssueKind::MissingList => write!(f, "list is missing"),
            IssueKind::NotList => write!(f, "expected a list"),
            IssueKind::NotObject => write!(f, "expected an object"),
            IssueKind::Incompatible(detail) => write!(f, "incompatible value: {}", detail),
        }
    }
}

/// A problem located at a dotted path such as `market_impact.macro_economy.gdp.impact`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIssue {
    pub path: String,
    pub kind: IssueKind,
}

impl fmt::Display for PathIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            &self.path
        };
        write!(f, "{}: {}", path, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    /// The candidate is not valid JSON.
    ParseError { detail: String, raw_candidate: String },
    /// The candidate parsed but required paths are missing or mistyped.
    SchemaMismatch {
        errors: Vec<PathIssue>,
        warnings: Vec<PathIssue>,
        raw_candidate: String,
    },
}

impl ValidationFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationFailure::ParseError { .. } => "parse-error",
            ValidationFailure::SchemaMismatch { .. } => "schema-mismatch",
        }
    }

    pub fn raw_candidate(&self) -> &str {
        match self {
            ValidationFailure::ParseError { raw_candidate, .. }
            | ValidationFailure::SchemaMismatch { raw_candidate, .. } => raw_candidate,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::ParseError { detail, .. } => {
                write!(f, "parse-error: {}", detail)
            }
            ValidationFailure::SchemaMismatch { errors, .. } => {
                write!(f, "schema-mismatch: {} error(s)", errors.len())?;
                for issue in errors {
                    write!(f, "; {}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// A result that passed validation, plus any tolerated omissions.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub result: AnalysisResult,
    pub warnings: Vec<PathIssue>,
}

#[derive(Default)]
struct Issues {
    errors: Vec<PathIssue>,
    warnings: Vec<PathIssue>,
}

impl Issues {
    fn error(&mut self, path: &str, kind: IssueKind) {
        self.errors.push(PathIssue {
            path: path.to_string(),
            kind,
        });
    }

    fn missing_list(&mut self, path: &str, mode: ValidationMode) {
        let issue = PathIssue {
            path: path.to_string(),
            kind: IssueKind::MissingList,
        };
        match mode {
            ValidationMode::Lenient => self.warnings.push(issue),
            ValidationMode::Strict => self.errors.push(issue),
        }
    }
}

/// Parses `candidate` and checks it against `template`.
///
/// Scalars are strict: every text leaf must be present and a string. Lists
/// are lenient by default: a missing (or null) list becomes an empty one
/// and is reported as a warning. All issues are collected before deciding.
pub fn validate(
    candidate: &str,
    template: &SchemaTemplate,
    mode: ValidationMode,
) -> Result<Validated, ValidationFailure> {
    let parsed: Value = serde_json::from_str(candidate).map_err(|e| {
        warn!(target: TARGET_SCHEMA, "Candidate is not valid JSON: {}. Candidate: {}", e, preview(candidate, 500));
        ValidationFailure::ParseError {
            detail: e.to_string(),
            raw_candidate: candidate.to_string(),
        }
    })?;

    let mut issues = Issues::default();
    let root = match &parsed {
        Value::Object(map) => Some(map),
        _ => {
            issues.error("", IssueKind::NotObject);
            None
        }
    };

    let mut normalized = Map::new();
    for section in template.sections {
        let value = root.and_then(|map| map.get(section.key));
        let checked = walk(&section.node, value, section.key, mode, &mut issues);
        normalized.insert(section.key.to_string(), checked);
    }

    if !issues.errors.is_empty() {
        warn!(
            target: TARGET_SCHEMA,
            "Schema mismatch with {} error(s), first: {}",
            issues.errors.len(),
            issues.errors[0]
        );
        return Err(ValidationFailure::SchemaMismatch {
            errors: issues.errors,
            warnings: issues.warnings,
            raw_candidate: candidate.to_string(),
        });
    }

    for warning in &issues.warnings {
        warn!(target: TARGET_SCHEMA, "Tolerated omission: {}", warning);
    }

    match serde_json::from_value::<AnalysisResult>(Value::Object(normalized)) {
        Ok(result) => Ok(Validated {
            result,
            warnings: issues.warnings,
        }),
        Err(e) => Err(ValidationFailure::SchemaMismatch {
            errors: vec![PathIssue {
                path: String::new(),
                kind: IssueKind::Incompatible(e.to_string()),
            }],
            warnings: issues.warnings,
            raw_candidate: candidate.to_string(),
        }),
    }
}

/// Checks `value` against `node` and returns a copy holding only template
/// fields, with tolerated omissions filled in.
fn walk(
    node: &Node,
    value: Option<&Value>,
    path: &str,
    mode: ValidationMode,
    issues: &mut Issues,
) -> Value {
    match node {
        Node::Object(fields) => {
            let map = match value {
                Some(Value::Object(map)) => Some(map),
                None | Some(Value::Null) => None,
                Some(_) => {
                    issues.error(path, IssueKind::NotObject);
                    None
                }
            };
            let mut out = Map::new();
            for field in fields.iter() {
                let child_path = format!("{}.{}", path, field.key);
                let child = map.and_then(|m| m.get(field.key));
                out.insert(
                    field.key.to_string(),
                    walk(&field.node, child, &child_path, mode, issues),
                );
            }
            Value::Object(out)
        }
        Node::Text(_) => check_text(value, path, issues),
        Node::TextList(_) => match list_items(value, path, mode, issues) {
            Some(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| check_text(Some(item), &format!("{}[{}]", path, i), issues))
                    .collect(),
            ),
            None => Value::Array(Vec::new()),
        },
        Node::RecordList(fields) => match list_items(value, path, mode, issues) {
            Some(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| check_record(item, fields, &format!("{}[{}]", path, i), issues))
                    .collect(),
            ),
            None => Value::Array(Vec::new()),
        },
    }
}

fn check_text(value: Option<&Value>, path: &str, issues: &mut Issues) -> Value {
    match value {
        Some(Value::String(s)) => Value::String(s.clone()),
        None | Some(Value::Null) => {
            issues.error(path, IssueKind::MissingText);
            Value::String(String::new())
        }
        Some(_) => {
            issues.error(path, IssueKind::NotText);
            Value::String(String::new())
        }
    }
}

fn list_items<'a>(
    value: Option<&'a Value>,
    path: &str,
    mode: ValidationMode,
    issues: &mut Issues,
) -> Option<&'a Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Some(items),
        None | Some(Value::Null) => {
            issues.missing_list(path, mode);
            None
        }
        Some(_) => {
            issues.error(path, IssueKind::NotList);
            None
        }
    }
}

fn check_record(
    item: &Value,
    fields: &[(&'static str, &'static str)],
    path: &str,
    issues: &mut Issues,
) -> Value {
    let map = match item {
        Value::Object(map) => Some(map),
        _ => {
            issues.error(path, IssueKind::NotObject);
            None
        }
    };
    let mut out = Map::new();
    for (key, _) in fields {
        let child = map.and_then(|m| m.get(*key));
        out.insert(
            key.to_string(),
            check_text(child, &format!("{}.{}", path, key), issues),
        );
    }
    Value::Object(out)
}
