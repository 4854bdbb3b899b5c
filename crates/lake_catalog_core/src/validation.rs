use std::fmt;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub problem: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Every problem found while validating one inbound payload.
///
/// Validation keeps going after the first bad field so callers see the full
/// list in a single error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                field: field.into(),
                problem: problem.into(),
            }],
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Default)]
pub(crate) struct IssueCollector {
    issues: Vec<FieldIssue>,
}

impl IssueCollector {
    pub(crate) fn push(&mut self, field: &str, problem: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            problem: problem.into(),
        });
    }

    pub(crate) fn required_string(
        &mut self,
        object: &Map<String, Value>,
        field: &str,
    ) -> Option<String> {
        match object.get(field) {
            None | Some(Value::Null) => {
                self.push(field, "is required");
                None
            }
            Some(Value::String(text)) if text.trim().is_empty() => {
                self.push(field, "must not be empty");
                None
            }
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                self.push(field, "must be a string");
                None
            }
        }
    }

    pub(crate) fn required_string_list(
        &mut self,
        object: &Map<String, Value>,
        field: &str,
    ) -> Option<Vec<String>> {
        let values = match object.get(field) {
            None | Some(Value::Null) => {
                self.push(field, "is required");
                return None;
            }
            Some(Value::Array(values)) => values,
            Some(_) => {
                self.push(field, "must be a list of strings");
                return None;
            }
        };

        if values.is_empty() {
            self.push(field, "must not be empty");
            return None;
        }

        let mut strings = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            match value.as_str() {
                Some(text) if !text.trim().is_empty() => strings.push(text.to_string()),
                Some(_) => {
                    self.push(field, format!("entry {index} must not be empty"));
                    return None;
                }
                None => {
                    self.push(field, format!("entry {index} must be a string"));
                    return None;
                }
            }
        }
        Some(strings)
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}
