//! # Skills Codec
//!
//! Applicant skills are persisted as one comma-delimited string. This module is
//! the only place that converts between that stored form and the list of
//! `{ value, label }` options the frontend consumes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::constant::SKILLS_DELIMITER;

/// A single skill in select-option shape. `value` and `label` always carry the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOption {
    pub value: String,
    pub label: String,
}

impl SkillOption {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: label.clone(),
            label,
        }
    }
}

/// A label that cannot be stored without changing on the way back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillsError {
    #[error("skill label `{0}` contains the delimiter `{delim}`", delim = SKILLS_DELIMITER)]
    ContainsDelimiter(String),
    #[error("skill label {0:?} is blank or has surrounding whitespace")]
    NotTrimmed(String),
}

/// Joins skill labels into the stored string, keeping insertion order.
///
/// Every label must be non-blank, trimmed and free of the delimiter, so that
/// `decode(encode(labels))` gives the labels back unchanged.
pub fn encode<S: AsRef<str>>(labels: &[S]) -> Result<String, SkillsError> {
    let mut checked = Vec::with_capacity(labels.len());
    for label in labels.iter().map(AsRef::as_ref) {
        if label.contains(SKILLS_DELIMITER) {
            return Err(SkillsError::ContainsDelimiter(label.to_string()));
        }
        if label.is_empty() || label.trim() != label {
            return Err(SkillsError::NotTrimmed(label.to_string()));
        }
        checked.push(label);
    }
    Ok(checked.join(SKILLS_DELIMITER))
}

/// Splits a stored skills string into options. Absent or empty input yields an empty list.
pub fn decode(skills: Option<&str>) -> Vec<SkillOption> {
    labels(skills.unwrap_or_default())
        .map(SkillOption::new)
        .collect()
}

/// Exact membership test against a stored skills string.
pub fn contains(skills: &str, label: &str) -> bool {
    labels(skills).any(|skill| skill == label)
}

fn labels(skills: &str) -> impl Iterator<Item = &str> {
    skills
        .split(SKILLS_DELIMITER)
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
}
