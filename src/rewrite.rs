//! Overwrite one quoted attribute (like `group-title`) on the metadata line
use std::borrow::Cow;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::playlist::{is_attribute_char, Entry};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("Invalid attribute name \"{0}\", expected letters, digits, \"-\" or \"_\"")]
    InvalidAttribute(String),
    #[error("Replacement value for \"{attribute}\" may not contain a double quote: {value}")]
    QuotedValue { attribute: String, value: String },
}

/// When the rewrite runs relative to deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStage {
    #[default]
    BeforeDedup,
    AfterDedup,
}

/// Replace the value of the first `attribute="..."` on the metadata line with a fixed value
#[derive(Debug, Clone)]
pub struct FieldRewrite {
    attribute: String,
    value: String,
    pattern: Regex,
}

impl FieldRewrite {
    pub fn new(attribute: &str, value: &str) -> Result<Self, RewriteError> {
        if attribute.is_empty() || !attribute.chars().all(is_attribute_char) {
            return Err(RewriteError::InvalidAttribute(attribute.to_string()));
        }
        if value.contains('"') {
            return Err(RewriteError::QuotedValue {
                attribute: attribute.to_string(),
                value: value.to_string(),
            });
        }

        // the quoted value may not contain quotes, so the match can never run into the next attribute.
        // "lead" makes sure "group-title" does not match inside "tvg-group-title",
        // same boundary as `playlist::attribute_values`
        let pattern = Regex::new(&format!(
            r#"(?P<lead>^|[^A-Za-z0-9_-]){}="[^"]*""#,
            regex::escape(attribute)
        ))
        .map_err(|_| RewriteError::InvalidAttribute(attribute.to_string()))?;

        Ok(Self {
            attribute: attribute.to_string(),
            value: value.to_string(),
            pattern,
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Rewrite the first occurrence only; a line without the attribute is returned unchanged
    pub fn apply_to_line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        self.pattern.replacen(line, 1, |caps: &Captures<'_>| {
            format!("{}{}=\"{}\"", &caps["lead"], self.attribute, self.value)
        })
    }

    /// Returns `true` if the metadata line contained the attribute
    pub fn apply(&self, entry: &mut Entry) -> bool {
        let line = match self.apply_to_line(entry.metadata_line()) {
            Cow::Borrowed(_) => return false,
            Cow::Owned(line) => line,
        };
        entry.set_metadata_line(line);

        true
    }
}
