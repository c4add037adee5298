// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Placeholder substitution

use regex::{NoExpand, Regex};

use crate::error::Result;

/// Ordered list of `(placeholder, value)` pairs applied by [`render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    pairs: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair. Placeholders are matched literally, eg. `${PROJECT_NAME}`.
    pub fn with(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((placeholder.into(), value.into()));
        self
    }

    /// Build the `${NAME}` placeholder for a template parameter
    pub fn with_param(self, name: &str, value: impl Into<String>) -> Self {
        self.with(format!("${{{name}}}"), value)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Escape a placeholder so it can be used as a match pattern.
///
/// `$` and `{` (and every other metacharacter) lose their pattern meaning, so
/// `${PROJECT_NAME}` only ever matches that exact text.
pub fn create_key(placeholder: &str) -> String {
    regex::escape(placeholder)
}

/// Substitute every pair, in order, over `template`.
///
/// Each pair is a single pass over the current text. Placeholders without a
/// value stay in the output verbatim.
pub fn render(template: &str, substitutions: &Substitutions) -> Result<Vec<u8>> {
    let mut content = template.to_string();
    for (placeholder, value) in substitutions.iter() {
        let pattern = Regex::new(&create_key(placeholder))?;
        content = pattern.replace_all(&content, NoExpand(value)).into_owned();
    }
    Ok(content.into_bytes())
}
