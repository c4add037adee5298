// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource name normalization and validation

use url::Url;

use crate::error::{LauncherError, Result};

pub const PROJECT_NAME_VALIDATION_MESSAGE: &str = "projectName should consist of only alphanumeric characters, '-' and '_'. \
     It should start with alphabetic and end with alphanumeric characters.";

/// Prefix added to names that would otherwise start with a digit
const DIGIT_PREFIX: char = 'n';

/// Convert arbitrary text into a name accepted by the cluster for namespaces,
/// secrets and most other objects.
///
/// The result is lower case, starts with a letter, never holds two separators in
/// a row and never ends with one. Degenerate input (only separators) gives an
/// empty string; callers must check before using it.
pub fn to_kubernetes_name(text: &str, allow_dots: bool) -> String {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let last = chars.len().saturating_sub(1);

    let mut name = String::with_capacity(chars.len() + 1);
    let mut started = false;
    let mut last_ch = ' ';

    for (i, &c) in chars.iter().enumerate() {
        let mut ch = c;
        let digit = ch.is_ascii_digit();
        if digit && name.is_empty() {
            name.push(DIGIT_PREFIX);
        }
        if !ch.is_ascii_lowercase() && !digit {
            ch = match ch {
                '/' | '.' => '.',
                _ => '-',
            };
            if !allow_dots && ch == '.' {
                ch = '-';
            }
            if !started || is_separator(last_ch) || i == last {
                continue;
            }
        }
        name.push(ch);
        started = true;
        last_ch = ch;
    }

    // A run of separators right before the end leaves one behind
    while name.ends_with(is_separator) {
        name.pop();
    }
    name
}

fn is_separator(ch: char) -> bool {
    ch == '-' || ch == '.'
}

/// Check a user supplied project name before it gets normalized.
///
/// Accepts `^[a-zA-Z](?!.*--)(?!.*__)[a-zA-Z0-9-_]{2,38}[a-zA-Z0-9]$`.
pub fn validate_project_name(name: &str) -> Result<()> {
    let chars: Vec<char> = name.chars().collect();
    let valid = (4..=40).contains(&chars.len())
        && chars[0].is_ascii_alphabetic()
        && chars[chars.len() - 1].is_ascii_alphanumeric()
        && chars
            .iter()
            .all(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        && !name.contains("--")
        && !name.contains("__");
    if valid {
        Ok(())
    } else {
        Err(LauncherError::InvalidArgument(format!(
            "{PROJECT_NAME_VALIDATION_MESSAGE} Got '{name}'"
        )))
    }
}

/// Whether a name can be used verbatim for a namespace or object
pub fn is_valid_resource_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 63 && to_kubernetes_name(name, false) == name
}

/// Extract the repository name from a clone URL, eg. `https://github.com/foo/bar.git` gives `bar`
pub fn repository_name(url: &Url) -> Option<String> {
    let path = url.path().trim_end_matches('/');
    let segment = path.rsplit('/').next()?;
    let name = segment.strip_suffix(".git").unwrap_or(segment);
    (!name.is_empty()).then(|| name.to_string())
}
