// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Named template resources

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::templates;
use crate::error::{LauncherError, Result};

const BUILTIN: [(&str, &str); 3] = [
    (templates::S2I_TASK, include_str!("../../templates/s2i-task.yaml")),
    (templates::S2I_TASK_RUN, include_str!("../../templates/s2i-taskrun.yaml")),
    (templates::DEPLOYMENT, include_str!("../../templates/deployment.yaml")),
];

/// Resolves templates by logical name. Files named `<name>.yaml` in the
/// override directory win over the built-in copies.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    override_dir: Option<PathBuf>,
}

impl TemplateStore {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self { override_dir }
    }

    pub fn get(&self, name: &str) -> Result<Cow<'static, str>> {
        if let Some(dir) = &self.override_dir {
            if let Some(content) = read_override(dir, name)? {
                return Ok(Cow::Owned(content));
            }
        }

        BUILTIN
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, body)| Cow::Borrowed(*body))
            .ok_or_else(|| LauncherError::TemplateNotFound(name.to_string()))
    }
}

fn read_override(dir: &Path, name: &str) -> Result<Option<String>> {
    let path = dir.join(format!("{name}.yaml"));
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            debug!("Using template override {}", path.display());
            Ok(Some(content))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
