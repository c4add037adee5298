// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::Serialize;
use std::fmt;
use url::Url;

use crate::error::{LauncherError, Result};

const CONSOLE_OVERVIEW_URL_PREFIX: &str = "console/project/";
const CONSOLE_OVERVIEW_URL_SUFFIX: &str = "/overview/";

/// A cluster namespace provisioned (or found) for a launch.
///
/// Two projects are equal when their names are equal; the resource list is
/// bookkeeping for the current launch only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProject {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    console_url: Option<Url>,
    resources: Vec<ResourceRef>,
}

impl CloudProject {
    pub fn new(name: impl Into<String>, console_url: Option<Url>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LauncherError::InvalidName("name is required".to_string()));
        }
        Ok(Self {
            name,
            console_url,
            resources: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Console page for this project, when a console is configured
    pub fn console_overview_url(&self) -> Option<Url> {
        let base = self.console_url.as_ref()?;
        let base = base.as_str().trim_end_matches('/');
        Url::parse(&format!(
            "{base}/{CONSOLE_OVERVIEW_URL_PREFIX}{}{CONSOLE_OVERVIEW_URL_SUFFIX}",
            self.name
        ))
        .ok()
    }

    /// Record an object created in this project. Entries keep insertion order.
    pub fn add_resource(&mut self, resource: ResourceRef) {
        self.resources.push(resource);
    }

    pub fn resources(&self) -> &[ResourceRef] {
        &self.resources
    }
}

impl PartialEq for CloudProject {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CloudProject {}

impl fmt::Display for CloudProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Project] {}", self.name)
    }
}

/// Reference to an object applied to the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ResourceRef {
    pub fn new(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{} in {}", self.kind, self.name, ns),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}
