// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::Serialize;
use url::Url;

use super::project::CloudProject;

/// A source repository created (or located) for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub full_name: String,
    pub clone_url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<Url>,
}

/// Result of a successful launch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Boom {
    pub created_repository: Option<Repository>,
    pub created_project: CloudProject,
}
