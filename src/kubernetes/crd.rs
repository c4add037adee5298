// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource kinds used by the build path, and availability checking

use crate::error::Result;
use kube::{
    core::{ApiResource, GroupVersionKind},
    discovery::Discovery,
    Client,
};
use tracing::{info, warn};

/// Coordinates of a custom resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomResourceKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

/// Reusable build step definition
pub const TEKTON_TASK: CustomResourceKind = CustomResourceKind {
    group: "tekton.dev",
    version: "v1",
    kind: "Task",
    plural: "tasks",
};

/// One execution of a [`TEKTON_TASK`]
pub const TEKTON_TASK_RUN: CustomResourceKind = CustomResourceKind {
    group: "tekton.dev",
    version: "v1",
    kind: "TaskRun",
    plural: "taskruns",
};

impl CustomResourceKind {
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk(self.group, self.version, self.kind),
            self.plural,
        )
    }
}

/// Check that the cluster serves every custom resource the build path needs.
pub async fn build_crds_available(client: &Client) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[TEKTON_TASK.group])
        .run()
        .await?;

    for required in [TEKTON_TASK, TEKTON_TASK_RUN] {
        let found = discovery.groups().any(|group| {
            group.name() == required.group
                && group
                    .recommended_resources()
                    .iter()
                    .any(|(ar, _)| ar.kind == required.kind && ar.version == required.version)
        });
        if !found {
            warn!(
                "{} ({}) is not served by the cluster",
                required.kind,
                required.api_version()
            );
            return Ok(false);
        }
    }

    info!("Build resources ({}) are available", TEKTON_TASK.api_version());
    Ok(true)
}
