// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Capability surface over the cluster control plane.
//!
//! [`CloudClient`] is what the provisioning steps talk to. [`KubeCloudClient`]
//! implements it on top of a kube [`Client`](kube::Client). Nothing in here
//! retries; retry policy belongs to the callers.

pub mod client;
pub mod cloud;
pub mod crd;
pub mod namespaces;
pub mod resources;
pub mod secrets;
pub mod workloads;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::types::{CloudProject, ResourceRef, TaskRun};

pub use client::create_client;
pub use cloud::KubeCloudClient;
pub use crd::{build_crds_available, CustomResourceKind, TEKTON_TASK};

#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Fails with `DuplicateProject` when the name is taken and `InvalidName`
    /// when the cluster would refuse it
    async fn create_project(&self, name: &str) -> Result<CloudProject>;

    /// `None` when no such project exists
    async fn find_project(&self, name: &str) -> Result<Option<CloudProject>>;

    /// True when a project existed and was removed
    async fn delete_project(&self, name: &str) -> Result<bool>;

    /// Create or replace a custom resource from its YAML definition
    async fn apply_custom_resource(
        &self,
        kind: &CustomResourceKind,
        namespace: &str,
        definition: &str,
    ) -> Result<ResourceRef>;

    async fn delete_custom_resource(
        &self,
        kind: &CustomResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<bool>;

    /// Create or replace every object of a (multi document) YAML manifest
    async fn apply_manifest(&self, namespace: &str, manifest: &str) -> Result<Vec<ResourceRef>>;

    /// Submit a build run; returns the name the cluster gave it, if any
    async fn start_build(&self, namespace: &str, run: &TaskRun) -> Result<Option<String>>;

    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>>;

    async fn write_secret(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, Vec<u8>>,
    ) -> Result<()>;

    async fn get_config_map_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>>;

    async fn write_config_map(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, String>,
    ) -> Result<()>;

    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<bool>;

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>>;

    async fn get_service_cluster_address(
        &self,
        namespace: &str,
        service_name: &str,
    ) -> Result<Option<String>>;

    /// Externally reachable URLs of the project, keyed by route name
    async fn list_routes(&self, namespace: &str) -> Result<BTreeMap<String, String>>;

    /// Write the secret unless it already holds `data`. Returns whether a write happened.
    async fn upsert_secret(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, Vec<u8>>,
    ) -> Result<bool> {
        let existing = match self.get_secret_data(namespace, name).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Failed to lookup secret {}/{}: {}", namespace, name, e);
                None
            }
        };
        if existing.as_ref() == Some(data) {
            debug!("Secret {}/{} is up to date", namespace, name);
            return Ok(false);
        }

        info!("Upserting secret {}/{}", namespace, name);
        self.write_secret(namespace, name, labels, data).await?;
        Ok(true)
    }

    /// Write the config map unless it already holds `data`. Returns whether a write happened.
    async fn upsert_config_map(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, String>,
    ) -> Result<bool> {
        if self.get_config_map_data(namespace, name).await?.as_ref() == Some(data) {
            debug!("Config map {}/{} is up to date", namespace, name);
            return Ok(false);
        }

        info!("Upserting config map {}/{}", namespace, name);
        self.write_config_map(namespace, name, labels, data).await?;
        Ok(true)
    }
}
