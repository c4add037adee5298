// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::Client;
use std::collections::BTreeMap;
use url::Url;

use super::{namespaces, resources, secrets, workloads, CloudClient, CustomResourceKind};
use crate::error::Result;
use crate::types::{CloudProject, ResourceRef, TaskRun};

/// [`CloudClient`] backed by a Kubernetes control plane. Projects are namespaces.
#[derive(Clone)]
pub struct KubeCloudClient {
    client: Client,
    console_url: Option<Url>,
}

impl KubeCloudClient {
    pub fn new(client: Client, console_url: Option<Url>) -> Self {
        Self {
            client,
            console_url,
        }
    }

    fn project(&self, name: &str) -> Result<CloudProject> {
        CloudProject::new(name, self.console_url.clone())
    }
}

#[async_trait]
impl CloudClient for KubeCloudClient {
    async fn create_project(&self, name: &str) -> Result<CloudProject> {
        namespaces::create_namespace(&self.client, name).await?;
        self.project(name)
    }

    async fn find_project(&self, name: &str) -> Result<Option<CloudProject>> {
        match namespaces::find_namespace(&self.client, name).await? {
            Some(_) => Ok(Some(self.project(name)?)),
            None => Ok(None),
        }
    }

    async fn delete_project(&self, name: &str) -> Result<bool> {
        namespaces::delete_namespace(&self.client, name).await
    }

    async fn apply_custom_resource(
        &self,
        kind: &CustomResourceKind,
        namespace: &str,
        definition: &str,
    ) -> Result<ResourceRef> {
        resources::apply_custom_resource(&self.client, kind, namespace, definition).await
    }

    async fn delete_custom_resource(
        &self,
        kind: &CustomResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<bool> {
        resources::delete_custom_resource(&self.client, kind, namespace, name).await
    }

    async fn apply_manifest(&self, namespace: &str, manifest: &str) -> Result<Vec<ResourceRef>> {
        resources::apply_manifest(&self.client, namespace, manifest).await
    }

    async fn start_build(&self, namespace: &str, run: &TaskRun) -> Result<Option<String>> {
        resources::start_build(&self.client, namespace, run).await
    }

    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>> {
        secrets::get_secret_data(&self.client, namespace, name).await
    }

    async fn write_secret(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, Vec<u8>>,
    ) -> Result<()> {
        secrets::write_secret(&self.client, namespace, name, labels, data).await
    }

    async fn get_config_map_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        secrets::get_config_map_data(&self.client, namespace, name).await
    }

    async fn write_config_map(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, String>,
    ) -> Result<()> {
        secrets::write_config_map(&self.client, namespace, name, labels, data).await
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<bool> {
        secrets::delete_config_map(&self.client, namespace, name).await
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>> {
        workloads::list_pods(&self.client, namespace, label_selector).await
    }

    async fn get_service_cluster_address(
        &self,
        namespace: &str,
        service_name: &str,
    ) -> Result<Option<String>> {
        workloads::get_service_cluster_address(&self.client, namespace, service_name).await
    }

    async fn list_routes(&self, namespace: &str) -> Result<BTreeMap<String, String>> {
        workloads::list_routes(&self.client, namespace).await
    }
}
