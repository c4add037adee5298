// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: canned Kubernetes API responses and in-memory collaborators.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::{
    ContainerState, ContainerStateRunning, ContainerStateTerminated, ContainerStatus, Pod, PodStatus,
};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;
use url::Url;

use crate::constants::labels;
use crate::error::{LauncherError, Result};
use crate::kubernetes::resources::parse_manifest;
use crate::kubernetes::{CloudClient, CustomResourceKind};
use crate::mission::SourceControl;
use crate::types::{CloudProject, Projectile, Repository, ResourceRef, TaskRun};

type Route = (String, String);

/// A mock HTTP service that returns predefined responses based on request paths,
/// and records the body of every request it receives.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Route, (u16, String)>>>,
    received: Arc<Mutex<Vec<(Route, Bytes)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Bodies of the requests received for `method` on exactly `path`
    pub fn requests(&self, method: &str, path: &str) -> Vec<Bytes> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter(|((m, p), _)| m == method && p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("", &path)));
        let received = self.received.clone();

        Box::pin(async move {
            let request_body = req.into_body().collect().await?.to_bytes();
            received
                .lock()
                .unwrap()
                .push(((method, path), request_body));

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

fn status_json(code: u16, reason: &str, message: String) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", format!("{} \"{}\" not found", resource, name))
}

/// Create a 409 already exists response
pub fn conflict_json(resource: &str, name: &str) -> String {
    status_json(409, "AlreadyExists", format!("{} \"{}\" already exists", resource, name))
}

/// A pod whose containers terminated with the given reasons
pub fn pod_with_terminated(name: &str, reasons: &[&str]) -> Pod {
    let statuses = reasons
        .iter()
        .enumerate()
        .map(|(i, reason)| ContainerStatus {
            name: format!("step-{}", i),
            state: Some(ContainerState {
                terminated: Some(ContainerStateTerminated {
                    reason: Some(reason.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();

    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(PodStatus {
            container_statuses: Some(statuses),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Pod of build run `run` whose containers terminated with `reasons`
pub fn build_pod(run: &str, reasons: &[&str]) -> Pod {
    let mut pod = pod_with_terminated(&format!("{}-pod", run), reasons);
    pod.metadata.labels = Some(BTreeMap::from([(labels::TASK_RUN.to_string(), run.to_string())]));
    pod
}

/// Pod of build run `run` with its container still running
pub fn running_build_pod(run: &str) -> Pod {
    let mut pod = build_pod(run, &[]);
    pod.status = Some(PodStatus {
        container_statuses: Some(vec![ContainerStatus {
            name: "step-build".to_string(),
            state: Some(ContainerState {
                running: Some(ContainerStateRunning::default()),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    });
    pod
}

/// In-memory cloud: projects, secrets and config maps live in maps, every
/// mutating call is counted.
#[derive(Default)]
pub struct FakeCloud {
    pub projects: Mutex<BTreeSet<String>>,
    /// Projects that exist but are not returned by lookups, as if created concurrently
    pub unseen_projects: Mutex<BTreeSet<String>>,
    pub secrets: Mutex<BTreeMap<(String, String), BTreeMap<String, Vec<u8>>>>,
    pub config_maps: Mutex<BTreeMap<(String, String), BTreeMap<String, String>>>,
    /// Every object applied, in order
    pub applied: Mutex<Vec<ResourceRef>>,
    /// Every build run submitted, in order
    pub builds: Mutex<Vec<TaskRun>>,
    pub pods: Mutex<Vec<Pod>>,
    pub routes: Mutex<BTreeMap<String, String>>,
    pub registry_address: Mutex<Option<String>>,
    pub create_project_calls: AtomicU32,
    pub secret_writes: AtomicU32,
    pub config_map_writes: AtomicU32,
    pub build_attempts: AtomicU32,
    /// Number of build submissions failing before one succeeds
    pub failing_builds: AtomicU32,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_builds(self, count: u32) -> Self {
        self.failing_builds.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_project(self, name: &str) -> Self {
        self.projects.lock().unwrap().insert(name.to_string());
        self
    }

    /// `name` gets created by someone else between our lookup and our create
    pub fn with_concurrent_create(self, name: &str) -> Self {
        self.projects.lock().unwrap().insert(name.to_string());
        self.unseen_projects.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn with_pods(self, pods: Vec<Pod>) -> Self {
        *self.pods.lock().unwrap() = pods;
        self
    }

    pub fn applied_names(&self) -> Vec<String> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    fn key(namespace: &str, name: &str) -> (String, String) {
        (namespace.to_string(), name.to_string())
    }
}

#[async_trait]
impl CloudClient for FakeCloud {
    async fn create_project(&self, name: &str) -> Result<CloudProject> {
        self.create_project_calls.fetch_add(1, Ordering::SeqCst);
        if !self.projects.lock().unwrap().insert(name.to_string()) {
            return Err(LauncherError::DuplicateProject(name.to_string()));
        }
        CloudProject::new(name, None)
    }

    async fn find_project(&self, name: &str) -> Result<Option<CloudProject>> {
        if self.unseen_projects.lock().unwrap().contains(name) {
            return Ok(None);
        }
        if self.projects.lock().unwrap().contains(name) {
            Ok(Some(CloudProject::new(name, None)?))
        } else {
            Ok(None)
        }
    }

    async fn delete_project(&self, name: &str) -> Result<bool> {
        Ok(self.projects.lock().unwrap().remove(name))
    }

    async fn apply_custom_resource(
        &self,
        kind: &CustomResourceKind,
        namespace: &str,
        definition: &str,
    ) -> Result<ResourceRef> {
        let value: serde_json::Value = serde_yaml::from_str(definition)?;
        let name = value["metadata"]["name"].as_str().unwrap_or_default();
        let resource = ResourceRef::new(&kind.api_version(), kind.kind, name, Some(namespace));
        self.applied.lock().unwrap().push(resource.clone());
        Ok(resource)
    }

    async fn delete_custom_resource(
        &self,
        _kind: &CustomResourceKind,
        _namespace: &str,
        name: &str,
    ) -> Result<bool> {
        let mut applied = self.applied.lock().unwrap();
        let before = applied.len();
        applied.retain(|r| r.name != name);
        Ok(applied.len() != before)
    }

    async fn apply_manifest(&self, namespace: &str, manifest: &str) -> Result<Vec<ResourceRef>> {
        let resources: Vec<ResourceRef> = parse_manifest(manifest)?
            .iter()
            .map(|obj| {
                ResourceRef::new(
                    obj["apiVersion"].as_str().unwrap_or_default(),
                    obj["kind"].as_str().unwrap_or_default(),
                    obj["metadata"]["name"].as_str().unwrap_or_default(),
                    Some(namespace),
                )
            })
            .collect();
        self.applied.lock().unwrap().extend(resources.iter().cloned());
        Ok(resources)
    }

    async fn start_build(&self, namespace: &str, run: &TaskRun) -> Result<Option<String>> {
        let attempt = self.build_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failing_builds.load(Ordering::SeqCst) {
            if attempt % 2 == 0 {
                return Ok(None);
            }
            return Err(LauncherError::RemoteRejected(format!(
                "build submission {} refused in {}",
                attempt, namespace
            )));
        }
        self.builds.lock().unwrap().push(run.clone());
        Ok(Some(format!("s2i-build-{}", attempt)))
    }

    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>> {
        Ok(self.secrets.lock().unwrap().get(&Self::key(namespace, name)).cloned())
    }

    async fn write_secret(
        &self,
        namespace: &str,
        name: &str,
        _labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, Vec<u8>>,
    ) -> Result<()> {
        self.secret_writes.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .lock()
            .unwrap()
            .insert(Self::key(namespace, name), data.clone());
        Ok(())
    }

    async fn get_config_map_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        Ok(self
            .config_maps
            .lock()
            .unwrap()
            .get(&Self::key(namespace, name))
            .cloned())
    }

    async fn write_config_map(
        &self,
        namespace: &str,
        name: &str,
        _labels: &BTreeMap<String, String>,
        data: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.config_map_writes.fetch_add(1, Ordering::SeqCst);
        self.config_maps
            .lock()
            .unwrap()
            .insert(Self::key(namespace, name), data.clone());
        Ok(())
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<bool> {
        Ok(self
            .config_maps
            .lock()
            .unwrap()
            .remove(&Self::key(namespace, name))
            .is_some())
    }

    async fn list_pods(&self, _namespace: &str, label_selector: &str) -> Result<Vec<Pod>> {
        let wanted: Vec<(&str, &str)> = label_selector
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        let pods = self.pods.lock().unwrap();
        Ok(pods
            .iter()
            .filter(|pod| {
                wanted.iter().all(|(key, value)| {
                    pod.metadata.labels.as_ref().and_then(|l| l.get(*key)).map(String::as_str) == Some(*value)
                })
            })
            .cloned()
            .collect())
    }

    async fn get_service_cluster_address(
        &self,
        _namespace: &str,
        _service_name: &str,
    ) -> Result<Option<String>> {
        Ok(self.registry_address.lock().unwrap().clone())
    }

    async fn list_routes(&self, _namespace: &str) -> Result<BTreeMap<String, String>> {
        Ok(self.routes.lock().unwrap().clone())
    }
}

/// Source control collaborator recording the calls made to it
#[derive(Default)]
pub struct FakeSourceControl {
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeSourceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceControl for FakeSourceControl {
    async fn create_repository(&self, projectile: &Projectile) -> Result<Repository> {
        self.calls.lock().unwrap().push("create_repository");
        let full_name = format!("geeko/{}", projectile.context().git_repository);
        Ok(Repository {
            clone_url: Url::parse(&format!("https://github.com/{}.git", full_name))
                .map_err(|e| LauncherError::SourceControlError(e.to_string()))?,
            homepage: None,
            full_name,
        })
    }

    async fn create_webhooks(&self, _projectile: &Projectile, _repository: &Repository) -> Result<()> {
        self.calls.lock().unwrap().push("create_webhooks");
        Ok(())
    }

    async fn push_to_repository(&self, _projectile: &Projectile, _repository: &Repository) -> Result<()> {
        self.calls.lock().unwrap().push("push_to_repository");
        Ok(())
    }
}
