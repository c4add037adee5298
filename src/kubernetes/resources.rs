// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applying rendered definitions to the cluster

use crate::constants::FIELD_MANAGER;
use crate::error::{LauncherError, Result};
use crate::kubernetes::CustomResourceKind;
use crate::types::{ResourceRef, TaskRun};
use kube::{
    api::{DeleteParams, DynamicObject, Patch, PatchParams, PostParams},
    core::GroupVersionKind,
    discovery::{Discovery, Scope},
    Api, Client, ResourceExt,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Split a rendered manifest into the objects it defines.
///
/// Documents may be single objects, `List`s or `Template`s; the latter two are
/// flattened into their `items` / `objects`. Empty documents are skipped.
pub fn parse_manifest(manifest: &str) -> Result<Vec<Value>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(manifest) {
        let value = Value::deserialize(document)?;
        match value {
            Value::Null => continue,
            Value::Object(_) => {}
            other => {
                return Err(LauncherError::ManifestError(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        }

        let nested = match value["kind"].as_str() {
            Some("Template") => Some("objects"),
            Some("List") => Some("items"),
            _ => None,
        };
        match nested {
            Some(field) => {
                if let Some(Value::Array(items)) = value.get(field) {
                    objects.extend(items.iter().filter(|i| i.is_object()).cloned());
                }
            }
            None => objects.push(value),
        }
    }
    Ok(objects)
}

/// Turn a definition into a dynamic object placed in `namespace`
fn to_dynamic(value: Value, namespace: Option<&str>) -> Result<DynamicObject> {
    let mut obj: DynamicObject = serde_json::from_value(value)?;
    if obj.types.is_none() {
        return Err(LauncherError::ManifestError(
            "object without apiVersion/kind".to_string(),
        ));
    }
    if obj.metadata.name.is_none() {
        return Err(LauncherError::ManifestError(
            "object without metadata.name".to_string(),
        ));
    }
    obj.metadata.namespace = namespace.map(str::to_string);
    Ok(obj)
}

fn resource_ref(obj: &DynamicObject) -> ResourceRef {
    let (api_version, kind) = obj
        .types
        .as_ref()
        .map(|t| (t.api_version.as_str(), t.kind.as_str()))
        .unwrap_or_default();
    ResourceRef::new(api_version, kind, &obj.name_any(), obj.metadata.namespace.as_deref())
}

fn rejected(resource: &str, err: kube::Error) -> LauncherError {
    match err {
        kube::Error::Api(response) => {
            LauncherError::RemoteRejected(format!("{}: {}", resource, response.message))
        }
        other => other.into(),
    }
}

/// Create or replace a custom resource from its YAML definition
#[instrument(skip(client, definition), fields(kind = kind.kind))]
pub async fn apply_custom_resource(
    client: &Client,
    kind: &CustomResourceKind,
    namespace: &str,
    definition: &str,
) -> Result<ResourceRef> {
    let value: Value = serde_yaml::from_str(definition)?;
    let obj = to_dynamic(value, Some(namespace))?;
    let declared = obj.types.as_ref().map(|t| t.kind.as_str());
    if declared != Some(kind.kind) {
        return Err(LauncherError::ManifestError(format!(
            "expected a {} definition, got {}",
            kind.kind,
            declared.unwrap_or("nothing")
        )));
    }

    let name = obj.name_any();
    let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), namespace, &kind.api_resource());
    let pp = PatchParams::apply(FIELD_MANAGER).force();
    api.patch(&name, &pp, &Patch::Apply(&obj))
        .await
        .map_err(|e| rejected(&format!("{}/{}", kind.kind, name), e))?;

    info!("Applied {} {}/{}", kind.kind, namespace, name);
    Ok(resource_ref(&obj))
}

/// Delete a custom resource. Returns false when it did not exist.
#[instrument(skip(client), fields(kind = kind.kind))]
pub async fn delete_custom_resource(
    client: &Client,
    kind: &CustomResourceKind,
    namespace: &str,
    name: &str,
) -> Result<bool> {
    let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), namespace, &kind.api_resource());
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Create or replace every object of a rendered manifest, in document order
#[instrument(skip(client, manifest))]
pub async fn apply_manifest(client: &Client, namespace: &str, manifest: &str) -> Result<Vec<ResourceRef>> {
    let objects = parse_manifest(manifest)?;
    if objects.is_empty() {
        debug!("Manifest for {} holds no objects", namespace);
        return Ok(Vec::new());
    }

    let discovery = Discovery::new(client.clone()).run().await?;
    let pp = PatchParams::apply(FIELD_MANAGER).force();
    let mut applied = Vec::with_capacity(objects.len());

    for value in objects {
        let mut obj = to_dynamic(value, Some(namespace))?;
        let types = obj.types.as_ref().ok_or_else(|| {
            LauncherError::ManifestError("object without apiVersion/kind".to_string())
        })?;
        let gvk = GroupVersionKind::try_from(types)
            .map_err(|e| LauncherError::ManifestError(e.to_string()))?;
        let (ar, caps) = discovery.resolve_gvk(&gvk).ok_or_else(|| {
            LauncherError::RemoteRejected(format!("{} is not served by the cluster", gvk.kind))
        })?;

        let api: Api<DynamicObject> = match caps.scope {
            Scope::Namespaced => Api::namespaced_with(client.clone(), namespace, &ar),
            Scope::Cluster => {
                obj.metadata.namespace = None;
                Api::all_with(client.clone(), &ar)
            }
        };
        let name = obj.name_any();
        api.patch(&name, &pp, &Patch::Apply(&obj))
            .await
            .map_err(|e| rejected(&format!("{}/{}", ar.kind, name), e))?;

        debug!("Applied {} {}", ar.kind, name);
        applied.push(resource_ref(&obj));
    }

    info!("Applied {} objects in {}", applied.len(), namespace);
    Ok(applied)
}

/// Submit a build run. The cluster may pick the name (`generateName`).
#[instrument(skip(client, run))]
pub async fn start_build(client: &Client, namespace: &str, run: &TaskRun) -> Result<Option<String>> {
    let api: Api<TaskRun> = Api::namespaced(client.clone(), namespace);
    let created = api
        .create(&PostParams::default(), run)
        .await
        .map_err(|e| rejected("TaskRun", e))?;
    Ok(created.metadata.name)
}
