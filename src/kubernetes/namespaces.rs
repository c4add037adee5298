// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::constants::labels;
use crate::error::{LauncherError, Result};
use crate::naming::is_valid_resource_name;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{DeleteParams, ObjectMeta, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Look up a namespace, `None` if it does not exist
#[instrument(skip(client))]
pub async fn find_namespace(client: &Client, name: &str) -> Result<Option<Namespace>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let namespace = namespaces.get_opt(name).await?;
    if namespace.is_none() {
        debug!("Namespace {} does not exist", name);
    }
    Ok(namespace)
}

/// Create a namespace. An existing namespace with the same name is an error.
#[instrument(skip(client))]
pub async fn create_namespace(client: &Client, name: &str) -> Result<Namespace> {
    if !is_valid_resource_name(name) {
        return Err(LauncherError::InvalidName(name.to_string()));
    }

    let namespaces: Api<Namespace> = Api::all(client.clone());
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([(
                labels::CREATOR.to_string(),
                labels::CREATOR_VALUE.to_string(),
            )])),
            ..Default::default()
        },
        ..Default::default()
    };

    info!("Creating namespace {}", name);
    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(created) => {
            info!("Namespace {} created successfully", name);
            Ok(created)
        }
        Err(kube::Error::Api(err)) if err.code == 409 => {
            Err(LauncherError::DuplicateProject(name.to_string()))
        }
        Err(kube::Error::Api(err)) if err.code == 422 => Err(LauncherError::InvalidName(format!(
            "{}: {}",
            name, err.message
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Delete a namespace. Returns false when there was nothing to delete.
#[instrument(skip(client))]
pub async fn delete_namespace(client: &Client, name: &str) -> Result<bool> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            debug!("Deleted namespace {}", name);
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(e.into()),
    }
}
