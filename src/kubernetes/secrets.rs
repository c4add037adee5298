// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret and config map reading and writing

use crate::constants::FIELD_MANAGER;
use crate::error::Result;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::ByteString;
use kube::{
    api::{DeleteParams, ObjectMeta, Patch, PatchParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Decoded data of a secret, `None` if the secret does not exist
#[instrument(skip(client))]
pub async fn get_secret_data(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<Option<BTreeMap<String, Vec<u8>>>> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    Ok(secrets.get_opt(name).await?.map(|secret| {
        secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, v.0))
            .collect()
    }))
}

/// Create or replace a secret
#[instrument(skip(client, labels, data))]
pub async fn write_secret(
    client: &Client,
    namespace: &str,
    name: &str,
    labels: &BTreeMap<String, String>,
    data: &BTreeMap<String, Vec<u8>>,
) -> Result<()> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret = build_secret(namespace, name, labels, data);

    let pp = PatchParams::apply(FIELD_MANAGER).force();
    secrets.patch(name, &pp, &Patch::Apply(&secret)).await?;

    info!("Wrote secret {}/{}", namespace, name);
    Ok(())
}

fn build_secret(
    namespace: &str,
    name: &str,
    labels: &BTreeMap<String, String>,
    data: &BTreeMap<String, Vec<u8>>,
) -> Secret {
    Secret {
        metadata: metadata(namespace, name, labels),
        data: Some(
            data.iter()
                .map(|(k, v)| (k.clone(), ByteString(v.clone())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// Data of a config map, `None` if the config map does not exist
#[instrument(skip(client))]
pub async fn get_config_map_data(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<Option<BTreeMap<String, String>>> {
    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    Ok(config_maps
        .get_opt(name)
        .await?
        .map(|cm| cm.data.unwrap_or_default()))
}

/// Create or replace a config map
#[instrument(skip(client, labels, data))]
pub async fn write_config_map(
    client: &Client,
    namespace: &str,
    name: &str,
    labels: &BTreeMap<String, String>,
    data: &BTreeMap<String, String>,
) -> Result<()> {
    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let config_map = build_config_map(namespace, name, labels, data);

    let pp = PatchParams::apply(FIELD_MANAGER).force();
    config_maps
        .patch(name, &pp, &Patch::Apply(&config_map))
        .await?;

    info!("Wrote config map {}/{}", namespace, name);
    Ok(())
}

fn build_config_map(
    namespace: &str,
    name: &str,
    labels: &BTreeMap<String, String>,
    data: &BTreeMap<String, String>,
) -> ConfigMap {
    ConfigMap {
        metadata: metadata(namespace, name, labels),
        data: Some(data.clone()),
        ..Default::default()
    }
}

/// Delete a config map. Returns false when it did not exist.
#[instrument(skip(client))]
pub async fn delete_config_map(client: &Client, namespace: &str, name: &str) -> Result<bool> {
    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    match config_maps.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            debug!("Deleted config map {}/{}", namespace, name);
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn metadata(namespace: &str, name: &str, labels: &BTreeMap<String, String>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: (!labels.is_empty()).then(|| labels.clone()),
        ..Default::default()
    }
}
