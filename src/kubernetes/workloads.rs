// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read-only queries on running workloads

use crate::error::Result;
use k8s_openapi::api::core::v1::{Pod, Service};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{api::ListParams, Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[instrument(skip(client))]
pub async fn list_pods(client: &Client, namespace: &str, label_selector: &str) -> Result<Vec<Pod>> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let list = pods.list(&ListParams::default().labels(label_selector)).await?;
    debug!("Found {} pods matching {}", list.items.len(), label_selector);
    Ok(list.items)
}

/// Cluster IP of a service. Headless or missing services have none.
#[instrument(skip(client))]
pub async fn get_service_cluster_address(
    client: &Client,
    namespace: &str,
    service_name: &str,
) -> Result<Option<String>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    Ok(services
        .get_opt(service_name)
        .await?
        .and_then(|svc| svc.spec)
        .and_then(|spec| spec.cluster_ip)
        .filter(|ip| !ip.is_empty() && ip != "None"))
}

/// Externally reachable URL of every ingress in the namespace, keyed by ingress name
#[instrument(skip(client))]
pub async fn list_routes(client: &Client, namespace: &str) -> Result<BTreeMap<String, String>> {
    let ingresses: Api<Ingress> = Api::namespaced(client.clone(), namespace);
    let list = ingresses.list(&ListParams::default()).await?;
    Ok(list
        .items
        .iter()
        .filter_map(|ingress| route_url(ingress).map(|url| (ingress.name_any(), url)))
        .collect())
}

fn route_url(ingress: &Ingress) -> Option<String> {
    let spec = ingress.spec.as_ref()?;
    let host = spec.rules.as_ref()?.iter().find_map(|r| r.host.clone())?;
    let secured = spec
        .tls
        .as_ref()
        .is_some_and(|tls| tls.iter().any(|t| t.hosts.as_ref().is_some_and(|h| h.contains(&host))));
    let scheme = if secured { "https" } else { "http" };
    Some(format!("{}://{}", scheme, host))
}
