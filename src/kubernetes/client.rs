// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Control-plane client creation

use crate::config::{ClusterConnection, ClusterIdentity, Config};
use crate::constants::IMPERSONATE_GROUPS;
use crate::error::{LauncherError, Result};
use kube::{Client, Config as KConfig};
use tracing::{debug, info, instrument, warn};

/// Create a Kubernetes client from the launcher configuration.
///
/// Without explicit connection parameters the ambient kubeconfig (or in-cluster
/// service account) is used.
#[instrument(skip(config))]
pub async fn create_client(config: &Config) -> Result<Client> {
    match &config.connection {
        Some(connection) => {
            info!("Connecting to cluster at {}", connection.api_url);
            let client_config = connection_config(connection)?;
            Client::try_from(client_config)
                .map_err(|e| LauncherError::ConnectionError(format!("Failed to create client: {}", e)))
        }
        None => {
            debug!("No cluster endpoint configured, inferring from environment");
            let client_config = KConfig::infer()
                .await
                .map_err(|e| LauncherError::ConnectionError(format!("Failed to infer config: {}", e)))?;
            Client::try_from(client_config)
                .map_err(|e| LauncherError::ConnectionError(format!("Failed to create client: {}", e)))
        }
    }
}

/// Build the client configuration for an explicit endpoint.
///
/// Certificate validation is disabled for this connection.
fn connection_config(connection: &ClusterConnection) -> Result<KConfig> {
    let cluster_url: http::Uri = connection
        .api_url
        .as_str()
        .parse()
        .map_err(|e| LauncherError::ConnectionError(format!("Invalid URL: {}", e)))?;

    let mut c = KConfig::new(cluster_url);
    warn!("TLS certificate validation is disabled for {}", connection.api_url);
    c.accept_invalid_certs = true;

    match &connection.identity {
        ClusterIdentity::Token(token) => {
            c.auth_info.token = Some(token.clone().into());
        }
        ClusterIdentity::UserPassword { username, password } => {
            c.auth_info.username = Some(username.clone());
            c.auth_info.password = Some(password.clone().into());
        }
    }

    if let Some(user) = &connection.impersonate_user {
        debug!("Impersonating user {}", user);
        c.auth_info.impersonate = Some(user.clone());
        c.auth_info.impersonate_groups =
            Some(IMPERSONATE_GROUPS.iter().map(|g| g.to_string()).collect());
    }

    Ok(c)
}
