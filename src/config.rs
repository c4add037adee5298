// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::constants::poll;
use crate::mission::{Flavor, WebhookOrder};

/// Credentials used to talk to the cluster control plane
#[derive(Clone)]
pub enum ClusterIdentity {
    Token(String),
    UserPassword { username: String, password: String },
}

impl std::fmt::Debug for ClusterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterIdentity::Token(_) => f.write_str("Token(***)"),
            ClusterIdentity::UserPassword { username, .. } => {
                write!(f, "UserPassword({username}, ***)")
            }
        }
    }
}

/// Explicit connection parameters for the control plane
#[derive(Debug, Clone)]
pub struct ClusterConnection {
    pub api_url: Url,
    pub identity: ClusterIdentity,
    pub impersonate_user: Option<String>,
}

/// Launcher configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset the ambient kubeconfig is used
    pub connection: Option<ClusterConnection>,
    pub console_url: Option<Url>,
    pub git_provider: String,
    pub template_dir: Option<PathBuf>,
    pub registry_namespace: String,
    pub flavor: Flavor,
    pub webhook_order: WebhookOrder,
    pub build_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            connection: None,
            console_url: None,
            git_provider: "GITHUB".to_string(),
            template_dir: None,
            registry_namespace: "default".to_string(),
            flavor: Flavor::Launcher,
            webhook_order: WebhookOrder::Early,
            build_timeout: Duration::from_secs(poll::DEADLINE_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let connection = match var("LAUNCHER_CLUSTER_API_URL") {
            Some(api_url) => {
                let api_url = Url::parse(&api_url)
                    .with_context(|| format!("LAUNCHER_CLUSTER_API_URL is not a valid URL: {api_url}"))?;
                let identity = match (
                    var("LAUNCHER_CLUSTER_TOKEN"),
                    var("LAUNCHER_CLUSTER_USERNAME"),
                    var("LAUNCHER_CLUSTER_PASSWORD"),
                ) {
                    (Some(token), _, _) => ClusterIdentity::Token(token),
                    (None, Some(username), Some(password)) => {
                        ClusterIdentity::UserPassword { username, password }
                    }
                    _ => bail!(
                        "Cluster credentials not found. Set LAUNCHER_CLUSTER_TOKEN or LAUNCHER_CLUSTER_USERNAME/LAUNCHER_CLUSTER_PASSWORD"
                    ),
                };
                Some(ClusterConnection {
                    api_url,
                    identity,
                    impersonate_user: var("LAUNCHER_CLUSTER_IMPERSONATE_USER"),
                })
            }
            None => None,
        };

        let console_url = var("LAUNCHER_CONSOLE_URL")
            .map(|u| Url::parse(&u).with_context(|| format!("LAUNCHER_CONSOLE_URL is not a valid URL: {u}")))
            .transpose()?;

        let flavor = match var("LAUNCHER_FLAVOR") {
            Some(v) => v.parse().context("LAUNCHER_FLAVOR")?,
            None => defaults.flavor,
        };
        let webhook_order = match var("LAUNCHER_WEBHOOK_ORDER") {
            Some(v) => v.parse().context("LAUNCHER_WEBHOOK_ORDER")?,
            None => defaults.webhook_order,
        };
        let build_timeout = match var("LAUNCHER_BUILD_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("LAUNCHER_BUILD_TIMEOUT_SECS is not a number: {v}"))?,
            ),
            None => defaults.build_timeout,
        };

        Ok(Config {
            connection,
            console_url,
            git_provider: var("LAUNCHER_GIT_PROVIDER")
                .map(|p| p.to_uppercase())
                .unwrap_or(defaults.git_provider),
            template_dir: var("LAUNCHER_TEMPLATE_DIR").map(PathBuf::from),
            registry_namespace: var("LAUNCHER_REGISTRY_NAMESPACE").unwrap_or(defaults.registry_namespace),
            flavor,
            webhook_order,
            build_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert!(config.connection.is_none());
        assert_eq!(config.git_provider, "GITHUB");
        assert_eq!(config.registry_namespace, "default");
        assert_eq!(config.flavor, Flavor::Launcher);
        assert_eq!(config.webhook_order, WebhookOrder::Early);
        assert_eq!(config.build_timeout, Duration::from_secs(900));
    }

    #[test]
    fn test_token_takes_precedence() {
        let config = load(&[
            ("LAUNCHER_CLUSTER_API_URL", "https://192.168.99.108:8443"),
            ("LAUNCHER_CLUSTER_TOKEN", "abc"),
            ("LAUNCHER_CLUSTER_USERNAME", "developer"),
            ("LAUNCHER_CLUSTER_PASSWORD", "developer"),
        ])
        .unwrap();
        let connection = config.connection.unwrap();
        assert!(matches!(connection.identity, ClusterIdentity::Token(t) if t == "abc"));
    }

    #[test]
    fn test_user_password_identity() {
        let config = load(&[
            ("LAUNCHER_CLUSTER_API_URL", "https://192.168.99.108:8443"),
            ("LAUNCHER_CLUSTER_USERNAME", "developer"),
            ("LAUNCHER_CLUSTER_PASSWORD", "developer"),
            ("LAUNCHER_CLUSTER_IMPERSONATE_USER", "edewit"),
        ])
        .unwrap();
        let connection = config.connection.unwrap();
        assert!(matches!(
            connection.identity,
            ClusterIdentity::UserPassword { ref username, .. } if username == "developer"
        ));
        assert_eq!(connection.impersonate_user.as_deref(), Some("edewit"));
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let result = load(&[("LAUNCHER_CLUSTER_API_URL", "https://192.168.99.108:8443")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LAUNCHER_GIT_PROVIDER", "gitlab"),
            ("LAUNCHER_FLAVOR", "pipeline"),
            ("LAUNCHER_WEBHOOK_ORDER", "late"),
            ("LAUNCHER_BUILD_TIMEOUT_SECS", "60"),
            ("LAUNCHER_CONSOLE_URL", "https://console.example.com"),
        ])
        .unwrap();
        assert_eq!(config.git_provider, "GITLAB");
        assert_eq!(config.flavor, Flavor::Pipeline);
        assert_eq!(config.webhook_order, WebhookOrder::Late);
        assert_eq!(config.build_timeout, Duration::from_secs(60));
        assert_eq!(
            config.console_url.unwrap().as_str(),
            "https://console.example.com/"
        );
    }

    #[test]
    fn test_invalid_flavor_is_an_error() {
        assert!(load(&[("LAUNCHER_FLAVOR", "osio")]).is_err());
    }
}
