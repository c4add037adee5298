// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use launchpad::config::Config;
use launchpad::events::{EventSink, StatusEventBuffer};
use launchpad::kubernetes::{build_crds_available, create_client, KubeCloudClient};
use launchpad::mission::{ExistingRepository, Flavor, MissionControl};
use launchpad::naming::{repository_name, validate_project_name};
use launchpad::steps::{CloudSteps, StepSettings};
use launchpad::template::TemplateStore;
use launchpad::types::{ContextVariant, GitIdentity, ProjectileContext, Repository};

fn required(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Build the launch request and its repository from the environment
fn launch_request(config: &Config) -> Result<(ProjectileContext, Repository)> {
    let project_name = required("LAUNCHER_PROJECT_NAME")?;
    validate_project_name(&project_name)?;

    let clone_url = required("LAUNCHER_GIT_CLONE_URL")?;
    let clone_url = Url::parse(&clone_url)
        .with_context(|| format!("LAUNCHER_GIT_CLONE_URL is not a valid URL: {clone_url}"))?;
    let repo_name = repository_name(&clone_url)
        .with_context(|| format!("Cannot derive a repository name from {clone_url}"))?;
    let full_name = clone_url
        .path()
        .trim_start_matches('/')
        .trim_end_matches(".git")
        .to_string();

    let mut context = ProjectileContext::new(
        project_name,
        repo_name,
        required("LAUNCHER_PROJECT_LOCATION")?,
    );
    context.mission = optional("LAUNCHER_MISSION");
    context.runtime = optional("LAUNCHER_RUNTIME");
    if let (Some(owner), Some(token)) = (optional("LAUNCHER_GIT_OWNER"), optional("LAUNCHER_GIT_TOKEN")) {
        context.git_identity = Some(GitIdentity { owner, token });
    }
    if config.flavor == Flavor::Pipeline {
        context.variant = ContextVariant::Pipeline {
            space_path: required("LAUNCHER_SPACE_PATH")?,
            pipeline_id: required("LAUNCHER_PIPELINE_ID")?,
        };
    }

    let repository = Repository {
        full_name,
        clone_url,
        homepage: None,
    };
    Ok((context, repository))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting launchpad");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: flavor={}, webhook_order={:?}, build_timeout={}s",
        config.flavor,
        config.webhook_order,
        config.build_timeout.as_secs()
    );
    let (context, repository) = launch_request(&config)?;

    let client = create_client(&config).await?;
    info!("Connected to Kubernetes cluster");
    match build_crds_available(&client).await {
        Ok(true) => {}
        Ok(false) => warn!("Cluster builds are unavailable, only checkout templates can be applied"),
        Err(e) => warn!("Failed to discover build resources: {}", e),
    }

    let events = Arc::new(StatusEventBuffer::new());
    let steps = CloudSteps::new(
        Arc::new(KubeCloudClient::new(client, config.console_url.clone())),
        TemplateStore::new(config.template_dir.clone()),
        events.clone(),
        StepSettings::from_config(&config),
    );
    let mission = MissionControl::new(
        steps,
        Arc::new(ExistingRepository::new(repository)),
        events.clone(),
        config.flavor,
        config.webhook_order,
    );

    let id = context.id;
    let result = mission.launch(context).await;
    for event in events.drain(id) {
        println!("{event}");
    }
    let boom = result.context("Launch failed")?;
    println!("{}", serde_json::to_string_pretty(&boom)?);
    Ok(())
}
