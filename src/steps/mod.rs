// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Provisioning steps composed by the launch pipeline.
//!
//! Every step is safe to run again for the same project: projects are looked up
//! before being created, secrets and config maps are compared before being
//! written, and definitions are applied with create-or-replace semantics.

pub mod discovery;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::constants::{build, labels, templates, PIPELINE_JOB_CONFIG_SUFFIX, SOURCE_SECRET_NAME};
use crate::error::{LauncherError, Result};
use crate::events::{EventSink, StatusEventKind, StatusMessageEvent};
use crate::kubernetes::{CloudClient, TEKTON_TASK};
use crate::naming::{repository_name, to_kubernetes_name};
use crate::poller::{BuildCompletionPoller, BuildState, PodCompletionProbe};
use crate::template::{render, Substitutions, TemplateStore};
use crate::types::{CloudProject, Projectile, Repository, TaskRun};

pub use discovery::{find_project_apps, AppInfo, TemplateBucket};

/// Deployment specific inputs of the steps
#[derive(Debug, Clone)]
pub struct StepSettings {
    /// Passed to templates as `SOURCE_REPOSITORY_PROVIDER`
    pub git_provider: String,
    pub console_url: Option<Url>,
    /// Namespace of the image registry service
    pub registry_namespace: String,
    pub poller: BuildCompletionPoller,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl StepSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            git_provider: config.git_provider.to_uppercase(),
            console_url: config.console_url.clone(),
            registry_namespace: config.registry_namespace.clone(),
            poller: BuildCompletionPoller::with_deadline(config.build_timeout),
        }
    }
}

pub struct CloudSteps {
    cloud: Arc<dyn CloudClient>,
    templates: TemplateStore,
    events: Arc<dyn EventSink>,
    settings: StepSettings,
}

impl CloudSteps {
    pub fn new(
        cloud: Arc<dyn CloudClient>,
        templates: TemplateStore,
        events: Arc<dyn EventSink>,
        settings: StepSettings,
    ) -> Self {
        Self {
            cloud,
            templates,
            events,
            settings,
        }
    }

    /// Find the project of `projectile`, creating it when absent
    #[instrument(skip(self, projectile), fields(project = projectile.namespace()))]
    pub async fn ensure_project_exists(&self, projectile: &Projectile) -> Result<CloudProject> {
        let name = projectile.namespace();
        let project = match self.cloud.find_project(name).await? {
            Some(project) => {
                debug!("Project {} already exists", name);
                project
            }
            None => self.cloud.create_project(name).await?,
        };

        let location = project
            .console_overview_url()
            .map(|url| url.to_string())
            .unwrap_or_default();
        self.events.publish(
            StatusMessageEvent::new(projectile.id(), StatusEventKind::ProjectCreated)
                .with("location", location),
        );
        Ok(project)
    }

    /// Submit the build and deploy definitions for the checkout of `projectile`.
    ///
    /// Templates shipped in the checkout are applied resources first, then
    /// services, then applications. Without any, the generic build path runs.
    #[instrument(skip_all, fields(project = project.name()))]
    pub async fn configure_build_pipeline(
        &self,
        projectile: &Projectile,
        project: &mut CloudProject,
        repository: Option<&Repository>,
    ) -> Result<()> {
        let apps = find_project_apps(projectile.project_location());
        if apps.is_empty() {
            info!("No application templates found, using the generic build");
            self.build_and_deploy(project, repository).await?;
        } else {
            let webhook_secret = Uuid::new_v4().simple().to_string();
            for bucket in TemplateBucket::APPLY_ORDER {
                for app in &apps {
                    let params = self.template_parameters(project, repository, &app.context_dir, &webhook_secret);
                    for template in app.templates(bucket) {
                        self.apply_template(project, template, &params).await?;
                    }
                }
            }
        }

        let routes = self.cloud.list_routes(project.name()).await?;
        self.events.publish(
            StatusMessageEvent::new(projectile.id(), StatusEventKind::PipelineConfigured)
                .with("routes", serde_json::to_value(routes)?),
        );
        Ok(())
    }

    fn template_parameters(
        &self,
        project: &CloudProject,
        repository: Option<&Repository>,
        context_dir: &str,
        webhook_secret: &str,
    ) -> Substitutions {
        let mut params = Substitutions::new();
        if let Some(repository) = repository {
            params = params.with_param("SOURCE_REPOSITORY_URL", repository.clone_url.as_str());
            if let Some(name) = repository_name(&repository.clone_url) {
                params = params.with_param("SOURCE_REPOSITORY_NAME", name);
            }
        }
        params = params
            .with_param("SOURCE_REPOSITORY_PROVIDER", self.settings.git_provider.as_str())
            .with_param("SOURCE_REPOSITORY_DIR", context_dir)
            .with_param("PROJECT", project.name());
        if let Some(console_url) = &self.settings.console_url {
            params = params.with_param("OPENSHIFT_CONSOLE_URL", console_url.as_str());
        }
        params.with_param("GITHUB_WEBHOOK_SECRET", webhook_secret)
    }

    async fn apply_template(
        &self,
        project: &mut CloudProject,
        template: &Path,
        params: &Substitutions,
    ) -> Result<()> {
        debug!("Applying template {}", template.display());
        let content = std::fs::read_to_string(template)?;
        self.apply_rendered(project, &content, params).await
    }

    async fn apply_rendered(
        &self,
        project: &mut CloudProject,
        template: &str,
        params: &Substitutions,
    ) -> Result<()> {
        let manifest = String::from_utf8(render(template, params)?)
            .map_err(|e| LauncherError::ManifestError(e.to_string()))?;
        for resource in self.cloud.apply_manifest(project.name(), &manifest).await? {
            project.add_resource(resource);
        }
        Ok(())
    }

    /// Generic path: build the repository on the cluster, wait for it, deploy the image
    async fn build_and_deploy(&self, project: &mut CloudProject, repository: Option<&Repository>) -> Result<()> {
        let repository = repository.ok_or_else(|| {
            LauncherError::InvalidArgument(format!(
                "project {} has no application templates and no source repository to build",
                project.name()
            ))
        })?;
        let namespace = project.name().to_string();

        let task = self.templates.get(templates::S2I_TASK)?;
        let applied = self
            .cloud
            .apply_custom_resource(&TEKTON_TASK, &namespace, &task)
            .await?;
        project.add_resource(applied);

        let registry = self.registry_address().await;
        let run = self
            .trigger_build_with_retry(&namespace, &namespace, &repository.clone_url, &registry)
            .await?;

        let probe = PodCompletionProbe::new(self.cloud.as_ref(), &namespace, &run);
        if self.settings.poller.wait(&probe).await == BuildState::TimedOut {
            warn!("Deploying {} without a confirmed build", namespace);
        }

        self.deploy(project, &registry).await
    }

    /// Submit a build run for `project_name`, trying up to
    /// [`RETRY_TRIGGER_BUILD_COUNT`](build::RETRY_TRIGGER_BUILD_COUNT) times.
    ///
    /// Returns the name of the submitted run.
    #[instrument(skip(self, git_url, registry))]
    pub async fn trigger_build_with_retry(
        &self,
        namespace: &str,
        project_name: &str,
        git_url: &Url,
        registry: &str,
    ) -> Result<String> {
        let template = self.templates.get(templates::S2I_TASK_RUN)?;
        let params = Substitutions::new()
            .with_param("GIT_URL", git_url.as_str())
            .with_param("REGISTRY", registry)
            .with_param("PROJECT_NAME", project_name);
        let run: TaskRun = serde_yaml::from_slice(&render(&template, &params)?)?;

        for attempt in 1..=build::RETRY_TRIGGER_BUILD_COUNT {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(build::RETRY_BACKOFF_MILLIS)).await;
            }
            match self.cloud.start_build(namespace, &run).await {
                Ok(Some(name)) => {
                    info!("Triggered build {}", name);
                    return Ok(name);
                }
                Ok(None) => error!(
                    "Failed to trigger build for {}/{}: no build returned (attempt {})",
                    namespace, project_name, attempt
                ),
                Err(e) => error!(
                    "Failed to trigger build for {}/{}: {} (attempt {})",
                    namespace, project_name, e, attempt
                ),
            }
        }

        Err(LauncherError::BuildTriggerError {
            namespace: namespace.to_string(),
            name: project_name.to_string(),
            attempts: build::RETRY_TRIGGER_BUILD_COUNT,
        })
    }

    /// Address builds push images to and deployments pull them from
    async fn registry_address(&self) -> String {
        let namespace = &self.settings.registry_namespace;
        match self
            .cloud
            .get_service_cluster_address(namespace, build::REGISTRY_SERVICE)
            .await
        {
            Ok(Some(ip)) => format!("{}:{}", ip, build::REGISTRY_PORT),
            Ok(None) => {
                debug!("Registry service has no cluster IP, using its DNS name");
                format!("{}.{}.svc:{}", build::REGISTRY_SERVICE, namespace, build::REGISTRY_PORT)
            }
            Err(e) => {
                warn!("Failed to lookup registry service: {}", e);
                format!("{}.{}.svc:{}", build::REGISTRY_SERVICE, namespace, build::REGISTRY_PORT)
            }
        }
    }

    async fn deploy(&self, project: &mut CloudProject, registry: &str) -> Result<()> {
        let template = self.templates.get(templates::DEPLOYMENT)?;
        let params = Substitutions::new()
            .with_param("PROJECT_NAME", project.name())
            .with_param("REGISTRY", registry);
        self.apply_rendered(project, &template, &params).await?;
        info!("Deployed {}", project.name());
        Ok(())
    }

    /// Store the source-control credentials of `owner` in `namespace`.
    ///
    /// Returns whether the secret had to be written.
    #[instrument(skip(self, token))]
    pub async fn ensure_secret_exists(&self, namespace: &str, owner: &str, token: &str) -> Result<bool> {
        let name = to_kubernetes_name(SOURCE_SECRET_NAME, false);
        let labels = BTreeMap::from([
            (labels::PIPELINE_SYNC.to_string(), labels::PIPELINE_SYNC_VALUE.to_string()),
            (labels::CREATOR.to_string(), labels::CREATOR_VALUE.to_string()),
        ]);
        let data = BTreeMap::from([
            ("username".to_string(), owner.as_bytes().to_vec()),
            ("password".to_string(), token.as_bytes().to_vec()),
        ]);
        self.cloud.upsert_secret(namespace, &name, &labels, &data).await
    }

    /// Register `repository` in the pipeline job list of `owner`.
    ///
    /// Returns whether the job list had to be written.
    #[instrument(skip(self, repository), fields(repository = %repository.full_name))]
    pub async fn ensure_pipeline_job(&self, namespace: &str, owner: &str, repository: &Repository) -> Result<bool> {
        let name = to_kubernetes_name(&format!("{}-{}", owner, PIPELINE_JOB_CONFIG_SUFFIX), false);
        let job = repository_name(&repository.clone_url).unwrap_or_else(|| repository.full_name.clone());

        let mut data = self
            .cloud
            .get_config_map_data(namespace, &name)
            .await?
            .unwrap_or_default();
        data.insert(job, repository.clone_url.to_string());

        let labels = BTreeMap::from([(labels::CREATOR.to_string(), labels::CREATOR_VALUE.to_string())]);
        self.cloud.upsert_config_map(namespace, &name, &labels, &data).await
    }
}
