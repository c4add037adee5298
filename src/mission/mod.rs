// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The launch pipeline: from a launch request to a repository plus a running project.

pub mod scm;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{LauncherError, Result};
use crate::events::{EventSink, StatusEventKind, StatusMessageEvent};
use crate::steps::CloudSteps;
use crate::types::{Boom, ContextVariant, GitIdentity, Projectile, ProjectileContext, Repository};

pub use scm::{ExistingRepository, SourceControl};

/// Kind of launch request a [`MissionControl`] serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Launcher,
    /// Launches into a hosted pipeline space, with credentials and a job list
    Pipeline,
}

impl FromStr for Flavor {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "launcher" => Ok(Flavor::Launcher),
            "pipeline" => Ok(Flavor::Pipeline),
            other => Err(LauncherError::InvalidArgument(format!(
                "unknown flavor '{}', expected 'launcher' or 'pipeline'",
                other
            ))),
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavor::Launcher => write!(f, "launcher"),
            Flavor::Pipeline => write!(f, "pipeline"),
        }
    }
}

/// When webhooks get registered. Either way they exist before the push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOrder {
    /// Right after the repository is created
    Early,
    /// After the build pipeline is configured
    Late,
}

impl FromStr for WebhookOrder {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "early" => Ok(WebhookOrder::Early),
            "late" => Ok(WebhookOrder::Late),
            other => Err(LauncherError::InvalidArgument(format!(
                "unknown webhook order '{}', expected 'early' or 'late'",
                other
            ))),
        }
    }
}

pub struct MissionControl {
    steps: CloudSteps,
    scm: Arc<dyn SourceControl>,
    events: Arc<dyn EventSink>,
    flavor: Flavor,
    webhook_order: WebhookOrder,
}

impl MissionControl {
    pub fn new(
        steps: CloudSteps,
        scm: Arc<dyn SourceControl>,
        events: Arc<dyn EventSink>,
        flavor: Flavor,
        webhook_order: WebhookOrder,
    ) -> Self {
        Self {
            steps,
            scm,
            events,
            flavor,
            webhook_order,
        }
    }

    /// Run one launch. Steps run in order and the first failure aborts the
    /// launch; whatever was created before stays in place.
    #[instrument(skip_all, fields(
        id = %context.id,
        project = %context.project_name,
        mission = context.mission.as_deref(),
        runtime = context.runtime.as_deref()
    ))]
    pub async fn launch(&self, context: ProjectileContext) -> Result<Boom> {
        self.validate(&context)?;
        let projectile = Projectile::prepare(context)?;
        let booster = projectile.booster();
        info!(
            "Launching {} into {}{}",
            projectile.context().project_name,
            projectile.namespace(),
            booster.map(|b| format!(" from booster {}", b)).unwrap_or_default()
        );

        let repository = self.scm.create_repository(&projectile).await?;
        let location = repository
            .homepage
            .as_ref()
            .unwrap_or(&repository.clone_url)
            .to_string();
        self.emit(&projectile, StatusEventKind::RepositoryCreated, Some(("location", location)));

        if self.webhook_order == WebhookOrder::Early {
            self.create_webhooks(&projectile, &repository).await?;
        }

        let mut project = self.steps.ensure_project_exists(&projectile).await?;

        if let Some(identity) = self.pipeline_identity(&projectile) {
            debug!(
                "Registering pipeline {} of space {}",
                projectile.pipeline_id().unwrap_or_default(),
                projectile.space_path().unwrap_or_default()
            );
            self.steps
                .ensure_secret_exists(project.name(), &identity.owner, &identity.token)
                .await?;
            self.steps
                .ensure_pipeline_job(project.name(), &identity.owner, &repository)
                .await?;
        }

        self.steps
            .configure_build_pipeline(&projectile, &mut project, Some(&repository))
            .await?;

        if self.webhook_order == WebhookOrder::Late {
            self.create_webhooks(&projectile, &repository).await?;
        }

        self.scm.push_to_repository(&projectile, &repository).await?;
        self.emit(&projectile, StatusEventKind::CodePushed, None);

        info!("Launch of {} complete", projectile.namespace());
        Ok(Boom {
            created_repository: Some(repository),
            created_project: project,
        })
    }

    /// Reject requests this instance cannot serve, before touching anything
    fn validate(&self, context: &ProjectileContext) -> Result<()> {
        let flavor = context.variant.flavor();
        if flavor != self.flavor {
            return Err(LauncherError::InvalidArgument(format!(
                "expected a {} launch, got a {} launch",
                self.flavor, flavor
            )));
        }
        if flavor == Flavor::Pipeline && context.git_identity.is_none() {
            return Err(LauncherError::InvalidArgument(
                "pipeline launches need source-control credentials".to_string(),
            ));
        }
        Ok(())
    }

    fn pipeline_identity<'a>(&self, projectile: &'a Projectile) -> Option<&'a GitIdentity> {
        match projectile.context().variant {
            ContextVariant::Pipeline { .. } => projectile.context().git_identity.as_ref(),
            ContextVariant::Launcher => None,
        }
    }

    async fn create_webhooks(&self, projectile: &Projectile, repository: &Repository) -> Result<()> {
        self.scm.create_webhooks(projectile, repository).await?;
        self.emit(projectile, StatusEventKind::WebhookCreated, None);
        Ok(())
    }

    fn emit(&self, projectile: &Projectile, kind: StatusEventKind, data: Option<(&str, String)>) {
        let mut event = StatusMessageEvent::new(projectile.id(), kind);
        if let Some((key, value)) = data {
            event = event.with(key, value);
        }
        self.events.publish(event);
    }
}
