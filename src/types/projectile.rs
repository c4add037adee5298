// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{LauncherError, Result};
use crate::mission::Flavor;
use crate::naming::to_kubernetes_name;

/// Source-control credentials of the repository owner
#[derive(Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub owner: String,
    pub token: String,
}

impl fmt::Debug for GitIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GitIdentity({}, ***)", self.owner)
    }
}

/// Variant specific part of a launch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextVariant {
    /// Plain launch: repository, project, build and deploy
    Launcher,
    /// Launch into a hosted pipeline space
    Pipeline { space_path: String, pipeline_id: String },
}

impl ContextVariant {
    pub fn flavor(&self) -> Flavor {
        match self {
            ContextVariant::Launcher => Flavor::Launcher,
            ContextVariant::Pipeline { .. } => Flavor::Pipeline,
        }
    }
}

/// Input of one launch, never modified once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectileContext {
    pub id: Uuid,
    /// User facing project name, before normalization
    pub project_name: String,
    /// Booster the checkout was generated from
    pub mission: Option<String>,
    pub runtime: Option<String>,
    pub git_repository: String,
    pub git_identity: Option<GitIdentity>,
    /// Checkout of the generated sources
    pub project_location: PathBuf,
    pub variant: ContextVariant,
}

impl ProjectileContext {
    pub fn new(
        project_name: impl Into<String>,
        git_repository: impl Into<String>,
        project_location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_name: project_name.into(),
            mission: None,
            runtime: None,
            git_repository: git_repository.into(),
            git_identity: None,
            project_location: project_location.into(),
            variant: ContextVariant::Launcher,
        }
    }
}

/// A [`ProjectileContext`] enriched with what the pipeline resolved for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projectile {
    context: ProjectileContext,
    namespace: String,
}

impl Projectile {
    /// Resolve the cluster namespace. This is the only place the project name
    /// gets normalized.
    pub fn prepare(context: ProjectileContext) -> Result<Self> {
        let namespace = to_kubernetes_name(&context.project_name, false);
        if namespace.is_empty() {
            return Err(LauncherError::InvalidArgument(format!(
                "project name '{}' does not yield a valid namespace",
                context.project_name
            )));
        }
        Ok(Self { context, namespace })
    }

    pub fn context(&self) -> &ProjectileContext {
        &self.context
    }

    pub fn id(&self) -> Uuid {
        self.context.id
    }

    /// Normalized project name, used as namespace and object name
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn project_location(&self) -> &Path {
        &self.context.project_location
    }

    pub fn pipeline_id(&self) -> Option<&str> {
        match &self.context.variant {
            ContextVariant::Pipeline { pipeline_id, .. } => Some(pipeline_id),
            ContextVariant::Launcher => None,
        }
    }

    pub fn space_path(&self) -> Option<&str> {
        match &self.context.variant {
            ContextVariant::Pipeline { space_path, .. } => Some(space_path),
            ContextVariant::Launcher => None,
        }
    }

    /// `mission/runtime` the checkout was generated from, eg. `rest-http/vert.x`
    pub fn booster(&self) -> Option<String> {
        match (&self.context.mission, &self.context.runtime) {
            (Some(mission), Some(runtime)) => Some(format!("{}/{}", mission, runtime)),
            (Some(mission), None) => Some(mission.clone()),
            (None, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_normalizes_project_name() {
        let context = ProjectileContext::new("My App", "my-app", "/tmp/my-app");
        let projectile = Projectile::prepare(context.clone()).unwrap();

        assert_eq!(projectile.namespace(), "my-app");
        assert_eq!(projectile.context(), &context);
        assert_eq!(projectile.id(), context.id);
        assert_eq!(projectile.project_location(), Path::new("/tmp/my-app"));
        assert_eq!(projectile.pipeline_id(), None);
    }

    #[test]
    fn test_prepare_rejects_degenerate_name() {
        let context = ProjectileContext::new("---", "repo", "/tmp");
        assert!(matches!(
            Projectile::prepare(context),
            Err(LauncherError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_pipeline_variant_fields() {
        let mut context = ProjectileContext::new("demo", "demo", "/tmp/demo");
        context.variant = ContextVariant::Pipeline {
            space_path: "/user/space".to_string(),
            pipeline_id: "maven-release".to_string(),
        };
        let projectile = Projectile::prepare(context).unwrap();

        assert_eq!(projectile.pipeline_id(), Some("maven-release"));
        assert_eq!(projectile.space_path(), Some("/user/space"));
        assert_eq!(projectile.context().variant.flavor(), Flavor::Pipeline);
    }

    #[test]
    fn test_booster() {
        let mut context = ProjectileContext::new("demo", "demo", "/tmp/demo");
        assert_eq!(Projectile::prepare(context.clone()).unwrap().booster(), None);

        context.mission = Some("rest-http".to_string());
        assert_eq!(
            Projectile::prepare(context.clone()).unwrap().booster().as_deref(),
            Some("rest-http")
        );

        context.runtime = Some("vert.x".to_string());
        assert_eq!(
            Projectile::prepare(context).unwrap().booster().as_deref(),
            Some("rest-http/vert.x")
        );
    }

    #[test]
    fn test_git_identity_debug_hides_token() {
        let identity = GitIdentity {
            owner: "edewit".to_string(),
            token: "s3cr3t".to_string(),
        };
        assert!(!format!("{identity:?}").contains("s3cr3t"));
    }
}
