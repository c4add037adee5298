// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::types::{Projectile, Repository};

/// Source-control collaborator of a launch
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Create (or locate) the repository the project lives in
    async fn create_repository(&self, projectile: &Projectile) -> Result<Repository>;

    /// Register the hooks triggering builds on push
    async fn create_webhooks(&self, projectile: &Projectile, repository: &Repository) -> Result<()>;

    /// Push the generated sources
    async fn push_to_repository(&self, projectile: &Projectile, repository: &Repository) -> Result<()>;
}

/// A repository that already exists and already holds the sources.
///
/// Nothing is created or pushed; hooks are expected to be managed out of band.
#[derive(Debug, Clone)]
pub struct ExistingRepository {
    repository: Repository,
}

impl ExistingRepository {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl SourceControl for ExistingRepository {
    async fn create_repository(&self, projectile: &Projectile) -> Result<Repository> {
        info!(
            "Using existing repository {} for {}",
            self.repository.full_name,
            projectile.namespace()
        );
        Ok(self.repository.clone())
    }

    async fn create_webhooks(&self, _projectile: &Projectile, repository: &Repository) -> Result<()> {
        info!("Webhooks of {} are managed externally", repository.full_name);
        Ok(())
    }

    async fn push_to_repository(&self, _projectile: &Projectile, repository: &Repository) -> Result<()> {
        info!("Sources of {} are already pushed", repository.full_name);
        Ok(())
    }
}
