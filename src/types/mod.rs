// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Values flowing through one launch.

pub mod boom;
pub mod project;
pub mod projectile;
pub mod taskrun;

pub use boom::{Boom, Repository};
pub use project::{CloudProject, ResourceRef};
pub use projectile::{ContextVariant, GitIdentity, Projectile, ProjectileContext};
pub use taskrun::TaskRun;
