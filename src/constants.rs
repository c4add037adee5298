// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes label keys and values set by the launcher
pub mod labels {
    /// Set on build runs and propagated to their pods; value is the project name
    pub const BUILD: &str = "launchpad.geeko.me/build";
    /// Set by Tekton on the pods of a run; value is the run name
    pub const TASK_RUN: &str = "tekton.dev/taskRun";
    /// Marks objects created by the launcher
    pub const CREATOR: &str = "creator";
    pub const CREATOR_VALUE: &str = "launchpad";
    /// Secrets carrying this label are picked up by the pipeline engine
    pub const PIPELINE_SYNC: &str = "jenkins";
    pub const PIPELINE_SYNC_VALUE: &str = "sync";
}

/// The field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "launchpad";

/// Logical name of the secret holding source-control credentials
pub const SOURCE_SECRET_NAME: &str = "cd-github";

/// Suffix of the config map listing the repositories built for an owner
pub const PIPELINE_JOB_CONFIG_SUFFIX: &str = "jenkins";

/// Build triggering
pub mod build {
    /// Maximum number of attempts to instantiate a build
    pub const RETRY_TRIGGER_BUILD_COUNT: u32 = 5;
    /// Fixed pause between two trigger attempts, in milliseconds
    pub const RETRY_BACKOFF_MILLIS: u64 = 500;
    /// Name of the service fronting the image registry
    pub const REGISTRY_SERVICE: &str = "registry";
    /// Port the image registry listens on
    pub const REGISTRY_PORT: u16 = 5000;
}

/// Build completion polling
pub mod poll {
    /// Period of the pod sampling action in seconds
    pub const SAMPLE_INTERVAL_SECS: u64 = 20;
    /// Period of the keep-alive log action in seconds
    pub const HEARTBEAT_INTERVAL_SECS: u64 = 40;
    /// Deadline after which the wait gives up, in seconds
    pub const DEADLINE_SECS: u64 = 15 * 60;
}

/// Template discovery inside a source checkout
pub mod discovery {
    /// Directory holding the application templates
    pub const MARKER_DIR: &str = ".openshiftio";
    pub const RESOURCE_PREFIX: &str = "resource.";
    pub const SERVICE_PREFIX: &str = "service.";
    pub const APPLICATION_PREFIX: &str = "application.";
}

/// Logical names of the built-in templates
pub mod templates {
    pub const S2I_TASK: &str = "s2i-task";
    pub const S2I_TASK_RUN: &str = "s2i-taskrun";
    pub const DEPLOYMENT: &str = "deployment";
}

/// Impersonation groups added when acting on behalf of a user
pub const IMPERSONATE_GROUPS: [&str; 2] = ["system:authenticated", "system:authenticated:oauth"];
