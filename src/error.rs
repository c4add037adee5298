// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Remote system rejected the request: {0}")]
    RemoteRejected(String),

    #[error("Failed to build cluster connection: {0}")]
    ConnectionError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid resource name: {0}")]
    InvalidName(String),

    #[error("Project already exists: {0}")]
    DuplicateProject(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template placeholder: {0}")]
    TemplateError(#[from] regex::Error),

    #[error("Invalid manifest: {0}")]
    ManifestError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Source control operation failed: {0}")]
    SourceControlError(String),

    #[error("Failed to trigger build {namespace}/{name} after {attempts} attempts")]
    BuildTriggerError {
        namespace: String,
        name: String,
        attempts: u32,
    },
}

pub type Result<T> = std::result::Result<T, LauncherError>;
