// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Application templates shipped inside a source checkout

use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::constants::discovery::{APPLICATION_PREFIX, MARKER_DIR, RESOURCE_PREFIX, SERVICE_PREFIX};

/// Templates found in one marker directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    /// Directory holding the marker, relative to the checkout root; `.` for the root itself
    pub context_dir: String,
    pub resources: Vec<PathBuf>,
    pub services: Vec<PathBuf>,
    pub applications: Vec<PathBuf>,
}

/// Kind of template, by file name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateBucket {
    Resources,
    Services,
    Applications,
}

impl TemplateBucket {
    /// Referenced objects come before the objects referring to them
    pub const APPLY_ORDER: [TemplateBucket; 3] = [
        TemplateBucket::Resources,
        TemplateBucket::Services,
        TemplateBucket::Applications,
    ];
}

impl AppInfo {
    pub fn templates(&self, bucket: TemplateBucket) -> &[PathBuf] {
        match bucket {
            TemplateBucket::Resources => &self.resources,
            TemplateBucket::Services => &self.services,
            TemplateBucket::Applications => &self.applications,
        }
    }

    fn has_templates(&self) -> bool {
        !self.resources.is_empty() || !self.services.is_empty() || !self.applications.is_empty()
    }
}

/// Every marker directory below `root` that holds at least one template.
///
/// A failing walk is logged and treated as "nothing found".
pub fn find_project_apps(root: &Path) -> Vec<AppInfo> {
    let mut markers = match find_markers(root) {
        Ok(markers) => markers,
        Err(e) => {
            error!("Error while finding project applications in {}: {}", root.display(), e);
            return Vec::new();
        }
    };
    markers.sort();

    let mut apps = Vec::new();
    for marker in markers {
        match app_info(root, &marker) {
            Ok(app) if app.has_templates() => {
                debug!("Found application templates in {}", app.context_dir);
                apps.push(app);
            }
            Ok(_) => debug!("No templates in {}", marker.display()),
            Err(e) => {
                error!("Error while reading {}: {}", marker.display(), e);
                return Vec::new();
            }
        }
    }
    apps
}

fn find_markers(root: &Path) -> walkdir::Result<Vec<PathBuf>> {
    let mut markers = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() && entry.file_name() == MARKER_DIR {
            markers.push(entry.into_path());
        }
    }
    Ok(markers)
}

fn app_info(root: &Path, marker: &Path) -> walkdir::Result<AppInfo> {
    let context_dir = marker
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|rel| rel.to_string_lossy().into_owned())
        .filter(|rel| !rel.is_empty())
        .unwrap_or_else(|| ".".to_string());

    let mut files = Vec::new();
    for entry in WalkDir::new(marker).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_yaml(entry.path()) {
            files.push(entry.into_path());
        }
    }

    let with_prefix = |prefix: &str| -> Vec<PathBuf> {
        files
            .iter()
            .filter(|f| file_name(f).starts_with(prefix))
            .cloned()
            .collect()
    };

    Ok(AppInfo {
        context_dir,
        resources: with_prefix(RESOURCE_PREFIX),
        services: with_prefix(SERVICE_PREFIX),
        applications: with_prefix(APPLICATION_PREFIX),
    })
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn is_yaml(path: &Path) -> bool {
    let name = file_name(path);
    name.ends_with(".yml") || name.ends_with(".yaml")
}
