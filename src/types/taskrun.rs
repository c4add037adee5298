// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

use crate::constants::labels;

/// One execution of the s2i build task
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "tekton.dev", version = "v1", kind = "TaskRun")]
#[kube(namespaced)]
#[kube(status = "TaskRunStatus")]
#[serde(rename_all = "camelCase")]
pub struct TaskRunSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<Vec<serde_json::Value>>,
}

impl TaskRun {
    /// Project this run builds, from the build label
    pub fn project(&self) -> Option<&str> {
        self.labels().get(labels::BUILD).map(String::as_str)
    }

    /// Value of a run parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.spec
            .params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = r#"
apiVersion: tekton.dev/v1
kind: TaskRun
metadata:
  generateName: s2i-my-app-
  labels:
    launchpad.geeko.me/build: my-app
spec:
  taskRef:
    name: s2i
  params:
    - name: GIT_URL
      value: https://github.com/foo/bar
    - name: IMAGE
      value: 10.0.0.1:5000/my-app:latest
  workspaces:
    - name: source
      emptyDir: {}
"#;

    #[test]
    fn test_parse_rendered_run() {
        let run: TaskRun = serde_yaml::from_str(RENDERED).unwrap();

        assert_eq!(run.metadata.generate_name.as_deref(), Some("s2i-my-app-"));
        assert_eq!(run.spec.task_ref.as_ref().unwrap().name, "s2i");
        assert_eq!(run.project(), Some("my-app"));
        assert_eq!(run.param("GIT_URL"), Some("https://github.com/foo/bar"));
        assert_eq!(run.param("MISSING"), None);
        assert!(run.status.is_none());
    }

    #[test]
    fn test_project_without_label() {
        let mut run: TaskRun = serde_yaml::from_str(RENDERED).unwrap();
        run.metadata.labels = None;
        assert_eq!(run.project(), None);
    }

    #[test]
    fn test_serialized_run_carries_type_information() {
        let run: TaskRun = serde_yaml::from_str(RENDERED).unwrap();
        let json = serde_json::to_value(&run).unwrap();

        assert_eq!(json["apiVersion"], "tekton.dev/v1");
        assert_eq!(json["kind"], "TaskRun");
        assert_eq!(json["spec"]["taskRef"]["name"], "s2i");
    }
}
