// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Status events emitted while a launch progresses, and the sink buffering
//! them until a client collects them.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

/// Milestones of a launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusEventKind {
    RepositoryCreated,
    ProjectCreated,
    PipelineConfigured,
    CodePushed,
    WebhookCreated,
}

impl StatusEventKind {
    pub const ALL: [StatusEventKind; 5] = [
        StatusEventKind::RepositoryCreated,
        StatusEventKind::ProjectCreated,
        StatusEventKind::PipelineConfigured,
        StatusEventKind::CodePushed,
        StatusEventKind::WebhookCreated,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatusEventKind::RepositoryCreated => "REPOSITORY_CREATED",
            StatusEventKind::ProjectCreated => "PROJECT_CREATED",
            StatusEventKind::PipelineConfigured => "PIPELINE_CONFIGURED",
            StatusEventKind::CodePushed => "CODE_PUSHED",
            StatusEventKind::WebhookCreated => "WEBHOOK_CREATED",
        }
    }

    /// Human readable description shown to the user
    pub fn message(self) -> &'static str {
        match self {
            StatusEventKind::RepositoryCreated => "Creating your new source repository",
            StatusEventKind::ProjectCreated => "Creating your project on the cluster",
            StatusEventKind::PipelineConfigured => "Setting up your build pipeline",
            StatusEventKind::CodePushed => "Pushing your customized code into the repository",
            StatusEventKind::WebhookCreated => "Configuring to trigger builds on pushes",
        }
    }

    /// Every kind with its description, as `[{"KIND": "message"}, ...]`
    pub fn catalog() -> Value {
        Value::Array(
            Self::ALL
                .iter()
                .map(|kind| {
                    let mut entry = Map::new();
                    entry.insert(kind.name().to_string(), Value::from(kind.message()));
                    Value::Object(entry)
                })
                .collect(),
        )
    }
}

/// A milestone reached by one launch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessageEvent {
    pub id: Uuid,
    pub status_message: StatusEventKind,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl StatusMessageEvent {
    pub fn new(id: Uuid, kind: StatusEventKind) -> Self {
        Self {
            id,
            status_message: kind,
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

/// Receives status events from concurrent launches and hands them out per launch id.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: StatusMessageEvent);

    /// Return and forget every serialized event buffered for `id`
    fn drain(&self, id: Uuid) -> Vec<String>;
}

/// In-memory [`EventSink`] keeping serialized events until drained
#[derive(Debug, Default)]
pub struct StatusEventBuffer {
    messages: Mutex<HashMap<Uuid, Vec<String>>>,
}

impl StatusEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for StatusEventBuffer {
    fn publish(&self, event: StatusMessageEvent) {
        let message = match serde_json::to_string(&event) {
            Ok(m) => m,
            Err(e) => {
                error!("Failed to serialize status event {:?}: {}", event.status_message, e);
                return;
            }
        };
        debug!("Status event for {}: {}", event.id, message);
        let mut messages = self.messages.lock().unwrap_or_else(|p| p.into_inner());
        messages.entry(event.id).or_default().push(message);
    }

    fn drain(&self, id: Uuid) -> Vec<String> {
        let mut messages = self.messages.lock().unwrap_or_else(|p| p.into_inner());
        messages.remove(&id).unwrap_or_default()
    }
}
