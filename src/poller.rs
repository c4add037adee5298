// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for a cluster-side build to finish.
//!
//! Builds run asynchronously on the cluster and nothing notifies us when they
//! are done, so [`BuildCompletionPoller`] samples a [`BuildProbe`] on a fixed
//! period until it reports completion or a deadline passes. Hitting the
//! deadline is not an error: the caller carries on with [`BuildState::TimedOut`].

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, timeout_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::constants::{labels, poll};
use crate::error::Result;
use crate::kubernetes::CloudClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Waiting,
    Ready,
    TimedOut,
}

/// One observation of build progress
#[async_trait]
pub trait BuildProbe: Send + Sync {
    async fn is_complete(&self) -> Result<bool>;
}

/// Looks at the pods of one build run
pub struct PodCompletionProbe<'a> {
    cloud: &'a dyn CloudClient,
    namespace: String,
    selector: String,
}

impl<'a> PodCompletionProbe<'a> {
    pub fn new(cloud: &'a dyn CloudClient, namespace: &str, run: &str) -> Self {
        Self {
            cloud,
            namespace: namespace.to_string(),
            selector: format!("{}={}", labels::TASK_RUN, run),
        }
    }
}

#[async_trait]
impl BuildProbe for PodCompletionProbe<'_> {
    async fn is_complete(&self) -> Result<bool> {
        let pods = self.cloud.list_pods(&self.namespace, &self.selector).await?;
        Ok(pods_completed(&pods))
    }
}

/// True when there is at least one build pod and every one of them reports
/// containers that all terminated with reason `Completed`.
pub fn pods_completed(pods: &[Pod]) -> bool {
    !pods.is_empty() && pods.iter().all(pod_completed)
}

fn pod_completed(pod: &Pod) -> bool {
    let Some(statuses) = pod
        .status
        .as_ref()
        .and_then(|status| status.container_statuses.as_ref())
    else {
        return false;
    };

    !statuses.is_empty()
        && statuses.iter().all(|container| {
            container
                .state
                .as_ref()
                .and_then(|state| state.terminated.as_ref())
                .and_then(|terminated| terminated.reason.as_deref())
                == Some("Completed")
        })
}

#[derive(Debug, Clone)]
pub struct BuildCompletionPoller {
    sample_period: Duration,
    heartbeat_period: Duration,
    deadline: Duration,
}

impl Default for BuildCompletionPoller {
    fn default() -> Self {
        Self::with_deadline(Duration::from_secs(poll::DEADLINE_SECS))
    }
}

impl BuildCompletionPoller {
    pub fn new(sample_period: Duration, heartbeat_period: Duration, deadline: Duration) -> Self {
        Self {
            sample_period,
            heartbeat_period,
            deadline,
        }
    }

    /// Standard sampling and heartbeat periods with a custom deadline
    pub fn with_deadline(deadline: Duration) -> Self {
        Self::new(
            Duration::from_secs(poll::SAMPLE_INTERVAL_SECS),
            Duration::from_secs(poll::HEARTBEAT_INTERVAL_SECS),
            deadline,
        )
    }

    /// Sample `probe` until it reports completion or the deadline passes.
    ///
    /// The first sample is taken one period after the call. Probe failures count
    /// as "not yet". A sample still in flight at the deadline is abandoned.
    /// Both periodic actions are stopped when this returns.
    pub async fn wait(&self, probe: &dyn BuildProbe) -> BuildState {
        let started = Instant::now();
        let ends = started + self.deadline;
        let mut sampler = interval_at(started + self.sample_period, self.sample_period);
        sampler.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut heartbeat = interval_at(started + self.heartbeat_period, self.heartbeat_period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = sleep_until(ends);
        tokio::pin!(deadline);

        let mut state = BuildState::Waiting;
        while state == BuildState::Waiting {
            tokio::select! {
                biased;

                _ = &mut deadline => {
                    state = BuildState::TimedOut;
                }
                _ = sampler.tick() => match timeout_at(ends, probe.is_complete()).await {
                    Err(_) => state = BuildState::TimedOut,
                    Ok(Ok(true)) => state = BuildState::Ready,
                    Ok(Ok(false)) => debug!("Build not complete yet"),
                    Ok(Err(e)) => warn!("Failed to sample build progress: {}", e),
                },
                _ = heartbeat.tick() => {
                    info!("Waiting for build to complete ({}s elapsed)", started.elapsed().as_secs());
                }
            }
        }

        match state {
            BuildState::TimedOut => warn!(
                "Build did not complete within {}s, continuing anyway",
                self.deadline.as_secs()
            ),
            _ => info!("Build completed after {}s", started.elapsed().as_secs()),
        }
        state
    }
}
