// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use broker_k8s::{Deployment, Job, K8sClient, ObjectKind};
use tokio::time::Instant;
use tracing::debug;

use crate::config::OrchestratorConfig;
use crate::error::ProvisionerError;

/// A deployment is healthy once it reports at least one replica and no
/// unavailable replicas.
pub fn deployment_ready(deployment: &Deployment) -> bool {
	let Some(status) = deployment.status.as_ref() else {
		return false;
	};
	status.replicas.unwrap_or(0) > 0 && status.unavailable_replicas.unwrap_or(0) == 0
}

/// A job is finished once it has started at least one pod and none are still
/// active. Success and failure are not distinguished.
pub fn job_finished(job: &Job) -> bool {
	let Some(status) = job.status.as_ref() else {
		return false;
	};
	let active = status.active.unwrap_or(0);
	let total = active + status.succeeded.unwrap_or(0) + status.failed.unwrap_or(0);
	total > 0 && active == 0
}

/// Polls deployments and jobs until they are ready or a timeout elapses.
#[derive(Clone)]
pub struct ReadinessGate {
	client: Arc<dyn K8sClient>,
	poll_interval: Duration,
	timeout: Duration,
}

impl ReadinessGate {
	pub fn new(client: Arc<dyn K8sClient>, config: &OrchestratorConfig) -> Self {
		Self {
			client,
			poll_interval: config.poll_interval,
			timeout: config.ready_timeout,
		}
	}

	pub async fn wait_for_deployment(&self, name: &str, namespace: &str) -> Result<(), ProvisionerError> {
		self.wait(ObjectKind::Deployment, name, namespace).await
	}

	pub async fn wait_for_job(&self, name: &str, namespace: &str) -> Result<(), ProvisionerError> {
		self.wait(ObjectKind::Job, name, namespace).await
	}

	async fn wait(&self, kind: ObjectKind, name: &str, namespace: &str) -> Result<(), ProvisionerError> {
		let start = Instant::now();
		let mut polls = 0u32;

		loop {
			polls += 1;
			let ready = match kind {
				ObjectKind::Deployment => {
					deployment_ready(&self.client.get_deployment(name, namespace).await?)
				}
				ObjectKind::Job => job_finished(&self.client.get_job(name, namespace).await?),
				_ => true,
			};

			if ready {
				debug!(%kind, namespace, name, polls, "Object ready");
				return Ok(());
			}

			if start.elapsed() >= self.timeout {
				return Err(ProvisionerError::ReadinessTimeout {
					kind,
					namespace: namespace.to_string(),
					name: name.to_string(),
					timeout_secs: self.timeout.as_secs(),
				});
			}

			tokio::time::sleep(self.poll_interval).await;
		}
	}
}
