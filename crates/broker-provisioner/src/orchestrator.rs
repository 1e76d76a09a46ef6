// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use broker_k8s::{K8sClient, ObjectKind};
use tracing::{info, instrument};

use crate::bundle::ResourceBundle;
use crate::config::OrchestratorConfig;
use crate::error::ProvisionerError;
use crate::progress::{ProgressEvent, ProgressListener, TracingProgress};
use crate::readiness::ReadinessGate;

/// Creates and deletes resource bundles against the cluster.
///
/// Creation order is secrets, config maps, volume claims, deployments,
/// services, then jobs. All deployments are created before any is waited on
/// until healthy, and all jobs are created before any is waited on until
/// finished. Deletion runs in the reverse kind order, keeping bundle order
/// within a kind. Both stop at the first
/// failure and leave already-applied objects in place.
#[derive(Clone)]
pub struct Orchestrator {
	client: Arc<dyn K8sClient>,
	gate: ReadinessGate,
	progress: Arc<dyn ProgressListener>,
}

impl Orchestrator {
	pub fn new(client: Arc<dyn K8sClient>, config: &OrchestratorConfig) -> Self {
		Self {
			gate: ReadinessGate::new(client.clone(), config),
			client,
			progress: Arc::new(TracingProgress),
		}
	}

	pub fn with_progress(mut self, progress: Arc<dyn ProgressListener>) -> Self {
		self.progress = progress;
		self
	}

	pub fn client(&self) -> &Arc<dyn K8sClient> {
		&self.client
	}

	fn created(&self, kind: ObjectKind, namespace: &str, name: String) {
		self.progress.notify(&ProgressEvent::Created {
			kind,
			namespace: namespace.to_string(),
			name,
		});
	}

	#[instrument(skip(self, bundle), fields(namespace = %bundle.namespace, objects = bundle.object_count()))]
	pub async fn create(&self, mut bundle: ResourceBundle) -> Result<(), ProvisionerError> {
		bundle.validate()?;
		let labels = bundle.labels.clone();
		bundle.inject_labels(&labels);

		let ResourceBundle {
			namespace,
			secrets,
			config_maps,
			volume_claims,
			deployments,
			services,
			jobs,
			..
		} = bundle;
		let ns = namespace.as_str();

		for secret in secrets {
			let name = secret.metadata.name.clone().unwrap_or_default();
			self.client.create_secret(ns, secret).await?;
			self.created(ObjectKind::Secret, ns, name);
		}

		for config_map in config_maps {
			let name = config_map.metadata.name.clone().unwrap_or_default();
			self.client.create_config_map(ns, config_map).await?;
			self.created(ObjectKind::ConfigMap, ns, name);
		}

		for claim in volume_claims {
			let name = claim.metadata.name.clone().unwrap_or_default();
			self.client.create_persistent_volume_claim(ns, claim).await?;
			self.created(ObjectKind::PersistentVolumeClaim, ns, name);
		}

		let mut workloads = Vec::with_capacity(deployments.len());
		for deployment in deployments {
			let name = deployment.metadata.name.clone().unwrap_or_default();
			self.client.create_deployment(ns, deployment).await?;
			self.created(ObjectKind::Deployment, ns, name.clone());
			workloads.push(name);
		}
		for name in &workloads {
			self.gate.wait_for_deployment(name, ns).await?;
		}

		for service in services {
			let name = service.metadata.name.clone().unwrap_or_default();
			self.client.create_service(ns, service).await?;
			self.created(ObjectKind::Service, ns, name);
		}

		let mut started = Vec::with_capacity(jobs.len());
		for job in jobs {
			let name = job.metadata.name.clone().unwrap_or_default();
			self.client.create_job(ns, job).await?;
			self.created(ObjectKind::Job, ns, name.clone());
			started.push(name);
		}
		for name in &started {
			self.gate.wait_for_job(name, ns).await?;
		}

		info!("Resource bundle created");
		Ok(())
	}

	#[instrument(skip(self, bundle), fields(namespace = %bundle.namespace, objects = bundle.object_count()))]
	pub async fn delete(&self, bundle: &ResourceBundle) -> Result<(), ProvisionerError> {
		bundle.validate()?;
		let ns = bundle.namespace.as_str();

		for kind in ObjectKind::CREATE_ORDER.iter().rev().copied() {
			for name in bundle.names(kind) {
				self.client.delete(kind, &name, ns).await?;
				self.progress.notify(&ProgressEvent::Deleted {
					kind,
					namespace: ns.to_string(),
					name,
				});
			}
		}

		info!("Resource bundle deleted");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use broker_k8s::{MockK8sClient, ObjectMeta, Secret};

	#[tokio::test]
	async fn test_create_rejects_invalid_bundle_without_cluster_calls() {
		let mock = Arc::new(MockK8sClient::new());
		let orchestrator = Orchestrator::new(mock.clone(), &OrchestratorConfig::default());

		let mut bundle = ResourceBundle::new("ns1");
		for _ in 0..2 {
			bundle.secrets.push(Secret {
				metadata: ObjectMeta {
					name: Some("dup".to_string()),
					..Default::default()
				},
				..Default::default()
			});
		}

		let err = orchestrator.create(bundle).await.unwrap_err();
		assert!(matches!(err, ProvisionerError::DuplicateName { .. }));
		assert!(mock.events().is_empty());
	}

	#[tokio::test]
	async fn test_empty_bundle_is_noop() {
		let mock = Arc::new(MockK8sClient::new());
		let orchestrator = Orchestrator::new(mock.clone(), &OrchestratorConfig::default());

		orchestrator.create(ResourceBundle::new("ns1")).await.unwrap();
		orchestrator.delete(&ResourceBundle::new("ns1")).await.unwrap();
		assert!(mock.events().is_empty());
	}
}
