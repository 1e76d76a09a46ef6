// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::K8sError;
use crate::types::{ConfigMap, Deployment, Job, ObjectKind, PersistentVolumeClaim, Secret, Service};

/// Trait for K8s client operations.
///
/// This is the only seam between the broker and the cluster. The orchestrator,
/// readiness gate and dispatcher all take an `Arc<dyn K8sClient>`, so tests
/// swap in [`crate::MockK8sClient`] instead of branching on a test mode.
#[async_trait]
pub trait K8sClient: Send + Sync {
	async fn create_secret(&self, namespace: &str, secret: Secret) -> Result<Secret, K8sError>;

	async fn create_config_map(
		&self,
		namespace: &str,
		config_map: ConfigMap,
	) -> Result<ConfigMap, K8sError>;

	async fn create_persistent_volume_claim(
		&self,
		namespace: &str,
		claim: PersistentVolumeClaim,
	) -> Result<PersistentVolumeClaim, K8sError>;

	async fn create_deployment(
		&self,
		namespace: &str,
		deployment: Deployment,
	) -> Result<Deployment, K8sError>;

	async fn create_service(&self, namespace: &str, service: Service) -> Result<Service, K8sError>;

	async fn create_job(&self, namespace: &str, job: Job) -> Result<Job, K8sError>;

	/// Delete an object by kind and name with foreground propagation, so that
	/// dependents (pods of a deployment or job) are removed first.
	async fn delete(&self, kind: ObjectKind, name: &str, namespace: &str) -> Result<(), K8sError>;

	/// Fetch a deployment, including its status, for readiness checks.
	async fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, K8sError>;

	/// Fetch a job, including its status, for completion checks.
	async fn get_job(&self, name: &str, namespace: &str) -> Result<Job, K8sError>;

	/// List secrets across all namespaces matching an equality label selector
	/// such as `service-instance-id=abc`.
	async fn list_secrets(&self, label_selector: &str) -> Result<Vec<Secret>, K8sError>;
}
