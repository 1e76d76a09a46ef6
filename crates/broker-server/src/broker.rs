// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dispatches broker verbs to service providers.
//!
//! The dispatcher keeps no state of its own: instances and bindings are
//! recovered from the cluster by listing the labeled secrets every provider
//! creates. A single lock serializes bundle construction and any
//! synchronous orchestrator run. Work handed to [`BackgroundTasks`] runs
//! after the lock is released.

use std::collections::BTreeMap;
use std::sync::Arc;

use broker_config::BrokerConfig;
use broker_k8s::{K8sClient, Secret};
use broker_provisioner::{Orchestrator, OrchestratorConfig};
use broker_services::labels::{
	binding_selector, instance_selector, SERVICE_ID_LABEL, SERVICE_INSTANCE_ID_LABEL,
};
use broker_services::templates::secret_string_data;
use broker_services::{
	BindingContext, Catalog, ServiceDefinition, ServiceInstanceContext, ServiceProvider,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::error::BrokerError;
use crate::tasks::{BackgroundTasks, OperationKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
	pub service_id: String,
	pub instance_id: String,
	pub plan_id: String,
	/// Target namespace from the platform context; the configured namespace
	/// when absent.
	pub namespace: Option<String>,
	pub accepts_incomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprovisionRequest {
	pub service_id: String,
	pub instance_id: String,
	pub plan_id: String,
	pub accepts_incomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
	pub service_id: String,
	pub instance_id: String,
	pub binding_id: String,
	pub namespace: Option<String>,
	pub accepts_incomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbindRequest {
	pub service_id: Option<String>,
	pub binding_id: String,
	pub instance_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
	pub instance_id: String,
	pub accepts_incomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastOperationRequest {
	pub instance_id: String,
}

/// Outcome of a verb that may have been handed to a background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationResponse {
	pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResponse {
	/// Values of the binding secret built for this request. Valid once the
	/// background grant job succeeds.
	pub credentials: BTreeMap<String, String>,
	pub is_async: bool,
}

pub struct Broker {
	catalog: Arc<Catalog>,
	client: Arc<dyn K8sClient>,
	orchestrator: Orchestrator,
	config: BrokerConfig,
	lock: Mutex<()>,
	tasks: BackgroundTasks,
}

impl Broker {
	pub fn new(catalog: Arc<Catalog>, client: Arc<dyn K8sClient>, config: BrokerConfig) -> Self {
		let orchestrator_config = OrchestratorConfig {
			poll_interval: config.poll_interval(),
			ready_timeout: config.ready_timeout(),
		};
		Self {
			orchestrator: Orchestrator::new(client.clone(), &orchestrator_config),
			catalog,
			client,
			config,
			lock: Mutex::new(()),
			tasks: BackgroundTasks::new(),
		}
	}

	pub fn with_orchestrator(mut self, orchestrator: Orchestrator) -> Self {
		self.orchestrator = orchestrator;
		self
	}

	pub fn config(&self) -> &BrokerConfig {
		&self.config
	}

	pub fn tasks(&self) -> &BackgroundTasks {
		&self.tasks
	}

	fn runs_async(&self, accepts_incomplete: bool) -> bool {
		accepts_incomplete && self.config.async_enabled
	}

	fn provider(&self, service_id: &str) -> Result<Arc<dyn ServiceProvider>, BrokerError> {
		self
			.catalog
			.get(service_id)
			.ok_or_else(|| BrokerError::InvalidService(service_id.to_string()))
	}

	pub fn catalog(&self) -> Vec<ServiceDefinition> {
		self.catalog.definitions()
	}

	#[instrument(skip(self, request), fields(service_id = %request.service_id, instance_id = %request.instance_id))]
	pub async fn provision(&self, request: ProvisionRequest) -> Result<OperationResponse, BrokerError> {
		let provider = self.provider(&request.service_id)?;
		let ctx = ServiceInstanceContext {
			namespace: request
				.namespace
				.filter(|ns| !ns.is_empty())
				.unwrap_or_else(|| self.config.namespace.clone()),
			global_namespace: self.config.namespace.clone(),
			instance_id: request.instance_id,
			plan_id: request.plan_id,
		};

		let _guard = self.lock.lock().await;
		let bundle = provider.provision_bundle(&ctx);
		info!(namespace = %ctx.namespace, objects = bundle.object_count(), "Provisioning service instance");

		if self.runs_async(request.accepts_incomplete) {
			let orchestrator = self.orchestrator.clone();
			self.tasks.spawn(OperationKey::provision(&ctx.instance_id), async move {
				orchestrator.create(bundle).await
			});
			return Ok(OperationResponse { is_async: true });
		}

		self.orchestrator.create(bundle).await?;
		Ok(OperationResponse::default())
	}

	#[instrument(skip(self, request), fields(service_id = %request.service_id, instance_id = %request.instance_id))]
	pub async fn deprovision(
		&self,
		request: DeprovisionRequest,
	) -> Result<OperationResponse, BrokerError> {
		let secrets = self
			.client
			.list_secrets(&instance_selector(&request.instance_id))
			.await?;
		let Some(existing) = secrets.first() else {
			debug!("No objects labeled with instance id; nothing to deprovision");
			return Ok(OperationResponse::default());
		};

		let provider = match self.catalog.get(&request.service_id) {
			Some(provider) => provider,
			None => self.provider(label(existing, SERVICE_ID_LABEL).unwrap_or(&request.service_id))?,
		};
		let ctx = ServiceInstanceContext {
			namespace: existing
				.metadata
				.namespace
				.clone()
				.unwrap_or_else(|| self.config.namespace.clone()),
			global_namespace: self.config.namespace.clone(),
			instance_id: request.instance_id,
			plan_id: request.plan_id,
		};

		let _guard = self.lock.lock().await;
		let teardown = provider.deprovision_bundle(&ctx);
		let provisioned = provider.provision_bundle(&ctx);
		info!(namespace = %ctx.namespace, "Deprovisioning service instance");

		if self.runs_async(request.accepts_incomplete) {
			let orchestrator = self.orchestrator.clone();
			self.tasks.spawn(OperationKey::deprovision(&ctx.instance_id), async move {
				orchestrator.create(teardown).await?;
				orchestrator.delete(&provisioned).await
			});
			return Ok(OperationResponse { is_async: true });
		}

		self.orchestrator.create(teardown).await?;
		self.orchestrator.delete(&provisioned).await?;
		Ok(OperationResponse::default())
	}

	/// Bind work always runs in the background. The returned credentials come
	/// from the bundle in memory, not from the cluster.
	#[instrument(skip(self, request), fields(service_id = %request.service_id, binding_id = %request.binding_id))]
	pub async fn bind(&self, request: BindRequest) -> Result<BindResponse, BrokerError> {
		let provider = self.provider(&request.service_id)?;
		let ctx = BindingContext {
			namespace: request
				.namespace
				.filter(|ns| !ns.is_empty())
				.unwrap_or_else(|| self.config.namespace.clone()),
			global_namespace: self.config.namespace.clone(),
			binding_id: request.binding_id,
			instance_id: request.instance_id,
			bound_credentials: BTreeMap::new(),
		};

		let _guard = self.lock.lock().await;
		let bundle = provider.bind_bundle(&ctx);
		let credentials = provider.binding_credentials(&bundle);
		info!(namespace = %ctx.namespace, "Binding service instance");

		let orchestrator = self.orchestrator.clone();
		self.tasks.spawn(
			OperationKey::bind(&ctx.instance_id, &ctx.binding_id),
			async move { orchestrator.create(bundle).await },
		);

		Ok(BindResponse {
			credentials,
			is_async: self.runs_async(request.accepts_incomplete),
		})
	}

	/// Revokes a binding. The binding secret supplies the namespace, the
	/// instance id when the request has none, and the values the revoke job
	/// needs. A binding whose secret is already gone is treated as unbound.
	#[instrument(skip(self, request), fields(binding_id = %request.binding_id))]
	pub async fn unbind(&self, request: UnbindRequest) -> Result<OperationResponse, BrokerError> {
		let secrets = self
			.client
			.list_secrets(&binding_selector(&request.binding_id))
			.await?;
		let existing = secrets.first();

		let requested = request
			.service_id
			.as_deref()
			.filter(|id| self.catalog.get(id).is_some());
		let service_id = requested
			.or_else(|| existing.and_then(|secret| label(secret, SERVICE_ID_LABEL)))
			.or(request.service_id.as_deref())
			.unwrap_or_default();
		let provider = self.provider(service_id)?;

		let Some(existing) = existing else {
			debug!("No binding secret found; binding already removed");
			return Ok(OperationResponse::default());
		};

		let ctx = BindingContext {
			instance_id: request
				.instance_id
				.clone()
				.or_else(|| label(existing, SERVICE_INSTANCE_ID_LABEL).map(str::to_string))
				.unwrap_or_default(),
			namespace: existing
				.metadata
				.namespace
				.clone()
				.unwrap_or_else(|| self.config.namespace.clone()),
			global_namespace: self.config.namespace.clone(),
			bound_credentials: secret_string_data(existing),
			binding_id: request.binding_id,
		};

		let _guard = self.lock.lock().await;
		let revoke = provider.debind_bundle(&ctx);
		let granted = provider.bind_bundle(&ctx);
		info!(namespace = %ctx.namespace, instance_id = %ctx.instance_id, "Unbinding service instance");

		self.orchestrator.create(revoke).await?;
		self.orchestrator.delete(&granted).await?;
		Ok(OperationResponse::default())
	}

	/// Plans are fixed, so an update changes nothing.
	pub fn update(&self, request: &UpdateRequest) -> OperationResponse {
		debug!(instance_id = %request.instance_id, "Ignoring update request");
		OperationResponse {
			is_async: self.runs_async(request.accepts_incomplete),
		}
	}

	/// Operation state is not tracked, so there is never anything to report.
	pub fn last_operation(&self, request: &LastOperationRequest) {
		debug!(instance_id = %request.instance_id, "Last operation polled");
	}
}

fn label<'a>(secret: &'a Secret, key: &str) -> Option<&'a str> {
	secret
		.metadata
		.labels
		.as_ref()
		.and_then(|labels| labels.get(key))
		.map(String::as_str)
}
