// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::{
	api::{Api, DeleteParams, ListParams, PostParams},
	Client, Resource,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::client::K8sClient;
use crate::error::K8sError;
use crate::types::{ConfigMap, Deployment, Job, ObjectKind, PersistentVolumeClaim, Secret, Service};

/// Production K8s client implementation using the kube crate.
pub struct KubeClient {
	client: Client,
}

impl KubeClient {
	/// Create a new KubeClient that auto-discovers cluster configuration.
	///
	/// This will attempt to load config from:
	/// 1. In-cluster service account (when running in K8s)
	/// 2. KUBECONFIG environment variable
	/// 3. ~/.kube/config
	pub async fn new() -> Result<Self, K8sError> {
		let client = Client::try_default().await?;
		debug!("K8s client initialized");
		Ok(Self { client })
	}

	async fn create_namespaced<K>(
		&self,
		kind: ObjectKind,
		namespace: &str,
		object: K,
	) -> Result<K, K8sError>
	where
		K: Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned + Serialize,
		<K as Resource>::DynamicType: Default,
	{
		let name = object.meta().name.clone().unwrap_or_default();
		let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
		match api.create(&PostParams::default(), &object).await {
			Ok(created) => {
				debug!(%kind, namespace, name = %name, "object created");
				Ok(created)
			}
			Err(kube::Error::Api(err)) if err.code == 409 => Err(K8sError::AlreadyExists {
				kind,
				namespace: namespace.into(),
				name,
			}),
			Err(e) => Err(e.into()),
		}
	}

	async fn delete_namespaced<K>(
		&self,
		kind: ObjectKind,
		name: &str,
		namespace: &str,
	) -> Result<(), K8sError>
	where
		K: Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned,
		<K as Resource>::DynamicType: Default,
	{
		let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
		match api.delete(name, &DeleteParams::foreground()).await {
			Ok(_) => {
				debug!(%kind, namespace, name, "object deleted");
				Ok(())
			}
			Err(kube::Error::Api(err)) if err.code == 404 => Err(K8sError::NotFound {
				kind,
				namespace: namespace.into(),
				name: name.into(),
			}),
			Err(e) => Err(e.into()),
		}
	}

	async fn get_namespaced<K>(
		&self,
		kind: ObjectKind,
		name: &str,
		namespace: &str,
	) -> Result<K, K8sError>
	where
		K: Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned,
		<K as Resource>::DynamicType: Default,
	{
		let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
		match api.get(name).await {
			Ok(object) => Ok(object),
			Err(kube::Error::Api(err)) if err.code == 404 => Err(K8sError::NotFound {
				kind,
				namespace: namespace.into(),
				name: name.into(),
			}),
			Err(e) => Err(e.into()),
		}
	}
}

#[async_trait]
impl K8sClient for KubeClient {
	async fn create_secret(&self, namespace: &str, secret: Secret) -> Result<Secret, K8sError> {
		self
			.create_namespaced(ObjectKind::Secret, namespace, secret)
			.await
	}

	async fn create_config_map(
		&self,
		namespace: &str,
		config_map: ConfigMap,
	) -> Result<ConfigMap, K8sError> {
		self
			.create_namespaced(ObjectKind::ConfigMap, namespace, config_map)
			.await
	}

	async fn create_persistent_volume_claim(
		&self,
		namespace: &str,
		claim: PersistentVolumeClaim,
	) -> Result<PersistentVolumeClaim, K8sError> {
		self
			.create_namespaced(ObjectKind::PersistentVolumeClaim, namespace, claim)
			.await
	}

	async fn create_deployment(
		&self,
		namespace: &str,
		deployment: Deployment,
	) -> Result<Deployment, K8sError> {
		self
			.create_namespaced(ObjectKind::Deployment, namespace, deployment)
			.await
	}

	async fn create_service(&self, namespace: &str, service: Service) -> Result<Service, K8sError> {
		self
			.create_namespaced(ObjectKind::Service, namespace, service)
			.await
	}

	async fn create_job(&self, namespace: &str, job: Job) -> Result<Job, K8sError> {
		self.create_namespaced(ObjectKind::Job, namespace, job).await
	}

	#[instrument(skip(self))]
	async fn delete(&self, kind: ObjectKind, name: &str, namespace: &str) -> Result<(), K8sError> {
		match kind {
			ObjectKind::Secret => self.delete_namespaced::<Secret>(kind, name, namespace).await,
			ObjectKind::ConfigMap => {
				self
					.delete_namespaced::<ConfigMap>(kind, name, namespace)
					.await
			}
			ObjectKind::PersistentVolumeClaim => {
				self
					.delete_namespaced::<PersistentVolumeClaim>(kind, name, namespace)
					.await
			}
			ObjectKind::Deployment => {
				self
					.delete_namespaced::<Deployment>(kind, name, namespace)
					.await
			}
			ObjectKind::Service => self.delete_namespaced::<Service>(kind, name, namespace).await,
			ObjectKind::Job => self.delete_namespaced::<Job>(kind, name, namespace).await,
		}
	}

	async fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, K8sError> {
		self
			.get_namespaced(ObjectKind::Deployment, name, namespace)
			.await
	}

	async fn get_job(&self, name: &str, namespace: &str) -> Result<Job, K8sError> {
		self.get_namespaced(ObjectKind::Job, name, namespace).await
	}

	#[instrument(skip(self))]
	async fn list_secrets(&self, label_selector: &str) -> Result<Vec<Secret>, K8sError> {
		let secrets: Api<Secret> = Api::all(self.client.clone());
		let lp = ListParams::default().labels(label_selector);
		let list = secrets.list(&lp).await?;
		debug!(count = list.items.len(), "secrets listed");
		Ok(list.items)
	}
}
