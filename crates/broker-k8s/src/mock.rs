// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`K8sClient`] for tests.
//!
//! Objects are stored per `(kind, namespace, name)`. Deployments and jobs are
//! given a status according to the configured [`ReadinessMode`], so readiness
//! polling can be exercised without a cluster. Every successful create and
//! delete is appended to an event log that tests use to assert ordering.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::client::K8sClient;
use crate::error::K8sError;
use crate::types::{
	ConfigMap, Deployment, DeploymentStatus, Job, JobStatus, ObjectKind, ObjectMeta,
	PersistentVolumeClaim, Secret, Service,
};

/// Operations that can be recorded or made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
	Create,
	Delete,
	Get,
	List,
}

/// A mutation observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockEvent {
	pub op: MockOp,
	pub kind: ObjectKind,
	pub namespace: String,
	pub name: String,
}

/// How deployments and jobs progress after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessMode {
	/// Created objects immediately report healthy / finished.
	#[default]
	Immediate,
	/// Objects report an empty status for this many reads, then healthy.
	AfterPolls(u32),
	/// Objects never progress unless a status is set explicitly.
	Never,
}

#[derive(Debug, Clone)]
enum StoredObject {
	Secret(Secret),
	ConfigMap(ConfigMap),
	PersistentVolumeClaim(PersistentVolumeClaim),
	Deployment(Deployment),
	Service(Service),
	Job(Job),
}

type ObjectKey = (ObjectKind, String, String);

#[derive(Default)]
struct MockState {
	objects: BTreeMap<ObjectKey, StoredObject>,
	reads: HashMap<ObjectKey, u32>,
	failures: HashSet<(MockOp, ObjectKind, String)>,
	events: Vec<MockEvent>,
	readiness: ReadinessMode,
}

#[derive(Default)]
pub struct MockK8sClient {
	state: Mutex<MockState>,
}

impl MockK8sClient {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_readiness(readiness: ReadinessMode) -> Self {
		let mock = Self::default();
		mock.state().readiness = readiness;
		mock
	}

	fn state(&self) -> MutexGuard<'_, MockState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Make the given operation fail for an object. `List` failures are keyed
	/// by the label selector instead of a name.
	pub fn fail_on(&self, op: MockOp, kind: ObjectKind, name: &str) {
		self.state().failures.insert((op, kind, name.to_string()));
	}

	pub fn clear_failures(&self) {
		self.state().failures.clear();
	}

	/// Store a secret without recording an event.
	pub fn insert_secret(&self, namespace: &str, mut secret: Secret) {
		let name = secret.metadata.name.clone().unwrap_or_default();
		secret.metadata.namespace = Some(namespace.to_string());
		self.state().objects.insert(
			(ObjectKind::Secret, namespace.to_string(), name),
			StoredObject::Secret(secret),
		);
	}

	pub fn set_deployment_status(&self, namespace: &str, name: &str, status: DeploymentStatus) {
		let key = (ObjectKind::Deployment, namespace.to_string(), name.to_string());
		if let Some(StoredObject::Deployment(deployment)) = self.state().objects.get_mut(&key) {
			deployment.status = Some(status);
		}
	}

	pub fn set_job_status(&self, namespace: &str, name: &str, status: JobStatus) {
		let key = (ObjectKind::Job, namespace.to_string(), name.to_string());
		if let Some(StoredObject::Job(job)) = self.state().objects.get_mut(&key) {
			job.status = Some(status);
		}
	}

	pub fn events(&self) -> Vec<MockEvent> {
		self.state().events.clone()
	}

	pub fn contains(&self, kind: ObjectKind, namespace: &str, name: &str) -> bool {
		self
			.state()
			.objects
			.contains_key(&(kind, namespace.to_string(), name.to_string()))
	}

	pub fn object_count(&self) -> usize {
		self.state().objects.len()
	}

	/// Names of stored objects of one kind as `(namespace, name)` pairs.
	pub fn names(&self, kind: ObjectKind) -> Vec<(String, String)> {
		self
			.state()
			.objects
			.keys()
			.filter(|(k, _, _)| *k == kind)
			.map(|(_, ns, name)| (ns.clone(), name.clone()))
			.collect()
	}

	pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
		let key = (ObjectKind::Secret, namespace.to_string(), name.to_string());
		match self.state().objects.get(&key) {
			Some(StoredObject::Secret(secret)) => Some(secret.clone()),
			_ => None,
		}
	}

	pub fn deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
		let key = (ObjectKind::Deployment, namespace.to_string(), name.to_string());
		match self.state().objects.get(&key) {
			Some(StoredObject::Deployment(deployment)) => Some(deployment.clone()),
			_ => None,
		}
	}

	pub fn job(&self, namespace: &str, name: &str) -> Option<Job> {
		let key = (ObjectKind::Job, namespace.to_string(), name.to_string());
		match self.state().objects.get(&key) {
			Some(StoredObject::Job(job)) => Some(job.clone()),
			_ => None,
		}
	}

	fn check_failure(
		state: &MockState,
		op: MockOp,
		kind: ObjectKind,
		name: &str,
	) -> Result<(), K8sError> {
		if state.failures.contains(&(op, kind, name.to_string())) {
			return Err(K8sError::ApiError {
				message: format!("injected {op:?} failure for {kind} {name}"),
			});
		}
		Ok(())
	}

	fn insert(
		&self,
		kind: ObjectKind,
		namespace: &str,
		metadata: &mut ObjectMeta,
		object: impl FnOnce(&ObjectMeta, ReadinessMode) -> StoredObject,
	) -> Result<StoredObject, K8sError> {
		let mut state = self.state();
		let name = metadata.name.clone().unwrap_or_default();
		Self::check_failure(&state, MockOp::Create, kind, &name)?;

		let key = (kind, namespace.to_string(), name.clone());
		if state.objects.contains_key(&key) {
			return Err(K8sError::AlreadyExists {
				kind,
				namespace: namespace.to_string(),
				name,
			});
		}

		metadata.namespace = Some(namespace.to_string());
		let stored = object(metadata, state.readiness);
		state.objects.insert(key, stored.clone());
		state.events.push(MockEvent {
			op: MockOp::Create,
			kind,
			namespace: namespace.to_string(),
			name,
		});
		Ok(stored)
	}

	fn read(&self, kind: ObjectKind, name: &str, namespace: &str) -> Result<StoredObject, K8sError> {
		let mut state = self.state();
		Self::check_failure(&state, MockOp::Get, kind, name)?;

		let key = (kind, namespace.to_string(), name.to_string());
		let reads = {
			let count = state.reads.entry(key.clone()).or_insert(0);
			*count += 1;
			*count
		};
		let readiness = state.readiness;

		let Some(stored) = state.objects.get_mut(&key) else {
			return Err(K8sError::NotFound {
				kind,
				namespace: namespace.to_string(),
				name: name.to_string(),
			});
		};

		if let ReadinessMode::AfterPolls(polls) = readiness {
			if reads > polls {
				match stored {
					StoredObject::Deployment(deployment) => {
						deployment.status = Some(ready_deployment_status(deployment));
					}
					StoredObject::Job(job) => job.status = Some(finished_job_status()),
					_ => {}
				}
			}
		}
		Ok(stored.clone())
	}
}

fn ready_deployment_status(deployment: &Deployment) -> DeploymentStatus {
	let replicas = deployment
		.spec
		.as_ref()
		.and_then(|spec| spec.replicas)
		.unwrap_or(1);
	DeploymentStatus {
		replicas: Some(replicas),
		ready_replicas: Some(replicas),
		available_replicas: Some(replicas),
		unavailable_replicas: None,
		..Default::default()
	}
}

fn finished_job_status() -> JobStatus {
	JobStatus {
		active: Some(0),
		succeeded: Some(1),
		..Default::default()
	}
}

fn selector_matches(selector: &str, labels: Option<&BTreeMap<String, String>>) -> bool {
	selector
		.split(',')
		.map(str::trim)
		.filter(|term| !term.is_empty())
		.all(|term| match term.split_once('=') {
			Some((key, value)) => labels
				.and_then(|labels| labels.get(key.trim()))
				.is_some_and(|v| v == value.trim()),
			None => labels.is_some_and(|labels| labels.contains_key(term)),
		})
}

fn unexpected(kind: ObjectKind) -> K8sError {
	K8sError::ApiError {
		message: format!("mock stored unexpected object for {kind}"),
	}
}

#[async_trait]
impl K8sClient for MockK8sClient {
	async fn create_secret(&self, namespace: &str, mut secret: Secret) -> Result<Secret, K8sError> {
		let mut metadata = std::mem::take(&mut secret.metadata);
		match self.insert(ObjectKind::Secret, namespace, &mut metadata, |meta, _| {
			StoredObject::Secret(Secret {
				metadata: meta.clone(),
				..secret
			})
		})? {
			StoredObject::Secret(secret) => Ok(secret),
			_ => Err(unexpected(ObjectKind::Secret)),
		}
	}

	async fn create_config_map(
		&self,
		namespace: &str,
		mut config_map: ConfigMap,
	) -> Result<ConfigMap, K8sError> {
		let mut metadata = std::mem::take(&mut config_map.metadata);
		match self.insert(ObjectKind::ConfigMap, namespace, &mut metadata, |meta, _| {
			StoredObject::ConfigMap(ConfigMap {
				metadata: meta.clone(),
				..config_map
			})
		})? {
			StoredObject::ConfigMap(config_map) => Ok(config_map),
			_ => Err(unexpected(ObjectKind::ConfigMap)),
		}
	}

	async fn create_persistent_volume_claim(
		&self,
		namespace: &str,
		mut claim: PersistentVolumeClaim,
	) -> Result<PersistentVolumeClaim, K8sError> {
		let mut metadata = std::mem::take(&mut claim.metadata);
		match self.insert(
			ObjectKind::PersistentVolumeClaim,
			namespace,
			&mut metadata,
			|meta, _| {
				StoredObject::PersistentVolumeClaim(PersistentVolumeClaim {
					metadata: meta.clone(),
					..claim
				})
			},
		)? {
			StoredObject::PersistentVolumeClaim(claim) => Ok(claim),
			_ => Err(unexpected(ObjectKind::PersistentVolumeClaim)),
		}
	}

	async fn create_deployment(
		&self,
		namespace: &str,
		mut deployment: Deployment,
	) -> Result<Deployment, K8sError> {
		let mut metadata = std::mem::take(&mut deployment.metadata);
		match self.insert(
			ObjectKind::Deployment,
			namespace,
			&mut metadata,
			|meta, readiness| {
				let mut stored = Deployment {
					metadata: meta.clone(),
					status: None,
					..deployment
				};
				if readiness == ReadinessMode::Immediate {
					stored.status = Some(ready_deployment_status(&stored));
				}
				StoredObject::Deployment(stored)
			},
		)? {
			StoredObject::Deployment(deployment) => Ok(deployment),
			_ => Err(unexpected(ObjectKind::Deployment)),
		}
	}

	async fn create_service(&self, namespace: &str, mut service: Service) -> Result<Service, K8sError> {
		let mut metadata = std::mem::take(&mut service.metadata);
		match self.insert(ObjectKind::Service, namespace, &mut metadata, |meta, _| {
			StoredObject::Service(Service {
				metadata: meta.clone(),
				..service
			})
		})? {
			StoredObject::Service(service) => Ok(service),
			_ => Err(unexpected(ObjectKind::Service)),
		}
	}

	async fn create_job(&self, namespace: &str, mut job: Job) -> Result<Job, K8sError> {
		let mut metadata = std::mem::take(&mut job.metadata);
		match self.insert(ObjectKind::Job, namespace, &mut metadata, |meta, readiness| {
			let mut stored = Job {
				metadata: meta.clone(),
				status: None,
				..job
			};
			if readiness == ReadinessMode::Immediate {
				stored.status = Some(finished_job_status());
			}
			StoredObject::Job(stored)
		})? {
			StoredObject::Job(job) => Ok(job),
			_ => Err(unexpected(ObjectKind::Job)),
		}
	}

	async fn delete(&self, kind: ObjectKind, name: &str, namespace: &str) -> Result<(), K8sError> {
		let mut state = self.state();
		Self::check_failure(&state, MockOp::Delete, kind, name)?;

		let key = (kind, namespace.to_string(), name.to_string());
		if state.objects.remove(&key).is_none() {
			return Err(K8sError::NotFound {
				kind,
				namespace: namespace.to_string(),
				name: name.to_string(),
			});
		}
		state.reads.remove(&key);
		state.events.push(MockEvent {
			op: MockOp::Delete,
			kind,
			namespace: namespace.to_string(),
			name: name.to_string(),
		});
		Ok(())
	}

	async fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, K8sError> {
		match self.read(ObjectKind::Deployment, name, namespace)? {
			StoredObject::Deployment(deployment) => Ok(deployment),
			_ => Err(unexpected(ObjectKind::Deployment)),
		}
	}

	async fn get_job(&self, name: &str, namespace: &str) -> Result<Job, K8sError> {
		match self.read(ObjectKind::Job, name, namespace)? {
			StoredObject::Job(job) => Ok(job),
			_ => Err(unexpected(ObjectKind::Job)),
		}
	}

	async fn list_secrets(&self, label_selector: &str) -> Result<Vec<Secret>, K8sError> {
		let state = self.state();
		Self::check_failure(&state, MockOp::List, ObjectKind::Secret, label_selector)?;
		Ok(
			state
				.objects
				.values()
				.filter_map(|stored| match stored {
					StoredObject::Secret(secret)
						if selector_matches(label_selector, secret.metadata.labels.as_ref()) =>
					{
						Some(secret.clone())
					}
					_ => None,
				})
				.collect(),
		)
	}
}
