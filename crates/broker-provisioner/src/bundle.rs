// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::{BTreeMap, HashSet};

use broker_k8s::{
	ConfigMap, Deployment, Job, ObjectKind, ObjectMeta, PersistentVolumeClaim, Secret, Service,
};

use crate::error::ProvisionerError;

/// A set of cluster objects created and deleted as a unit in one namespace.
///
/// `labels` is stamped onto every object before creation, which is what lets
/// the dispatcher later find a provisioned instance or binding by label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBundle {
	pub namespace: String,
	pub labels: BTreeMap<String, String>,
	pub secrets: Vec<Secret>,
	pub config_maps: Vec<ConfigMap>,
	pub volume_claims: Vec<PersistentVolumeClaim>,
	pub deployments: Vec<Deployment>,
	pub services: Vec<Service>,
	pub jobs: Vec<Job>,
}

impl ResourceBundle {
	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			..Default::default()
		}
	}

	pub fn is_empty(&self) -> bool {
		self.object_count() == 0
	}

	pub fn object_count(&self) -> usize {
		self.secrets.len()
			+ self.config_maps.len()
			+ self.volume_claims.len()
			+ self.deployments.len()
			+ self.services.len()
			+ self.jobs.len()
	}

	fn metadata(&self, kind: ObjectKind) -> Vec<&ObjectMeta> {
		match kind {
			ObjectKind::Secret => self.secrets.iter().map(|o| &o.metadata).collect(),
			ObjectKind::ConfigMap => self.config_maps.iter().map(|o| &o.metadata).collect(),
			ObjectKind::PersistentVolumeClaim => {
				self.volume_claims.iter().map(|o| &o.metadata).collect()
			}
			ObjectKind::Deployment => self.deployments.iter().map(|o| &o.metadata).collect(),
			ObjectKind::Service => self.services.iter().map(|o| &o.metadata).collect(),
			ObjectKind::Job => self.jobs.iter().map(|o| &o.metadata).collect(),
		}
	}

	fn metadata_mut(&mut self) -> impl Iterator<Item = &mut ObjectMeta> {
		self
			.secrets
			.iter_mut()
			.map(|o| &mut o.metadata)
			.chain(self.config_maps.iter_mut().map(|o| &mut o.metadata))
			.chain(self.volume_claims.iter_mut().map(|o| &mut o.metadata))
			.chain(self.deployments.iter_mut().map(|o| &mut o.metadata))
			.chain(self.services.iter_mut().map(|o| &mut o.metadata))
			.chain(self.jobs.iter_mut().map(|o| &mut o.metadata))
	}

	/// Names of the objects of one kind, in bundle order.
	pub fn names(&self, kind: ObjectKind) -> Vec<String> {
		self
			.metadata(kind)
			.into_iter()
			.map(|meta| meta.name.clone().unwrap_or_default())
			.collect()
	}

	/// Merge `labels` into the metadata labels of every object in the bundle.
	///
	/// Labels already present on an object under other keys are kept; a key
	/// present in `labels` takes the injected value. Applying the same labels
	/// twice leaves the bundle unchanged.
	pub fn inject_labels(&mut self, labels: &BTreeMap<String, String>) {
		if labels.is_empty() {
			return;
		}
		for meta in self.metadata_mut() {
			let existing = meta.labels.get_or_insert_with(BTreeMap::new);
			for (key, value) in labels {
				existing.insert(key.clone(), value.clone());
			}
		}
	}

	/// Check the invariants the orchestrator relies on before touching the
	/// cluster.
	pub fn validate(&self) -> Result<(), ProvisionerError> {
		if self.namespace.trim().is_empty() {
			return Err(ProvisionerError::EmptyNamespace);
		}
		for kind in ObjectKind::CREATE_ORDER {
			let mut seen = HashSet::new();
			for meta in self.metadata(kind) {
				let name = match meta.name.as_deref() {
					Some(name) if !name.is_empty() => name,
					_ => return Err(ProvisionerError::MissingName { kind }),
				};
				if !seen.insert(name) {
					return Err(ProvisionerError::DuplicateName {
						kind,
						name: name.to_string(),
					});
				}
			}
		}
		Ok(())
	}
}
