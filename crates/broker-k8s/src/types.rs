// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

pub use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStatus};
pub use k8s_openapi::api::batch::v1::{Job, JobSpec, JobStatus};
pub use k8s_openapi::api::core::v1::{
	ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, EnvVar, EnvVarSource,
	PersistentVolumeClaim, PersistentVolumeClaimSpec, PersistentVolumeClaimVolumeSource, PodSpec,
	PodTemplateSpec, Probe, Secret, SecretKeySelector, Service, ServicePort, ServiceSpec,
	TCPSocketAction, Volume, VolumeMount, VolumeResourceRequirements,
};
pub use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
pub use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
pub use k8s_openapi::ByteString;

/// The object kinds a resource bundle can contain.
///
/// Variants are declared in creation order; deletion walks them in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
	Secret,
	ConfigMap,
	PersistentVolumeClaim,
	Deployment,
	Service,
	Job,
}

impl ObjectKind {
	pub const CREATE_ORDER: [ObjectKind; 6] = [
		ObjectKind::Secret,
		ObjectKind::ConfigMap,
		ObjectKind::PersistentVolumeClaim,
		ObjectKind::Deployment,
		ObjectKind::Service,
		ObjectKind::Job,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ObjectKind::Secret => "Secret",
			ObjectKind::ConfigMap => "ConfigMap",
			ObjectKind::PersistentVolumeClaim => "PersistentVolumeClaim",
			ObjectKind::Deployment => "Deployment",
			ObjectKind::Service => "Service",
			ObjectKind::Job => "Job",
		}
	}
}

impl fmt::Display for ObjectKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
