// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! K8s client abstraction for service broker provisioning.
//!
//! This crate provides:
//! - A trait-based client over the six object kinds a resource bundle may hold
//! - Production implementation using the kube crate
//! - An in-memory [`MockK8sClient`] used by the provisioner and server tests

mod client;
mod error;
mod kube_client;
pub mod mock;
mod types;

pub use client::K8sClient;
pub use error::{K8sError, K8sResult};
pub use kube_client::KubeClient;
pub use mock::{MockEvent, MockK8sClient, MockOp, ReadinessMode};
pub use types::{
	ByteString, ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, Deployment,
	DeploymentSpec, DeploymentStatus, EnvVar, EnvVarSource, IntOrString, Job, JobSpec, JobStatus,
	LabelSelector, ObjectKind, ObjectMeta, PersistentVolumeClaim, PersistentVolumeClaimSpec,
	PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec, Probe, Quantity, Secret,
	SecretKeySelector, Service, ServicePort, ServiceSpec, TCPSocketAction, Volume, VolumeMount,
	VolumeResourceRequirements,
};
