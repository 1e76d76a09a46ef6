// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioner error types.

use broker_k8s::ObjectKind;

/// Errors that can occur while creating or deleting a resource bundle.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionerError {
	/// Bundle has no target namespace
	#[error("Resource bundle has an empty namespace")]
	EmptyNamespace,

	/// Object without a name
	#[error("{kind} in resource bundle has no name")]
	MissingName { kind: ObjectKind },

	/// Two objects of the same kind share a name
	#[error("Duplicate {kind} name in resource bundle: {name}")]
	DuplicateName { kind: ObjectKind, name: String },

	/// Deployment or job did not become ready in time
	#[error("{kind} {namespace}/{name} not ready after {timeout_secs}s")]
	ReadinessTimeout {
		kind: ObjectKind,
		namespace: String,
		name: String,
		timeout_secs: u64,
	},

	/// Kubernetes error
	#[error(transparent)]
	K8sError(#[from] broker_k8s::K8sError),
}
