// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use broker_provisioner::ResourceBundle;

use crate::definition::ServiceDefinition;
use crate::templates::secret_string_data;

/// Inputs for one provision or deprovision call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstanceContext {
	pub instance_id: String,
	pub plan_id: String,
	/// Namespace the instance lives in.
	pub namespace: String,
	/// The broker's own namespace, used by shared backends.
	pub global_namespace: String,
}

/// Inputs for one bind or unbind call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingContext {
	pub binding_id: String,
	pub instance_id: String,
	pub namespace: String,
	pub global_namespace: String,
	/// Values read back from an existing binding secret on unbind. Debind
	/// bundles prefer these over referencing the binding secret.
	pub bound_credentials: BTreeMap<String, String>,
}

/// A backend that knows how to describe its instances and bindings as
/// resource bundles.
///
/// Bundle builders are pure: they never touch the cluster. Object names are
/// deterministic in the instance and binding ids, so the bundle built for
/// provisioning can be rebuilt later to delete the same objects. Credentials
/// are freshly generated on every call.
pub trait ServiceProvider: Send + Sync {
	fn definition(&self) -> &ServiceDefinition;

	/// In-cluster address clients use to reach an instance.
	fn host(&self, instance_id: &str, namespace: &str) -> String;

	fn provision_bundle(&self, ctx: &ServiceInstanceContext) -> ResourceBundle;

	fn deprovision_bundle(&self, ctx: &ServiceInstanceContext) -> ResourceBundle;

	fn bind_bundle(&self, ctx: &BindingContext) -> ResourceBundle;

	fn debind_bundle(&self, ctx: &BindingContext) -> ResourceBundle;

	/// Credentials handed back to the platform for a bind bundle: the data of
	/// its first secret.
	fn binding_credentials(&self, bundle: &ResourceBundle) -> BTreeMap<String, String> {
		bundle
			.secrets
			.first()
			.map(secret_string_data)
			.unwrap_or_default()
	}
}
