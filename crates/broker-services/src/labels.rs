// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Labels stamped on provisioned objects.
//!
//! The dispatcher recovers instances and bindings by listing secrets with
//! these labels, so they are the broker's only persistent state.

use std::collections::BTreeMap;

use crate::definition::ServiceDefinition;
use crate::provider::{BindingContext, ServiceInstanceContext};

pub const SERVICE_INSTANCE_ID_LABEL: &str = "service-instance-id";
pub const SERVICE_ID_LABEL: &str = "service-id";
pub const SERVICE_NAME_LABEL: &str = "service-name";
pub const SERVICE_PLAN_LABEL: &str = "service-plan";
pub const SERVICE_BINDING_ID_LABEL: &str = "service-binding-id";

/// Pod selector label shared by a deployment and its service.
pub const APP_LABEL: &str = "app";

pub fn instance_selector(instance_id: &str) -> String {
	format!("{SERVICE_INSTANCE_ID_LABEL}={instance_id}")
}

pub fn binding_selector(binding_id: &str) -> String {
	format!("{SERVICE_BINDING_ID_LABEL}={binding_id}")
}

pub fn instance_labels(
	definition: &ServiceDefinition,
	ctx: &ServiceInstanceContext,
) -> BTreeMap<String, String> {
	BTreeMap::from([
		(SERVICE_INSTANCE_ID_LABEL.to_string(), ctx.instance_id.clone()),
		(SERVICE_ID_LABEL.to_string(), definition.id.clone()),
		(SERVICE_NAME_LABEL.to_string(), definition.name.clone()),
		(SERVICE_PLAN_LABEL.to_string(), ctx.plan_id.clone()),
	])
}

pub fn binding_labels(
	definition: &ServiceDefinition,
	ctx: &BindingContext,
) -> BTreeMap<String, String> {
	BTreeMap::from([
		(SERVICE_BINDING_ID_LABEL.to_string(), ctx.binding_id.clone()),
		(SERVICE_INSTANCE_ID_LABEL.to_string(), ctx.instance_id.clone()),
		(SERVICE_ID_LABEL.to_string(), definition.id.clone()),
		(SERVICE_NAME_LABEL.to_string(), definition.name.clone()),
	])
}
