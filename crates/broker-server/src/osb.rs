// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Open Service Broker v2 request and response bodies.

use std::collections::BTreeMap;

use broker_services::ServiceDefinition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
	pub services: Vec<ServiceDefinition>,
}

/// Platform context attached to provision and bind requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformContext {
	#[serde(default)]
	pub platform: Option<String>,
	#[serde(default)]
	pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionBody {
	pub service_id: String,
	pub plan_id: String,
	#[serde(default)]
	pub context: Option<PlatformContext>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
	pub service_id: String,
	#[serde(default)]
	pub plan_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BindBody {
	pub service_id: String,
	pub plan_id: String,
	#[serde(default)]
	pub context: Option<PlatformContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AcceptsIncompleteQuery {
	#[serde(default)]
	pub accepts_incomplete: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeprovisionQuery {
	pub service_id: String,
	pub plan_id: String,
	#[serde(default)]
	pub accepts_incomplete: bool,
}

#[derive(Debug, Deserialize)]
pub struct UnbindQuery {
	#[serde(default)]
	pub service_id: Option<String>,
	#[serde(default)]
	pub plan_id: Option<String>,
}

/// `{}`, the body for completed and accepted operations alike.
#[derive(Debug, Default, Serialize)]
pub struct EmptyResponse {}

#[derive(Debug, Serialize)]
pub struct BindResponseBody {
	pub credentials: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
}

impl PlatformContext {
	pub fn namespace(context: Option<Self>) -> Option<String> {
		context.and_then(|ctx| ctx.namespace).filter(|ns| !ns.is_empty())
	}
}
