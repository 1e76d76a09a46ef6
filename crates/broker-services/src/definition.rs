// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

/// Catalog entry advertised for one service, serialized in the Open Service
/// Broker catalog shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
	pub id: String,
	pub name: String,
	pub description: String,
	pub bindable: bool,
	pub metadata: ServiceMetadata,
	pub plans: Vec<ServicePlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
	pub display_name: String,
	pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePlan {
	pub id: String,
	pub name: String,
	pub description: String,
	pub free: bool,
}

impl ServicePlan {
	/// The single free plan every built-in service offers.
	pub fn default_plan(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: "default".to_string(),
			description: "The default plan".to_string(),
			free: true,
		}
	}
}

impl ServiceDefinition {
	pub fn plan(&self, plan_id: &str) -> Option<&ServicePlan> {
		self.plans.iter().find(|plan| plan.id == plan_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_serializes_in_catalog_shape() {
		let definition = ServiceDefinition {
			id: "svc-1".to_string(),
			name: "demo".to_string(),
			description: "A demo".to_string(),
			bindable: true,
			metadata: ServiceMetadata {
				display_name: "Demo".to_string(),
				image_url: "https://example.com/logo.png".to_string(),
			},
			plans: vec![ServicePlan::default_plan("plan-1")],
		};

		assert_eq!(
			serde_json::to_value(&definition).unwrap(),
			json!({
				"id": "svc-1",
				"name": "demo",
				"description": "A demo",
				"bindable": true,
				"metadata": {
					"displayName": "Demo",
					"imageUrl": "https://example.com/logo.png"
				},
				"plans": [{
					"id": "plan-1",
					"name": "default",
					"description": "The default plan",
					"free": true
				}]
			})
		);
		assert!(definition.plan("plan-1").is_some());
		assert!(definition.plan("other").is_none());
	}
}
