// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{BrokerConfigLayer, HttpConfigLayer, LoggingConfigLayer, SharedMysqlConfig};

/// Broker configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrokerSettingsLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub broker: Option<BrokerConfigLayer>,
	/// Replaced wholesale by a later layer, never concatenated.
	#[serde(default)]
	pub shared_mysql: Option<Vec<SharedMysqlConfig>>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl BrokerSettingsLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: BrokerSettingsLayer) {
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(&mut self.broker, other.broker, BrokerConfigLayer::merge);
		if other.shared_mysql.is_some() {
			self.shared_mysql = other.shared_mysql;
		}
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
