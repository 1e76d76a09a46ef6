// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dispatcher and orchestrator settings.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_NAMESPACE: &str = "service-broker";
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Broker configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
	/// Namespace for instances whose request carries none, and for shared
	/// backends' objects.
	pub namespace: String,
	/// Run provision and deprovision in the background when the platform
	/// accepts incomplete responses.
	pub async_enabled: bool,
	pub ready_timeout_secs: u64,
	pub poll_interval_ms: u64,
}

impl BrokerConfig {
	pub fn ready_timeout(&self) -> Duration {
		Duration::from_secs(self.ready_timeout_secs)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

impl Default for BrokerConfig {
	fn default() -> Self {
		Self {
			namespace: DEFAULT_NAMESPACE.to_string(),
			async_enabled: false,
			ready_timeout_secs: DEFAULT_READY_TIMEOUT_SECS,
			poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
		}
	}
}

/// Broker configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrokerConfigLayer {
	#[serde(default)]
	pub namespace: Option<String>,
	#[serde(default)]
	pub async_enabled: Option<bool>,
	#[serde(default)]
	pub ready_timeout_secs: Option<u64>,
	#[serde(default)]
	pub poll_interval_ms: Option<u64>,
}

impl BrokerConfigLayer {
	pub fn merge(&mut self, other: BrokerConfigLayer) {
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
		if other.async_enabled.is_some() {
			self.async_enabled = other.async_enabled;
		}
		if other.ready_timeout_secs.is_some() {
			self.ready_timeout_secs = other.ready_timeout_secs;
		}
		if other.poll_interval_ms.is_some() {
			self.poll_interval_ms = other.poll_interval_ms;
		}
	}

	pub fn finalize(self) -> Result<BrokerConfig, ConfigError> {
		let config = BrokerConfig {
			namespace: self
				.namespace
				.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
			async_enabled: self.async_enabled.unwrap_or(false),
			ready_timeout_secs: self.ready_timeout_secs.unwrap_or(DEFAULT_READY_TIMEOUT_SECS),
			poll_interval_ms: self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
		};

		if config.namespace.trim().is_empty() {
			return Err(ConfigError::Validation(
				"broker.namespace must not be empty".to_string(),
			));
		}
		if config.poll_interval_ms == 0 {
			return Err(ConfigError::InvalidValue {
				key: "broker.poll_interval_ms".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = BrokerConfigLayer::default().finalize().unwrap();
		assert_eq!(config, BrokerConfig::default());
		assert_eq!(config.ready_timeout(), Duration::from_secs(300));
		assert_eq!(config.poll_interval(), Duration::from_secs(1));
	}

	#[test]
	fn test_empty_namespace_is_rejected() {
		let layer = BrokerConfigLayer {
			namespace: Some("  ".to_string()),
			..Default::default()
		};
		assert!(matches!(layer.finalize(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_zero_poll_interval_is_rejected() {
		let layer = BrokerConfigLayer {
			poll_interval_ms: Some(0),
			..Default::default()
		};
		assert!(matches!(
			layer.finalize(),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
