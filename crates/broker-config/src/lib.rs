// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the service broker.
//!
//! Layered from built-in defaults, a TOML file and `BROKER_*` environment
//! variables, in increasing precedence.
//!
//! # Usage
//!
//! ```ignore
//! use broker_config::load_config;
//!
//! let config = load_config()?;
//! println!("Broker listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::BrokerSettingsLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved broker configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrokerSettings {
	pub http: HttpConfig,
	pub broker: BrokerConfig,
	pub shared_mysql: Vec<SharedMysqlConfig>,
	pub logging: LoggingConfig,
}

impl BrokerSettings {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`BROKER_*`)
/// 2. Config file (`/etc/service-broker/broker.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<BrokerSettings, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<BrokerSettings, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<BrokerSettings, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = BrokerSettingsLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: BrokerSettingsLayer) -> Result<BrokerSettings, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let broker = layer.broker.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();
	let shared_mysql = layer.shared_mysql.unwrap_or_default();

	validate_shared_mysql(&shared_mysql)?;

	info!(
		host = %http.host,
		port = http.port,
		namespace = %broker.namespace,
		async_enabled = broker.async_enabled,
		ready_timeout_secs = broker.ready_timeout_secs,
		shared_mysql = shared_mysql.len(),
		"Broker configuration loaded"
	);

	Ok(BrokerSettings {
		http,
		broker,
		shared_mysql,
		logging,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_finalize_defaults() {
		let settings = finalize(BrokerSettingsLayer::default()).unwrap();
		assert_eq!(settings, BrokerSettings::default());
		assert_eq!(settings.socket_addr(), "0.0.0.0:8080");
		assert!(settings.shared_mysql.is_empty());
	}

	#[test]
	fn test_finalize_rejects_duplicate_shared_ids() {
		let toml = r#"
[[shared_mysql]]
name = "a"
id = "same"
user = "root"
password = "x"
host = "db-a"

[[shared_mysql]]
name = "b"
id = "same"
user = "root"
password = "y"
host = "db-b"
"#;
		let layer: BrokerSettingsLayer = toml::from_str(toml).unwrap();
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	proptest! {
		#[test]
		fn prop_file_values_survive_finalize(port in 1u16.., timeout in 1u64..3600, ns in "[a-z][a-z0-9-]{0,20}") {
			let layer = BrokerSettingsLayer {
				http: Some(HttpConfigLayer { host: None, port: Some(port) }),
				broker: Some(BrokerConfigLayer {
					namespace: Some(ns.clone()),
					ready_timeout_secs: Some(timeout),
					..Default::default()
				}),
				..Default::default()
			};
			let settings = finalize(layer).unwrap();
			prop_assert_eq!(settings.http.port, port);
			prop_assert_eq!(settings.broker.namespace, ns);
			prop_assert_eq!(settings.broker.ready_timeout_secs, timeout);
		}
	}
}
