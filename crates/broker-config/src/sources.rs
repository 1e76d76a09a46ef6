// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::BrokerSettingsLayer;
use crate::sections::{BrokerConfigLayer, HttpConfigLayer, LoggingConfigLayer};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/service-broker/broker.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<BrokerSettingsLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<BrokerSettingsLayer, ConfigError> {
		debug!("loading defaults");
		Ok(BrokerSettingsLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<BrokerSettingsLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(BrokerSettingsLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: BrokerSettingsLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: BROKER_<FIELD>. Shared MySQL servers are file-only.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<BrokerSettingsLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(BrokerSettingsLayer {
			http: Some(load_http_from_env()?),
			broker: Some(load_broker_from_env()?),
			shared_mysql: None,
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("BROKER_HOST"),
		port: env_u16("BROKER_PORT")?,
	})
}

fn load_broker_from_env() -> Result<BrokerConfigLayer, ConfigError> {
	Ok(BrokerConfigLayer {
		namespace: env_var("BROKER_NAMESPACE"),
		async_enabled: env_bool("BROKER_ASYNC"),
		ready_timeout_secs: env_u64("BROKER_READY_TIMEOUT_SECS")?,
		poll_interval_ms: env_u64("BROKER_POLL_INTERVAL_MS")?,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("BROKER_LOG_LEVEL"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_toml_file_is_skipped() {
		let layer = TomlSource::new("/nonexistent/broker.toml").load().unwrap();
		assert!(layer.broker.is_none());
	}

	#[test]
	fn test_toml_source_parses_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[http]
port = 9090

[broker]
namespace = "brokered"
async_enabled = true

[[shared_mysql]]
name = "main"
id = "shared-main"
user = "root"
password = "hunter2"
host = "mysql.internal"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9090));
		let broker = layer.broker.unwrap();
		assert_eq!(broker.namespace.as_deref(), Some("brokered"));
		assert_eq!(broker.async_enabled, Some(true));
		let shared = layer.shared_mysql.unwrap();
		assert_eq!(shared.len(), 1);
		assert_eq!(shared[0].port, 3306);
		assert_eq!(shared[0].password.expose(), "hunter2");
	}

	#[test]
	fn test_invalid_toml_reports_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[broker\nnamespace = ").unwrap();
		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_helpers_parse_and_reject() {
		std::env::set_var("BROKER_CONFIG_TEST_U16", "8081");
		std::env::set_var("BROKER_CONFIG_TEST_BAD_U64", "soon");
		std::env::set_var("BROKER_CONFIG_TEST_BOOL", "TRUE");
		std::env::set_var("BROKER_CONFIG_TEST_EMPTY", "");

		assert_eq!(env_u16("BROKER_CONFIG_TEST_U16").unwrap(), Some(8081));
		assert!(matches!(
			env_u64("BROKER_CONFIG_TEST_BAD_U64"),
			Err(ConfigError::InvalidValue { .. })
		));
		assert_eq!(env_bool("BROKER_CONFIG_TEST_BOOL"), Some(true));
		assert_eq!(env_var("BROKER_CONFIG_TEST_EMPTY"), None);
		assert_eq!(env_u64("BROKER_CONFIG_TEST_UNSET").unwrap(), None);
	}
}
