// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Externally hosted MySQL servers offered as `mysql-shared-<name>` services.
//!
//! Only read from the config file:
//!
//! ```toml
//! [[shared_mysql]]
//! name = "main"
//! id = "0d6c2d9a-6a43-4d0e-9b1e-0e8f6f0d2a11"
//! user = "root"
//! password = "changeme"
//! host = "mysql.example.internal"
//! port = 3306
//! ```

use std::collections::HashSet;

use broker_common_secret::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

fn default_port() -> u16 {
	3306
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SharedMysqlConfig {
	pub name: String,
	pub id: String,
	pub user: String,
	pub password: SecretString,
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
}

/// Checks every entry is addressable and ids are unique.
pub fn validate_shared_mysql(entries: &[SharedMysqlConfig]) -> Result<(), ConfigError> {
	let mut ids = HashSet::new();
	for (index, entry) in entries.iter().enumerate() {
		for (field, value) in [
			("name", &entry.name),
			("id", &entry.id),
			("host", &entry.host),
		] {
			if value.trim().is_empty() {
				return Err(ConfigError::InvalidValue {
					key: format!("shared_mysql[{index}].{field}"),
					message: "must not be empty".to_string(),
				});
			}
		}
		if !ids.insert(entry.id.as_str()) {
			return Err(ConfigError::Validation(format!(
				"duplicate shared_mysql id '{}'",
				entry.id
			)));
		}
	}
	Ok(())
}
