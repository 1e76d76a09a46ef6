// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::Write;

use broker_config::{load_config_with_file, ConfigError};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

#[test]
fn test_load_config_with_file_resolves_sections() {
	let file = write_config(
		r#"
[http]
host = "127.0.0.1"
port = 8181

[broker]
namespace = "brokered"
ready_timeout_secs = 60
poll_interval_ms = 250

[[shared_mysql]]
name = "main"
id = "shared-main"
user = "admin"
password = "s3cret"
host = "mysql.internal"
port = 3307

[logging]
level = "debug"
"#,
	);

	let settings = load_config_with_file(file.path()).unwrap();
	assert_eq!(settings.socket_addr(), "127.0.0.1:8181");
	assert_eq!(settings.broker.namespace, "brokered");
	assert_eq!(settings.broker.ready_timeout_secs, 60);
	assert_eq!(settings.broker.poll_interval_ms, 250);
	assert_eq!(settings.logging.level, "debug");
	assert_eq!(settings.shared_mysql.len(), 1);
	assert_eq!(settings.shared_mysql[0].port, 3307);
	assert!(!format!("{settings:?}").contains("s3cret"));
}

#[test]
fn test_load_config_with_missing_file_uses_defaults() {
	let dir = tempfile::tempdir().unwrap();
	let settings = load_config_with_file(dir.path().join("absent.toml")).unwrap();
	assert_eq!(settings.broker.namespace, "service-broker");
	assert!(!settings.broker.async_enabled);
}

#[test]
fn test_load_config_with_file_rejects_zero_poll_interval() {
	let file = write_config("[broker]\npoll_interval_ms = 0\n");
	let err = load_config_with_file(file.path()).unwrap_err();
	assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "broker.poll_interval_ms"));
}
