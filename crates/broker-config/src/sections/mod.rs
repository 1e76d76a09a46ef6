// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod broker;
mod http;
mod logging;
mod shared_mysql;

pub use broker::{
	BrokerConfig, BrokerConfigLayer, DEFAULT_NAMESPACE, DEFAULT_POLL_INTERVAL_MS,
	DEFAULT_READY_TIMEOUT_SECS,
};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use shared_mysql::{validate_shared_mysql, SharedMysqlConfig};
